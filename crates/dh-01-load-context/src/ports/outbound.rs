//! Outbound ports (SPI) for the load context subsystem.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

/// Answers whether a candidate component file exists.
pub trait FileProbe: Send + Sync {
    /// Whether `path` names an existing file.
    fn exists(&self, path: &Path) -> bool;
}

/// In-memory file probe for tests.
#[derive(Debug, Default)]
pub struct MockFileProbe {
    files: RwLock<HashSet<PathBuf>>,
}

impl MockFileProbe {
    /// Create an empty probe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `path` exists.
    pub fn add_file(&self, path: impl Into<PathBuf>) {
        self.files.write().insert(path.into());
    }
}

impl FileProbe for MockFileProbe {
    fn exists(&self, path: &Path) -> bool {
        self.files.read().contains(path)
    }
}
