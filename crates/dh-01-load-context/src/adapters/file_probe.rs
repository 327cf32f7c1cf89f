//! Filesystem-backed [`FileProbe`].

use crate::ports::FileProbe;
use std::path::Path;

/// Probes the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileProbe;

impl FileProbe for OsFileProbe {
    fn exists(&self, path: &Path) -> bool {
        std::fs::metadata(path)
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }
}
