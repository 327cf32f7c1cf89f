//! # Value Objects
//!
//! Small immutable pieces of a load context.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Fields that reject mutation once the context is sealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SealedField {
    /// Application base path.
    ApplicationBase,
    /// Application name.
    ApplicationName,
    /// Private search paths.
    PrivateSearchPaths,
    /// Configuration blob.
    ConfigurationBlob,
    /// Domain manager type name.
    ManagerType,
    /// Compatibility switches.
    CompatibilitySwitches,
}

impl fmt::Display for SealedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ApplicationBase => "ApplicationBase",
            Self::ApplicationName => "ApplicationName",
            Self::PrivateSearchPaths => "PrivateSearchPaths",
            Self::ConfigurationBlob => "ConfigurationBlob",
            Self::ManagerType => "ManagerType",
            Self::CompatibilitySwitches => "CompatibilitySwitches",
        };
        f.write_str(name)
    }
}

/// Shadow-copy settings. All of these stay adjustable after sealing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowCopySettings {
    /// Whether components are copied before loading.
    pub enabled: bool,
    /// Where copies are cached.
    pub cache_path: Option<PathBuf>,
    /// Directories whose components are shadow-copied.
    pub directories: Vec<PathBuf>,
}

/// Error returned by a domain initializer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct InitializerError(pub String);

/// Callback run once inside a freshly created domain.
///
/// Receives its own copy of the argument vector.
pub type Initializer = Arc<dyn Fn(Vec<String>) -> Result<(), InitializerError> + Send + Sync>;

/// Ordered candidate directories for locating a component by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbePlan {
    directories: Vec<PathBuf>,
}

impl ProbePlan {
    /// Build a plan from an ordered list, dropping duplicates.
    pub fn new(directories: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut plan = Self::default();
        for dir in directories {
            if !plan.directories.contains(&dir) {
                plan.directories.push(dir);
            }
        }
        plan
    }

    /// Candidate directories in probing order.
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Whether `dir` is one of the candidates.
    pub fn contains(&self, dir: &Path) -> bool {
        self.directories.iter().any(|d| d == dir)
    }

    /// Number of candidate directories.
    pub fn len(&self) -> usize {
        self.directories.len()
    }

    /// Whether the plan has no directories.
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }
}
