//! # Finalization
//!
//! Turns the mutable field set into the sealed values: an absolute, cleaned
//! application base, validated private paths and a defaulted application
//! name.

use crate::domain::{invariant_contained, invariant_relative, LoadContextError};
use std::path::{Component, Path, PathBuf};

/// Name used when the application base has no final segment (a filesystem root).
pub const FALLBACK_APPLICATION_NAME: &str = "application";

/// Make `base` absolute and lexically clean (`.` dropped, `..` folded,
/// trailing separator gone).
pub fn normalize_base(base: &Path) -> Result<PathBuf, LoadContextError> {
    if base.as_os_str().is_empty() {
        return Err(LoadContextError::InvalidPath {
            path: base.to_path_buf(),
            reason: "application base is empty",
        });
    }

    let absolute = std::path::absolute(base).map_err(|_| LoadContextError::InvalidPath {
        path: base.to_path_buf(),
        reason: "application base cannot be made absolute",
    })?;

    let mut cleaned = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the root is a no-op, as for the OS.
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    Ok(cleaned)
}

/// Validate a private search path and return its cleaned relative form.
pub fn normalize_private_path(path: &Path) -> Result<PathBuf, LoadContextError> {
    if !invariant_relative(path) {
        return Err(LoadContextError::InvalidPath {
            path: path.to_path_buf(),
            reason: "private search paths must be relative",
        });
    }
    if !invariant_contained(path) {
        return Err(LoadContextError::InvalidPath {
            path: path.to_path_buf(),
            reason: "private search path escapes the application base",
        });
    }

    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    if cleaned.as_os_str().is_empty() {
        return Err(LoadContextError::InvalidPath {
            path: path.to_path_buf(),
            reason: "private search path resolves to the application base itself",
        });
    }
    Ok(cleaned)
}

/// Application name derived from the last segment of a normalized base.
pub fn default_application_name(base: &Path) -> String {
    base.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_APPLICATION_NAME.to_string())
}
