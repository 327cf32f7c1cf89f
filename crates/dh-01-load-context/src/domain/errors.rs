//! # Load Context Errors

use super::value_objects::SealedField;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the load context subsystem.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadContextError {
    /// A sealed field was mutated after finalization.
    #[error("Load context is sealed: {field} can no longer be changed")]
    Sealed {
        /// The rejected field.
        field: SealedField,
    },

    /// A path failed validation.
    #[error("Invalid path '{}': {reason}", path.display())]
    InvalidPath {
        /// The offending path.
        path: PathBuf,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// An application name was set to an empty string.
    #[error("Application name must not be empty")]
    EmptyApplicationName,

    /// Finalization found no application base, even after inheritance.
    #[error("Load context has no application base")]
    MissingApplicationBase,

    /// The serialized configuration could not be parsed.
    #[error("Invalid load context configuration: {0}")]
    InvalidConfig(String),
}

impl LoadContextError {
    /// Whether this is a rejected mutation (as opposed to bad input).
    pub fn is_sealed(&self) -> bool {
        matches!(self, Self::Sealed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sealed_display() {
        let err = LoadContextError::Sealed {
            field: SealedField::ApplicationBase,
        };
        assert!(err.to_string().contains("ApplicationBase"));
        assert!(err.is_sealed());
    }

    #[test]
    fn test_invalid_path_display() {
        let err = LoadContextError::InvalidPath {
            path: PathBuf::from("../etc"),
            reason: "escapes the application base",
        };
        assert!(err.to_string().contains("../etc"));
        assert!(err.to_string().contains("escapes"));
        assert!(!err.is_sealed());
    }
}
