//! # Local Store Errors

use super::keys::WellKnownKey;
use dh_01_load_context::LoadContextError;
use thiserror::Error;

/// Errors raised by the domain-local store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The caller's grant does not satisfy the entry's guard.
    #[error("Access denied to store key '{key}': requires {requirement}")]
    AccessDenied {
        /// The guarded key.
        key: String,
        /// The unmet guard.
        requirement: String,
    },

    /// The operation is not valid for this key.
    #[error("Invalid operation on well-known key {key}: {reason}")]
    InvalidOperation {
        /// The well-known key.
        key: WellKnownKey,
        /// What was wrong.
        reason: String,
    },

    /// The load context rejected the write.
    #[error("Load context rejected store write: {0}")]
    LoadContext(#[from] LoadContextError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::AccessDenied {
            key: "secret".into(),
            requirement: "unrestricted".into(),
        };
        assert!(err.to_string().contains("secret"));

        let err = StoreError::InvalidOperation {
            key: WellKnownKey::CachePath,
            reason: "guards are not supported".into(),
        };
        assert!(err.to_string().contains("CachePath"));
    }

    #[test]
    fn test_load_context_conversion() {
        let err: StoreError = LoadContextError::EmptyApplicationName.into();
        assert!(matches!(err, StoreError::LoadContext(_)));
    }
}
