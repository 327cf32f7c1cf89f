//! # Error Types
//!
//! Errors shared across subsystems.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification every surface error maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Empty name, invalid path, unknown manager type.
    InvalidArgument,
    /// Operation on an unloading or unloaded domain.
    InvalidHandle,
    /// Sandbox-implying evidence supplied without a grant set.
    UnsupportedSandboxCreation,
    /// Default domain, already unloading, or self-unload.
    CannotUnload,
    /// Guard failure or missing permission.
    AccessDenied,
    /// Sealed field, guard on a well-known key, illegal transition.
    InvalidOperation,
    /// Manager or initializer failure during creation.
    InitializationFailed,
    /// Work inside another domain failed.
    PropagatedError,
}

impl ErrorKind {
    /// Snake-case label, used for metric labels.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::InvalidHandle => "invalid_handle",
            Self::UnsupportedSandboxCreation => "sandbox",
            Self::CannotUnload => "cannot_unload",
            Self::AccessDenied => "access_denied",
            Self::InvalidOperation => "invalid_operation",
            Self::InitializationFailed => "initialization",
            Self::PropagatedError => "propagated",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Errors produced while parsing component identities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The identity has no simple name.
    #[error("Component identity has an empty name")]
    EmptyName,

    /// A version string could not be parsed.
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    /// A public key token is not valid hex.
    #[error("Invalid public key token: {0}")]
    InvalidPublicKey(String),

    /// An attribute is not `key=value` or the key is unknown.
    #[error("Malformed identity attribute: {0}")]
    MalformedAttribute(String),
}

/// Errors produced when validating a cross-domain envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// Envelope version not supported.
    #[error("Unsupported envelope version: received {received}, supported {supported}")]
    UnsupportedVersion { received: u16, supported: u16 },

    /// Payload digest does not match the payload bytes.
    #[error("Payload checksum mismatch for correlation {correlation_id}")]
    ChecksumMismatch { correlation_id: String },

    /// Envelope delivered to the wrong domain.
    #[error("Envelope addressed to domain#{expected} delivered to domain#{actual}")]
    Misrouted { expected: u32, actual: u32 },
}
