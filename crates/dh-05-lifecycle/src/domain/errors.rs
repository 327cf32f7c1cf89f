//! # Lifecycle Errors
//!
//! `DomainError` is the surface error of the host: every subsystem error
//! converts into it, and [`DomainError::kind`] classifies it.

use super::state::DomainState;
use dh_01_load_context::LoadContextError;
use dh_02_trust::TrustError;
use dh_04_local_store::StoreError;
use shared_types::{DomainId, ErrorKind};
use thiserror::Error;

/// Errors surfaced by domain operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Bad caller input.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The domain is unloading or unloaded.
    #[error("Invalid handle: {domain} is no longer active")]
    InvalidHandle {
        /// The dead domain.
        domain: DomainId,
    },

    /// The domain cannot be unloaded.
    #[error("Cannot unload {domain}: {reason}")]
    CannotUnload {
        /// The domain.
        domain: DomainId,
        /// Why not.
        reason: &'static str,
    },

    /// A manager or initializer failed while the domain was being built.
    #[error("Initialization of {domain} failed: {reason}")]
    InitializationFailed {
        /// The half-built domain.
        domain: DomainId,
        /// What failed.
        reason: String,
    },

    /// Work run inside the domain panicked.
    #[error("Execution in {domain} failed: {message}")]
    ExecutionFailed {
        /// The domain.
        domain: DomainId,
        /// Panic text.
        message: String,
    },

    /// A state transition that the state machine forbids.
    #[error("Illegal transition for {domain}: {from} -> {to}")]
    InvalidTransition {
        /// The domain.
        domain: DomainId,
        /// Current state.
        from: DomainState,
        /// Requested state.
        to: DomainState,
    },

    /// Trust resolution or a permission check failed.
    #[error(transparent)]
    Trust(#[from] TrustError),

    /// The load context rejected the operation.
    #[error(transparent)]
    LoadContext(#[from] LoadContextError),

    /// The local store rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DomainError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::InvalidHandle { .. } => ErrorKind::InvalidHandle,
            Self::CannotUnload { .. } => ErrorKind::CannotUnload,
            Self::InitializationFailed { .. } => ErrorKind::InitializationFailed,
            Self::ExecutionFailed { .. } => ErrorKind::PropagatedError,
            Self::InvalidTransition { .. } => ErrorKind::InvalidOperation,
            Self::Trust(e) => trust_kind(e),
            Self::LoadContext(e) => load_context_kind(e),
            Self::Store(e) => match e {
                StoreError::AccessDenied { .. } => ErrorKind::AccessDenied,
                StoreError::InvalidOperation { .. } => ErrorKind::InvalidOperation,
                StoreError::LoadContext(inner) => load_context_kind(inner),
            },
        }
    }
}

fn trust_kind(error: &TrustError) -> ErrorKind {
    match error {
        TrustError::UnsupportedSandboxCreation { .. } => ErrorKind::UnsupportedSandboxCreation,
        TrustError::AccessDenied { .. } => ErrorKind::AccessDenied,
        TrustError::EvidenceFrozen => ErrorKind::InvalidOperation,
        TrustError::InvalidSecurityXml(_) => ErrorKind::InvalidArgument,
    }
}

fn load_context_kind(error: &LoadContextError) -> ErrorKind {
    if error.is_sealed() {
        ErrorKind::InvalidOperation
    } else {
        ErrorKind::InvalidArgument
    }
}

/// Result alias for lifecycle operations.
pub type DomainResult<T> = Result<T, DomainError>;
