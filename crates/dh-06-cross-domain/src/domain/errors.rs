//! # Invocation Errors

use super::marshal::MarshalError;
use dh_05_lifecycle::DomainError;
use serde::{Deserialize, Serialize};
use shared_types::{DomainId, EnvelopeError, ErrorKind};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use thiserror::Error;

/// A failure inside the target domain, copied back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    /// Failure category (`Panic`, `CallbackError`, an error kind, ...).
    pub category: String,
    /// Error text.
    pub message: String,
    /// Cause chain or backtrace text. Informational only.
    pub stack: String,
}

impl RemoteError {
    /// Capture an error returned by a callback.
    pub fn from_error(error: &anyhow::Error) -> Self {
        let category = match error.downcast_ref::<DomainError>() {
            Some(domain_error) => domain_error.kind().to_string(),
            None => "CallbackError".to_string(),
        };
        Self {
            category,
            message: error.to_string(),
            stack: format!("{:?}", error),
        }
    }

    /// Capture a panic payload.
    ///
    /// The backtrace is taken where the panic was caught, not where it was
    /// raised, and only when `RUST_BACKTRACE` (or `RUST_LIB_BACKTRACE`)
    /// enables capture. Otherwise the stack is left empty.
    pub fn from_panic(message: String) -> Self {
        let backtrace = Backtrace::capture();
        let stack = match backtrace.status() {
            BacktraceStatus::Captured => backtrace.to_string(),
            _ => String::new(),
        };
        Self {
            category: "Panic".to_string(),
            message,
            stack,
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)?;
        if !self.stack.is_empty() {
            write!(f, "\n--- remote stack ---\n{}", self.stack)?;
        }
        Ok(())
    }
}

/// Errors from [`crate::CrossDomainInvoker::invoke`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvokeError {
    /// Source or target domain is unloading or unloaded.
    #[error("Invalid handle: {domain} is no longer active")]
    InvalidHandle {
        /// The dead domain.
        domain: DomainId,
    },

    /// The callback failed inside the target domain.
    #[error("Propagated from {domain}: {error}")]
    Propagated {
        /// Domain the failure happened in.
        domain: DomainId,
        /// The copied failure.
        error: RemoteError,
    },

    /// The callback or its result could not be encoded.
    #[error(transparent)]
    Marshal(#[from] MarshalError),

    /// An envelope failed verification.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    /// The lifecycle layer refused the call.
    #[error(transparent)]
    Domain(DomainError),
}

impl InvokeError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidHandle { .. } => ErrorKind::InvalidHandle,
            Self::Propagated { .. } | Self::Marshal(_) | Self::Envelope(_) => ErrorKind::PropagatedError,
            Self::Domain(e) => e.kind(),
        }
    }

    /// The remote failure, for `Propagated`.
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            Self::Propagated { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Metric label for this outcome.
    pub(crate) fn outcome_label(&self) -> &'static str {
        match self {
            Self::InvalidHandle { .. } => "invalid_handle",
            Self::Propagated { .. } => "propagated",
            Self::Marshal(_) | Self::Envelope(_) => "marshal",
            Self::Domain(_) => "refused",
        }
    }
}

impl From<DomainError> for InvokeError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::InvalidHandle { domain } => Self::InvalidHandle { domain },
            DomainError::ExecutionFailed { domain, message } => Self::Propagated {
                domain,
                error: RemoteError::from_panic(message),
            },
            other => Self::Domain(other),
        }
    }
}
