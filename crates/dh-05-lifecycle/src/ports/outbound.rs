//! Outbound ports (SPI) for the lifecycle subsystem.

use dh_01_load_context::LoadContext;
use parking_lot::Mutex;
use shared_types::DomainId;
use thiserror::Error;

/// Failure reported by a domain manager.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ManagerError(pub String);

/// Pluggable per-domain manager.
///
/// Instantiated by name from the [`ManagerRegistry`](crate::ManagerRegistry)
/// when a domain's load context names a manager type. It runs once, before
/// the load context is sealed, and may still adjust it. The instance also
/// occupies the domain's trust-manager slot.
pub trait DomainManager: Send + Sync {
    /// Called once while the domain is being built.
    fn initialize_new_domain(&self, domain: DomainId, context: &LoadContext) -> Result<(), ManagerError>;

    /// Name used in logs.
    fn name(&self) -> &str;
}

/// Manager that records the domains it initialized. For tests.
#[derive(Debug, Default)]
pub struct RecordingManager {
    initialized: Mutex<Vec<DomainId>>,
    fail_with: Option<String>,
}

impl RecordingManager {
    /// A manager that always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// A manager that always fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            initialized: Mutex::new(Vec::new()),
            fail_with: Some(message.into()),
        }
    }

    /// Domains initialized so far.
    pub fn initialized(&self) -> Vec<DomainId> {
        self.initialized.lock().clone()
    }
}

impl DomainManager for RecordingManager {
    fn initialize_new_domain(&self, domain: DomainId, _context: &LoadContext) -> Result<(), ManagerError> {
        self.initialized.lock().push(domain);
        match &self.fail_with {
            Some(message) => Err(ManagerError(message.clone())),
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "recording"
    }
}
