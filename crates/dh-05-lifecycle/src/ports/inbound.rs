//! Inbound ports (API) for the lifecycle subsystem.

use crate::domain::{CreateDomainRequest, DomainHandle, DomainResult};
use dh_01_load_context::LoadContext;
use dh_02_trust::TrustEvidence;
use shared_bus::DeliveryReport;
use shared_types::DomainId;

/// Domain lifecycle operations.
pub trait DomainLifecycleApi: Send + Sync {
    /// Create and activate a domain.
    fn create(
        &self,
        friendly_name: &str,
        load_context: LoadContext,
        evidence: Option<TrustEvidence>,
    ) -> DomainResult<DomainHandle>;

    /// Create and activate a domain from a full request.
    fn create_domain(&self, request: CreateDomainRequest) -> DomainResult<DomainHandle>;

    /// Drain and unload a domain.
    fn unload(&self, handle: &DomainHandle) -> DomainResult<()>;

    /// Whether `handle` refers to the default domain.
    fn is_default(&self, handle: &DomainHandle) -> bool;

    /// Look up an active domain.
    fn get(&self, id: DomainId) -> Option<DomainHandle>;

    /// Publish an unhandled error raised in `handle`'s domain.
    fn report_unhandled_error(
        &self,
        handle: &DomainHandle,
        message: &str,
        is_terminating: bool,
    ) -> DeliveryReport;
}
