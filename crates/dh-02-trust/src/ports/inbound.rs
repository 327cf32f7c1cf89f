//! Inbound ports (API) for the trust subsystem.

use crate::domain::{DomainTrust, TrustError, TrustEvidence, TrustRequest};
use std::sync::Arc;

/// Establishes and checks domain trust.
pub trait TrustEvidenceApi: Send + Sync {
    /// Resolve the trust of a new domain.
    ///
    /// Evidence precedence: provided, then creator, then generated default,
    /// then deferred (synthesized on first read).
    fn resolve(&self, request: TrustRequest) -> Result<Arc<DomainTrust>, TrustError>;

    /// Reject evidence that implies a sandbox when no explicit grant was given.
    fn check_sandbox_creation(
        &self,
        evidence: &TrustEvidence,
        creator: &DomainTrust,
    ) -> Result<(), TrustError>;

    /// Require that `creator` may supply evidence for a new domain.
    fn authorize_evidence(&self, creator: &DomainTrust) -> Result<(), TrustError>;
}
