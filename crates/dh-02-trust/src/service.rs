//! # Trust Evidence Resolver
//!
//! Implements [`TrustEvidenceApi`] over a policy engine and an evidence
//! factory.

use crate::adapters::HostEvidenceFactory;
use crate::algorithms::{check_sandbox_creation, ZonePolicy};
use crate::domain::{DomainTrust, Permission, TrustError, TrustEvidence, TrustRequest};
use crate::ports::{EvidenceFactory, PolicyEngine, TrustEvidenceApi};
use std::sync::Arc;
use tracing::{info, warn};

/// Resolves the trust of new domains.
#[derive(Clone)]
pub struct TrustEvidenceResolver {
    policy: Arc<dyn PolicyEngine>,
    factory: Arc<dyn EvidenceFactory>,
}

impl TrustEvidenceResolver {
    /// Resolver over explicit collaborators.
    pub fn new(policy: Arc<dyn PolicyEngine>, factory: Arc<dyn EvidenceFactory>) -> Self {
        Self { policy, factory }
    }

    /// Zone policy with host evidence.
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(ZonePolicy), Arc::new(HostEvidenceFactory::default()))
    }

    /// The policy engine in use.
    pub fn policy(&self) -> &Arc<dyn PolicyEngine> {
        &self.policy
    }
}

impl Default for TrustEvidenceResolver {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl TrustEvidenceApi for TrustEvidenceResolver {
    fn resolve(&self, request: TrustRequest) -> Result<Arc<DomainTrust>, TrustError> {
        let trust = DomainTrust::from_request(request, self.policy.clone(), self.factory.clone());
        info!(
            domain = %trust.domain(),
            source = ?trust.evidence_source(),
            homogeneous = trust.is_homogeneous(),
            full_trust = trust.full_trust_list().len(),
            "[dh-02] Domain trust resolved"
        );
        Ok(Arc::new(trust))
    }

    fn check_sandbox_creation(
        &self,
        evidence: &TrustEvidence,
        creator: &DomainTrust,
    ) -> Result<(), TrustError> {
        let result = check_sandbox_creation(evidence, creator.evidence().zone());
        if let Err(e) = &result {
            warn!(creator = %creator.domain(), error = %e, "[dh-02] Sandbox creation rejected");
        }
        result
    }

    fn authorize_evidence(&self, creator: &DomainTrust) -> Result<(), TrustError> {
        if creator.is_homogeneous() || creator.is_fully_trusted() {
            return Ok(());
        }
        creator.demand(&Permission::ControlEvidence).map_err(|e| {
            warn!(creator = %creator.domain(), "[dh-02] Creator may not supply evidence");
            e
        })
    }
}
