//! Outbound ports (SPI) for the trust subsystem.

use crate::domain::{GrantSet, TrustEvidence};
use shared_types::DomainId;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Maps evidence to a grant set.
pub trait PolicyEngine: Send + Sync {
    /// Grant for code presenting `evidence` in a domain rooted at `application_base`.
    fn resolve(&self, evidence: &TrustEvidence, application_base: Option<&Path>) -> GrantSet;
}

/// What an evidence factory is asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceRequest {
    /// Domain the evidence is for.
    pub domain: DomainId,
    /// Its application base, when known.
    pub application_base: Option<PathBuf>,
}

/// Synthesizes evidence for a domain that was created without any.
pub trait EvidenceFactory: Send + Sync {
    /// Produce evidence for the requested domain.
    fn generate(&self, request: &EvidenceRequest) -> TrustEvidence;
}

/// Evidence factory returning fixed evidence and counting calls.
#[derive(Debug, Default)]
pub struct MockEvidenceFactory {
    evidence: TrustEvidence,
    calls: AtomicUsize,
}

impl MockEvidenceFactory {
    /// Always return `evidence`.
    pub fn new(evidence: TrustEvidence) -> Self {
        Self {
            evidence,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `generate` ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EvidenceFactory for MockEvidenceFactory {
    fn generate(&self, _request: &EvidenceRequest) -> TrustEvidence {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.evidence.clone()
    }
}

/// Policy engine returning a fixed grant.
#[derive(Debug, Clone)]
pub struct FixedPolicy(pub GrantSet);

impl PolicyEngine for FixedPolicy {
    fn resolve(&self, _evidence: &TrustEvidence, _application_base: Option<&Path>) -> GrantSet {
        self.0.clone()
    }
}
