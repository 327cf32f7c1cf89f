//! Evidence for domains whose code lives on the host machine.

use crate::domain::{EvidenceItem, SecurityZone, TrustEvidence};
use crate::ports::{EvidenceFactory, EvidenceRequest};

/// Produces a zone plus a `file://` URL for the application base.
#[derive(Debug, Clone, Copy)]
pub struct HostEvidenceFactory {
    zone: SecurityZone,
}

impl HostEvidenceFactory {
    /// Factory stamping every domain with `zone`.
    pub fn new(zone: SecurityZone) -> Self {
        Self { zone }
    }
}

impl Default for HostEvidenceFactory {
    fn default() -> Self {
        Self::new(SecurityZone::MyComputer)
    }
}

impl EvidenceFactory for HostEvidenceFactory {
    fn generate(&self, request: &EvidenceRequest) -> TrustEvidence {
        let mut evidence = TrustEvidence::for_zone(self.zone);
        if let Some(base) = &request.application_base {
            evidence.add(EvidenceItem::Url(format!("file://{}", base.display())));
        }
        evidence
    }
}
