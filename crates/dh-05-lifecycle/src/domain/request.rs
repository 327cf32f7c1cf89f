//! # Domain Creation Request

use super::handle::DomainHandle;
use dh_01_load_context::LoadContext;
use dh_02_trust::{GrantSet, TrustEvidence};
use shared_types::ComponentIdentity;

/// Everything `create_domain` needs.
pub struct CreateDomainRequest {
    /// Friendly name; must not be empty.
    pub friendly_name: String,
    /// The new domain's load context (unsealed).
    pub load_context: LoadContext,
    /// Creating domain; the default domain when `None`.
    pub creator: Option<DomainHandle>,
    /// Evidence supplied by the caller.
    pub evidence: Option<TrustEvidence>,
    /// Explicit grant; makes the domain homogeneous.
    pub grant: Option<GrantSet>,
    /// Full-trust allow-list (with `grant` only).
    pub full_trust: Vec<ComponentIdentity>,
    /// Generate default evidence eagerly instead of deferring.
    pub generate_default_evidence: bool,
    /// Clone the default domain's evidence on first read.
    pub inherit_evidence_from_default: bool,
}

impl CreateDomainRequest {
    /// A request with only a name and a load context.
    pub fn new(friendly_name: impl Into<String>, load_context: LoadContext) -> Self {
        Self {
            friendly_name: friendly_name.into(),
            load_context,
            creator: None,
            evidence: None,
            grant: None,
            full_trust: Vec::new(),
            generate_default_evidence: false,
            inherit_evidence_from_default: false,
        }
    }

    /// Create on behalf of `creator`.
    #[must_use]
    pub fn creator(mut self, creator: DomainHandle) -> Self {
        self.creator = Some(creator);
        self
    }

    /// Supply evidence.
    #[must_use]
    pub fn evidence(mut self, evidence: TrustEvidence) -> Self {
        self.evidence = Some(evidence);
        self
    }

    /// Make the domain homogeneous.
    #[must_use]
    pub fn homogeneous(mut self, grant: GrantSet, full_trust: Vec<ComponentIdentity>) -> Self {
        self.grant = Some(grant);
        self.full_trust = full_trust;
        self
    }

    /// Generate default evidence eagerly.
    #[must_use]
    pub fn generate_default_evidence(mut self) -> Self {
        self.generate_default_evidence = true;
        self
    }

    /// Inherit evidence from the default domain lazily.
    #[must_use]
    pub fn inherit_evidence_from_default(mut self) -> Self {
        self.inherit_evidence_from_default = true;
        self
    }
}
