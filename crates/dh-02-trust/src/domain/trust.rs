//! # Domain Trust
//!
//! The trust state owned by one domain: its evidence (possibly deferred),
//! its grant set, and for homogeneous domains the full-trust allow-list.
//!
//! ## Evidence precedence
//!
//! ```text
//! provided ──→ creator ──→ generated default ──→ deferred
//!                                                  │
//!                               first read: inherit from default domain
//!                                           or ask the EvidenceFactory
//! ```
//!
//! Deferred synthesis runs under a per-thread [`RecursionGuard`] keyed by
//! the domain id. A re-entrant read for the same domain gets empty evidence
//! instead of recursing, and nothing is cached from it.

use super::errors::TrustError;
use super::evidence::TrustEvidence;
use super::full_trust::FullTrustList;
use super::permissions::{GrantSet, Permission};
use crate::ports::{EvidenceFactory, EvidenceRequest, PolicyEngine};
use parking_lot::Mutex;
use shared_types::{ComponentIdentity, DomainId, RecursionGuard};
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Where a domain's evidence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceSource {
    /// Supplied by the caller.
    Provided,
    /// Copied from the creating domain.
    Creator,
    /// Generated eagerly at creation.
    Generated,
    /// Cloned lazily from the default domain.
    InheritedFromDefault,
    /// Synthesized lazily by the evidence factory.
    Deferred,
}

enum EvidenceState {
    Resolved(TrustEvidence),
    Deferred { inherit_from: Option<Arc<DomainTrust>> },
}

/// Everything needed to resolve a new domain's trust.
pub struct TrustRequest {
    /// The domain being created.
    pub domain: DomainId,
    /// Its application base, when known.
    pub application_base: Option<PathBuf>,
    /// Evidence supplied by the caller.
    pub provided: Option<TrustEvidence>,
    /// Evidence of the creating domain, when it is not the default domain.
    pub creator_evidence: Option<TrustEvidence>,
    /// Generate default evidence now instead of deferring.
    pub generate_default: bool,
    /// Default domain to inherit evidence from lazily.
    pub inherit_from: Option<Arc<DomainTrust>>,
    /// Explicit grant; makes the domain homogeneous.
    pub explicit_grant: Option<GrantSet>,
    /// Full-trust allow-list (homogeneous domains only).
    pub full_trust: Vec<ComponentIdentity>,
}

impl TrustRequest {
    /// A request with no evidence, no grant and deferred synthesis.
    pub fn new(domain: DomainId) -> Self {
        Self {
            domain,
            application_base: None,
            provided: None,
            creator_evidence: None,
            generate_default: false,
            inherit_from: None,
            explicit_grant: None,
            full_trust: Vec::new(),
        }
    }

    /// Set the application base.
    #[must_use]
    pub fn application_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.application_base = Some(base.into());
        self
    }

    /// Supply evidence.
    #[must_use]
    pub fn provided(mut self, evidence: TrustEvidence) -> Self {
        self.provided = Some(evidence);
        self
    }

    /// Supply the creator's evidence.
    #[must_use]
    pub fn creator_evidence(mut self, evidence: TrustEvidence) -> Self {
        self.creator_evidence = Some(evidence);
        self
    }

    /// Generate default evidence eagerly.
    #[must_use]
    pub fn generate_default(mut self, generate: bool) -> Self {
        self.generate_default = generate;
        self
    }

    /// Inherit evidence lazily from the default domain.
    #[must_use]
    pub fn inherit_from(mut self, default_domain: Arc<DomainTrust>) -> Self {
        self.inherit_from = Some(default_domain);
        self
    }

    /// Make the domain homogeneous with this grant and allow-list.
    #[must_use]
    pub fn homogeneous(mut self, grant: GrantSet, full_trust: Vec<ComponentIdentity>) -> Self {
        self.explicit_grant = Some(grant);
        self.full_trust = full_trust;
        self
    }
}

/// The trust state of one domain.
pub struct DomainTrust {
    domain: DomainId,
    application_base: Option<PathBuf>,
    source: EvidenceSource,
    evidence: Mutex<EvidenceState>,
    grant: Mutex<Option<GrantSet>>,
    homogeneous: bool,
    full_trust: FullTrustList,
    frozen: AtomicBool,
    policy: Arc<dyn PolicyEngine>,
    factory: Arc<dyn EvidenceFactory>,
}

impl DomainTrust {
    pub(crate) fn from_request(
        request: TrustRequest,
        policy: Arc<dyn PolicyEngine>,
        factory: Arc<dyn EvidenceFactory>,
    ) -> Self {
        let TrustRequest {
            domain,
            application_base,
            provided,
            creator_evidence,
            generate_default,
            inherit_from,
            explicit_grant,
            full_trust,
        } = request;

        let (source, state) = if let Some(evidence) = provided {
            (EvidenceSource::Provided, EvidenceState::Resolved(evidence))
        } else if let Some(evidence) = creator_evidence {
            (EvidenceSource::Creator, EvidenceState::Resolved(evidence))
        } else if generate_default {
            let evidence = factory.generate(&EvidenceRequest {
                domain,
                application_base: application_base.clone(),
            });
            (EvidenceSource::Generated, EvidenceState::Resolved(evidence))
        } else if let Some(parent) = inherit_from {
            (
                EvidenceSource::InheritedFromDefault,
                EvidenceState::Deferred {
                    inherit_from: Some(parent),
                },
            )
        } else {
            (
                EvidenceSource::Deferred,
                EvidenceState::Deferred { inherit_from: None },
            )
        };

        let homogeneous = explicit_grant.is_some();
        let full_trust = if homogeneous {
            FullTrustList::new(full_trust)
        } else {
            FullTrustList::default()
        };

        Self {
            domain,
            application_base,
            source,
            evidence: Mutex::new(state),
            grant: Mutex::new(explicit_grant),
            homogeneous,
            full_trust,
            frozen: AtomicBool::new(false),
            policy,
            factory,
        }
    }

    /// The owning domain.
    pub fn domain(&self) -> DomainId {
        self.domain
    }

    /// Where the evidence came from.
    pub fn evidence_source(&self) -> EvidenceSource {
        self.source
    }

    /// Whether the grant was fixed at creation.
    pub fn is_homogeneous(&self) -> bool {
        self.homogeneous
    }

    /// The full-trust allow-list (empty unless homogeneous).
    pub fn full_trust_list(&self) -> &FullTrustList {
        &self.full_trust
    }

    /// Whether evidence has been resolved (eagerly or by a completed synthesis).
    pub fn has_resolved_evidence(&self) -> bool {
        matches!(&*self.evidence.lock(), EvidenceState::Resolved(_))
    }

    fn guard_key(&self) -> String {
        format!("evidence:{}", self.domain.as_u32())
    }

    /// The domain's evidence, synthesizing deferred evidence on first read.
    pub fn evidence(&self) -> TrustEvidence {
        let inherit_from = {
            let state = self.evidence.lock();
            match &*state {
                EvidenceState::Resolved(evidence) => return evidence.clone(),
                EvidenceState::Deferred { inherit_from } => inherit_from.clone(),
            }
        };

        let Some(_guard) = RecursionGuard::enter(self.guard_key()) else {
            debug!(domain = %self.domain, "[dh-02] Re-entrant evidence read, using empty evidence");
            return TrustEvidence::empty();
        };

        let synthesized = match inherit_from {
            Some(parent) => parent.evidence(),
            None => self.factory.generate(&EvidenceRequest {
                domain: self.domain,
                application_base: self.application_base.clone(),
            }),
        };

        let mut state = self.evidence.lock();
        match &*state {
            EvidenceState::Resolved(winner) => winner.clone(),
            EvidenceState::Deferred { .. } => {
                debug!(
                    domain = %self.domain,
                    items = synthesized.len(),
                    "[dh-02] Deferred evidence synthesized"
                );
                *state = EvidenceState::Resolved(synthesized.clone());
                synthesized
            }
        }
    }

    /// The domain's grant set.
    ///
    /// Homogeneous domains return the grant fixed at creation. Others derive
    /// it from their evidence through the policy engine and cache it.
    pub fn grant(&self) -> GrantSet {
        if let Some(grant) = self.grant.lock().as_ref() {
            return grant.clone();
        }

        let evidence = self.evidence();
        let computed = self
            .policy
            .resolve(&evidence, self.application_base.as_deref());

        if !self.has_resolved_evidence() {
            return computed;
        }
        self.grant.lock().get_or_insert(computed).clone()
    }

    /// Whether the domain grant is unrestricted.
    pub fn is_fully_trusted(&self) -> bool {
        self.grant().is_unrestricted()
    }

    /// Fail with `AccessDenied` unless the domain holds `permission`.
    pub fn demand(&self, permission: &Permission) -> Result<(), TrustError> {
        if self.grant().allows(permission) {
            Ok(())
        } else {
            Err(TrustError::AccessDenied {
                permission: permission.clone(),
            })
        }
    }

    /// Grant for a component loaded into this domain.
    ///
    /// Homogeneous: an allow-listed identity is unrestricted (and the entry
    /// is marked used); anything else gets the domain grant.
    /// Otherwise: the policy grant for the component's own evidence,
    /// intersected with the domain grant.
    pub fn grant_for_component(
        &self,
        identity: &ComponentIdentity,
        component_evidence: &TrustEvidence,
    ) -> GrantSet {
        if self.homogeneous {
            if let Some(entry) = self.full_trust.match_and_mark(identity) {
                debug!(
                    domain = %self.domain,
                    component = %entry.identity(),
                    "[dh-02] Full-trust allow-list match"
                );
                return GrantSet::Unrestricted;
            }
            return self.grant();
        }

        self.policy
            .resolve(component_evidence, self.application_base.as_deref())
            .intersect(&self.grant())
    }

    /// Replace the evidence before activation.
    ///
    /// A homogeneous domain keeps its grant; others re-derive it on next read.
    pub fn set_evidence(&self, evidence: TrustEvidence) -> Result<(), TrustError> {
        if self.frozen.load(Ordering::Acquire) {
            return Err(TrustError::EvidenceFrozen);
        }
        *self.evidence.lock() = EvidenceState::Resolved(evidence);
        if !self.homogeneous {
            *self.grant.lock() = None;
        }
        Ok(())
    }

    /// Forbid further evidence changes.
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    /// Whether evidence changes are forbidden.
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }
}

impl fmt::Debug for DomainTrust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainTrust")
            .field("domain", &self.domain)
            .field("source", &self.source)
            .field("homogeneous", &self.homogeneous)
            .field("full_trust", &self.full_trust.len())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}
