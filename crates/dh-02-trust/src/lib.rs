//! # Trust Subsystem (dh-02)
//!
//! Establishes how much a domain (and each component inside it) is trusted.
//!
//! ## Architecture Role
//!
//! ```text
//! [Lifecycle (5)] ──TrustRequest──→ [TrustEvidenceResolver]
//!                                        │
//!                    ┌───────────────────┼────────────────────┐
//!                    ↓                   ↓                    ↓
//!             EvidenceFactory      PolicyEngine        FullTrustList
//!             (deferred evidence)  (evidence → grant)  (homogeneous only)
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | A homogeneous grant is never re-derived | `DomainTrust::grant` returns the creation-time grant; `set_evidence` leaves it alone |
//! | Allow-list matches are exact on (name, key, version) | `FullTrustList::match_and_mark` |
//! | Deferred synthesis never recurses | per-thread `RecursionGuard` keyed by domain id |
//! | Evidence is immutable once the domain is active | `DomainTrust::freeze` |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! domain/       - evidence, permissions, grant sets, DomainTrust, SecurityElement
//! algorithms/   - ZonePolicy, sandbox-creation check, security XML codec
//! ports/        - TrustEvidenceApi (inbound); PolicyEngine, EvidenceFactory (outbound)
//! adapters/     - HostEvidenceFactory
//! service.rs    - TrustEvidenceResolver
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::HostEvidenceFactory;
pub use algorithms::{check_sandbox_creation, SecurityEncodable, ZonePolicy};
pub use domain::*;
pub use ports::{
    EvidenceFactory, EvidenceRequest, FixedPolicy, MockEvidenceFactory, PolicyEngine,
    TrustEvidenceApi,
};
pub use service::TrustEvidenceResolver;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
