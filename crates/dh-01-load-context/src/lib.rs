//! # Load Context Subsystem (dh-01)
//!
//! Describes where a domain's components come from and seals that
//! description once the domain activates.
//!
//! ## Lifecycle
//!
//! ```text
//! [builder / JSON config] → LoadContext (open)
//!        ↓ inherit_from(default domain snapshot)
//! LoadContext (open) ──finalize()──→ Arc<LoadContextSnapshot> (sealed, shared)
//!                                          ↓
//!                                     ProbePlan → candidate files → ComponentLocator
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Sealed fields never change after finalization | `LoadContext::mutate` checks the flag under the write lock |
//! | Finalization runs once, all callers see one snapshot | double-checked `AtomicBool` + snapshot mutex |
//! | Private paths stay under the base | `domain/invariants.rs` |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! domain/       - LoadContext, LoadContextSnapshot, ProbePlan, LoadContextError
//! algorithms/   - path normalization, probe plan construction
//! ports/        - FileProbe (outbound)
//! adapters/     - OsFileProbe
//! service.rs    - ComponentLocator
//! config.rs     - LoadContextConfig (serde)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::OsFileProbe;
pub use config::LoadContextConfig;
pub use domain::*;
pub use ports::{FileProbe, MockFileProbe};
pub use service::ComponentLocator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
