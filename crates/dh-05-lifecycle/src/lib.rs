//! # Domain Lifecycle Subsystem (dh-05)
//!
//! Creates, activates and unloads isolated execution domains.
//!
//! ## Architecture
//!
//! A `Domain` owns its load context (dh-01), trust (dh-02), resolution
//! pipeline (dh-03) and local store (dh-04), plus a dedicated execution
//! context thread. Callers only ever hold a [`DomainHandle`]; once the domain
//! unloads every handle operation fails with `InvalidHandle`.
//!
//! ```text
//! Created ─→ SecurityInitialized ─→ Active ─→ Unloading ─→ Unloaded
//!     └──────────── torn down on failure ─────────┘
//! ```
//!
//! ## Invariants
//!
//! | Invariant | Enforced by |
//! |-----------|-------------|
//! | Exactly one default domain, created first, never unloaded | `DomainLifecycleManager::start`, `unload` |
//! | Domain ids are never reused | `ProcessServices` id allocator |
//! | Load-context identity fields immutable once active | `LoadContext::finalize` |
//! | Unload waits for in-flight work | `InFlightTracker` |
//! | A domain cannot unload itself | thread-local current domain and entered stack |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{ManagerFactory, ManagerRegistry};
pub use domain::*;
pub use ports::{DomainLifecycleApi, DomainManager, ManagerError, RecordingManager};
pub use service::{DomainLifecycleManager, LifecycleManagerBuilder, DEFAULT_DOMAIN_NAME};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
