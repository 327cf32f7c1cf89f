//! # Shared Types Crate
//!
//! Types that every Domain Host subsystem agrees on.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identities (`DomainId`, `ComponentIdentity`)
//!   and the resolution vocabulary (`ResolveKind`, `Component`) live here.
//! - **Explicit process state**: the id allocator and string interner are a
//!   `ProcessServices` value injected into the lifecycle manager, never a static.
//! - **Envelope Integrity**: anything crossing a domain boundary travels in a
//!   `CrossDomainEnvelope`.

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod process;
pub mod recursion_guard;

pub use entities::*;
pub use envelope::{CrossDomainEnvelope, PayloadEncoding};
pub use errors::*;
pub use process::{DomainIdAllocator, ProcessServices, StringInterner};
pub use recursion_guard::RecursionGuard;
