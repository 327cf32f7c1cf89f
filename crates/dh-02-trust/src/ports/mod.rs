//! # Ports Layer
//!
//! - **inbound**: `TrustEvidenceApi`
//! - **outbound**: `PolicyEngine`, `EvidenceFactory` (plus test doubles)

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
