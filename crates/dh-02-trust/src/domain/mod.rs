//! # Domain Layer for Trust
//!
//! ## Contents
//!
//! - **evidence**: `TrustEvidence`, `EvidenceItem`, `SecurityZone`
//! - **permissions**: `Permission`, `PermissionSet`, `GrantSet`
//! - **full_trust**: the homogeneous allow-list
//! - **trust**: `DomainTrust`, the per-domain aggregate, and `TrustRequest`
//! - **security_element**: the structural XML tree
//! - **errors**: `TrustError`

mod errors;
mod evidence;
mod full_trust;
mod permissions;
mod security_element;
mod trust;

pub use errors::*;
pub use evidence::*;
pub use full_trust::*;
pub use permissions::*;
pub use security_element::*;
pub use trust::*;
