//! # Sandbox-Creation Check
//!
//! Legacy compatibility shim, not a security boundary: evidence whose zone
//! differs from the creator's (and is not `MyComputer`) implies the caller
//! wanted a sandbox, which now needs an explicit grant set.

use crate::domain::{SecurityZone, TrustError, TrustEvidence};

/// Check evidence supplied without an explicit grant.
pub fn check_sandbox_creation(
    evidence: &TrustEvidence,
    creator_zone: SecurityZone,
) -> Result<(), TrustError> {
    let zone = evidence.zone();
    if zone != creator_zone && zone != SecurityZone::MyComputer {
        return Err(TrustError::UnsupportedSandboxCreation { zone, creator_zone });
    }
    Ok(())
}
