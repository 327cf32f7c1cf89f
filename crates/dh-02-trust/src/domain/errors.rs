//! # Trust Errors

use super::evidence::SecurityZone;
use super::permissions::Permission;
use thiserror::Error;

/// Errors raised while establishing or checking trust.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrustError {
    /// Evidence implies a sandbox but no explicit grant was supplied.
    #[error(
        "Creating a sandboxed domain from {zone} evidence requires an explicit grant set \
         (creator zone is {creator_zone})"
    )]
    UnsupportedSandboxCreation {
        /// Zone of the supplied evidence.
        zone: SecurityZone,
        /// Zone of the creating domain.
        creator_zone: SecurityZone,
    },

    /// A demand failed.
    #[error("Access denied: {permission} is not granted")]
    AccessDenied {
        /// The permission that was demanded.
        permission: Permission,
    },

    /// Evidence was changed after the domain activated.
    #[error("Domain evidence is frozen")]
    EvidenceFrozen,

    /// A security XML document could not be decoded.
    #[error("Invalid security XML: {0}")]
    InvalidSecurityXml(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandbox_error_names_zones() {
        let err = TrustError::UnsupportedSandboxCreation {
            zone: SecurityZone::Internet,
            creator_zone: SecurityZone::MyComputer,
        };
        let text = err.to_string();
        assert!(text.contains("Internet"));
        assert!(text.contains("MyComputer"));
    }

    #[test]
    fn test_access_denied_names_permission() {
        let err = TrustError::AccessDenied {
            permission: Permission::ControlEvidence,
        };
        assert!(err.to_string().contains("ControlEvidence"));
    }
}
