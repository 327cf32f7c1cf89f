//! # Domain-Local Store Subsystem (dh-04)
//!
//! Per-domain configuration storage.
//!
//! | Key | Stored in | Read check |
//! |-----|-----------|------------|
//! | `ApplicationBase`, `ApplicationName`, `ConfigurationBytes`, `PrivateBinPath` | load context, sealed at activation | none |
//! | `DynamicBase`, `ShadowCopyDirectories`, `CachePath` | load context, adjustable | none |
//! | anything else | store map | the entry's `AccessGuard` against the caller grant |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod service;

pub use domain::*;
pub use service::DomainLocalStore;

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
