//! # Algorithms
//!
//! - **zone_policy**: the default evidence → grant mapping
//! - **sandbox**: the legacy sandbox-creation check
//! - **security_xml**: security objects to and from `SecurityElement`

pub mod sandbox;
pub mod security_xml;
pub mod zone_policy;

pub use sandbox::check_sandbox_creation;
pub use security_xml::SecurityEncodable;
pub use zone_policy::ZonePolicy;
