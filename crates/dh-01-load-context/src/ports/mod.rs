//! # Ports Layer
//!
//! - **outbound**: `FileProbe` - existence checks against a filesystem

pub mod outbound;

pub use outbound::*;
