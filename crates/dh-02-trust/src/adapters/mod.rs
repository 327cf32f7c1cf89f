//! # Adapters
//!
//! - **host_evidence**: `HostEvidenceFactory`, evidence for locally hosted domains

pub mod host_evidence;

pub use host_evidence::HostEvidenceFactory;
