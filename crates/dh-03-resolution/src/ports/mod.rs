//! # Ports Layer

pub mod inbound;
pub mod outbound;

pub use inbound::ResolutionApi;
pub use outbound::{FaultObserver, RecordingFaultObserver};
