//! # Ports Layer

pub mod inbound;
pub mod outbound;

pub use inbound::DomainLifecycleApi;
pub use outbound::{DomainManager, ManagerError, RecordingManager};
