//! # Adapters Layer
//!
//! - **manager_registry**: named `DomainManager` factories

pub mod manager_registry;

pub use manager_registry::{ManagerFactory, ManagerRegistry};
