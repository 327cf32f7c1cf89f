//! # Domain Host Runtime
//!
//! Boots a host process: the default domain, the configured plugin domains
//! and the observers on the lifecycle bus.
//!
//! ## Modular Structure
//!
//! - `config` - `HostConfig`, read from `DH_*` environment variables
//! - `runtime` - `HostRuntime`, subsystem wiring and graceful shutdown

pub mod config;
pub mod runtime;

pub use config::{ConfigError, HostConfig};
pub use runtime::{GrantQuery, HostRuntime};
