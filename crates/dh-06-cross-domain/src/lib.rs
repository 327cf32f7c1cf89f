//! # Cross-Domain Invocation Subsystem (dh-06)
//!
//! Runs work inside another domain and copies the result back.
//!
//! - A callback is a serde struct ([`CrossDomainCallback`]); it is encoded
//!   with the generic binary serializer and sealed in a `CrossDomainEnvelope`.
//! - Results go through [`Marshal`]: security objects as security XML,
//!   everything else as generic binary.
//! - Failures in the target (errors and panics) come back as
//!   `InvokeError::Propagated` with category, message and stack text.
//! - An unloading or unloaded target yields `InvokeError::InvalidHandle`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::*;
pub use ports::CrossDomainApi;
pub use service::CrossDomainInvoker;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
