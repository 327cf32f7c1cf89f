//! # Resolution Pipeline Subsystem (dh-03)
//!
//! Per-domain, ordered, fault-isolated resolution of missing modules, types
//! and manifest resources.
//!
//! ## Behaviour
//!
//! | Rule | Enforced by |
//! |------|-------------|
//! | Listeners run in registration order | `ListenerRegistry` |
//! | First verified answer wins | `ResolutionPipeline::resolve` + `verify` |
//! | Composite listeners are flattened, members verified one by one | `flatten` |
//! | A failing listener never stops the pipeline | `catch_unwind` per listener |
//! | No lock is held while a listener runs | snapshot before dispatch |
//!
//! ## Architecture
//!
//! ```text
//! domain/      - ResolveRequest, Resolution, ResolveListener, ListenerChain, ListenerRegistry
//! algorithms/  - verify
//! ports/       - ResolutionApi (in), FaultObserver (out)
//! adapters/    - CatalogListener, ProbingListener
//! service.rs   - ResolutionPipeline
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{CatalogListener, ProbingListener};
pub use algorithms::verify;
pub use domain::*;
pub use ports::{FaultObserver, RecordingFaultObserver, ResolutionApi};
pub use service::{panic_message, ResolutionPipeline};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
