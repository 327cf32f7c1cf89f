//! # Domain Layer for Lifecycle
//!
//! - **state**: `DomainState` machine
//! - **entities**: the `Domain` aggregate and `DomainSummary`
//! - **handle**: `DomainHandle`
//! - **context**: `ExecutionContext`, `ContextId`
//! - **in_flight**: drain tracking for unload
//! - **request**: `CreateDomainRequest`
//! - **errors**: `DomainError`

mod context;
mod entities;
mod errors;
mod handle;
mod in_flight;
mod request;
mod state;

pub use context::{current_domain, ContextError, ContextId, ExecutionContext};
pub use entities::{Domain, DomainSummary};
pub use errors::{DomainError, DomainResult};
pub use handle::DomainHandle;
pub use in_flight::{entered_on_current_thread, InFlightGuard, InFlightTracker};
pub use request::CreateDomainRequest;
pub use state::DomainState;
