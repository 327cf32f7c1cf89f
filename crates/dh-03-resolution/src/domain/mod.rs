//! # Domain Layer for Resolution
//!
//! - **listener**: `ResolveListener`, `ListenerChain`, `ListenerError`
//! - **registry**: `ListenerRegistry`, `ListenerHandle`
//! - **value_objects**: `ResolveRequest`, `Resolution`, `ListenerFault`

mod listener;
mod registry;
mod value_objects;

pub use listener::*;
pub use registry::*;
pub use value_objects::*;
