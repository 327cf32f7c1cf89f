//! # Domain Layer for the Local Store
//!
//! - **keys**: `WellKnownKey`
//! - **value**: `StoreValue`
//! - **guard**: `AccessGuard`
//! - **errors**: `StoreError`

mod errors;
mod guard;
mod keys;
mod value;

pub use errors::*;
pub use guard::*;
pub use keys::*;
pub use value::*;
