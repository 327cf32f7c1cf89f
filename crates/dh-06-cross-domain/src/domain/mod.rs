//! # Domain Layer for Cross-Domain Calls
//!
//! - **callback**: `CrossDomainCallback`
//! - **marshal**: `Marshal`, security XML vs generic binary
//! - **errors**: `InvokeError`, `RemoteError`

mod callback;
mod errors;
mod marshal;

pub use callback::CrossDomainCallback;
pub(crate) use callback::ReplyBody;
pub use errors::{InvokeError, RemoteError};
pub use marshal::{from_binary, to_binary, Binary, Marshal, MarshalError};
