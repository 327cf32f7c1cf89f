//! # Cross-Domain Callbacks
//!
//! A callback is a plain serde struct: its fields are the state it carries
//! into the target domain. It is encoded on the caller's side, decoded into a
//! fresh value inside the target and run there.

use super::errors::RemoteError;
use super::marshal::Marshal;
use dh_05_lifecycle::DomainHandle;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Work that runs inside another domain.
pub trait CrossDomainCallback: Serialize + DeserializeOwned + Send + 'static {
    /// What the callback returns to the caller.
    type Output: Marshal + Send + 'static;

    /// Run inside `domain`, on its execution context.
    fn call(self, domain: &DomainHandle) -> anyhow::Result<Self::Output>;
}

/// Body of a reply envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum ReplyBody {
    /// The marshaled output.
    Returned(Vec<u8>),
    /// The callback failed.
    Failed(RemoteError),
}
