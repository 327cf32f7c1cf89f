//! Inbound ports (API) for cross-domain calls.

use crate::domain::{CrossDomainCallback, InvokeError};
use dh_05_lifecycle::DomainHandle;
use shared_types::DomainId;

/// Cross-domain invocation.
pub trait CrossDomainApi: Send + Sync {
    /// Run `callback` inside `target` on behalf of `source` and copy its
    /// result back.
    fn invoke<C: CrossDomainCallback>(
        &self,
        source: &DomainHandle,
        target: &DomainHandle,
        callback: C,
    ) -> Result<C::Output, InvokeError>;

    /// As [`CrossDomainApi::invoke`], addressing both domains by id.
    fn invoke_by_id<C: CrossDomainCallback>(
        &self,
        source: DomainId,
        target: DomainId,
        callback: C,
    ) -> Result<C::Output, InvokeError>;
}
