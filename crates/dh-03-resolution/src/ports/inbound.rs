//! Inbound ports (API) for the resolution subsystem.

use crate::domain::{ListenerHandle, Resolution, ResolveListener};
use shared_types::{ComponentIdentity, ResolveKind};
use std::sync::Arc;

/// What the rest of the host may ask of a domain's resolution pipeline.
pub trait ResolutionApi: Send + Sync {
    /// Append a listener to the kind's list.
    fn register(&self, kind: ResolveKind, listener: Arc<dyn ResolveListener>) -> ListenerHandle;

    /// Remove a registration. Returns `false` if it was not present.
    fn unregister(&self, kind: ResolveKind, handle: &ListenerHandle) -> bool;

    /// Run the listeners for a missing module, type or resource.
    fn resolve(
        &self,
        kind: ResolveKind,
        name: &str,
        requesting: Option<&ComponentIdentity>,
    ) -> Resolution;
}
