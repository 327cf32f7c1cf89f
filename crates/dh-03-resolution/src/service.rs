//! # Resolution Pipeline
//!
//! One pipeline per domain. `resolve` snapshots the kind's listener list,
//! flattens composites, and runs each leaf outside the registry lock, so a
//! listener may register further listeners or resolve again without
//! deadlocking. Later registrations only affect later requests.
//!
//! Each leaf's answer is verified against the request before it is accepted.
//! An `Err` or panic is reported to the fault observer and treated as "no
//! answer"; the next listener still runs.

use crate::algorithms::verify;
use crate::domain::{
    flatten, ListenerFault, ListenerHandle, ListenerRegistry, Resolution, ResolveListener,
    ResolveRequest,
};
use crate::ports::{FaultObserver, ResolutionApi};
use domain_telemetry::{LISTENER_FAULTS, RESOLVE_REQUESTS};
use parking_lot::RwLock;
use shared_types::{ComponentIdentity, DomainId, ResolveKind};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Ordered resolution for one domain.
pub struct ResolutionPipeline {
    domain: DomainId,
    registry: ListenerRegistry,
    observer: RwLock<Option<Arc<dyn FaultObserver>>>,
}

impl ResolutionPipeline {
    /// Pipeline for `domain` with no listeners.
    pub fn new(domain: DomainId) -> Self {
        Self {
            domain,
            registry: ListenerRegistry::new(),
            observer: RwLock::new(None),
        }
    }

    /// Domain this pipeline belongs to.
    pub fn domain(&self) -> DomainId {
        self.domain
    }

    /// Route swallowed faults to `observer`.
    pub fn set_fault_observer(&self, observer: Arc<dyn FaultObserver>) {
        *self.observer.write() = Some(observer);
    }

    /// Append a listener.
    pub fn register<L>(&self, kind: ResolveKind, listener: L) -> ListenerHandle
    where
        L: ResolveListener + 'static,
    {
        self.register_arc(kind, Arc::new(listener))
    }

    /// Append a shared listener.
    pub fn register_arc(&self, kind: ResolveKind, listener: Arc<dyn ResolveListener>) -> ListenerHandle {
        let handle = self.registry.register(kind, listener);
        debug!(
            domain = %self.domain,
            kind = %kind,
            listener = handle.listener().name(),
            "[dh-03] Listener registered"
        );
        handle
    }

    /// Remove a registration.
    pub fn unregister(&self, kind: ResolveKind, handle: &ListenerHandle) -> bool {
        self.registry.unregister(kind, handle)
    }

    /// Number of registrations for a kind.
    pub fn listener_count(&self, kind: ResolveKind) -> usize {
        self.registry.count(kind)
    }

    /// Drop every listener. Called when the domain unloads.
    pub fn clear(&self) {
        self.registry.clear();
    }

    /// Run the kind's listeners in order until one produces a verified component.
    pub fn resolve(
        &self,
        kind: ResolveKind,
        name: &str,
        requesting: Option<&ComponentIdentity>,
    ) -> Resolution {
        let mut request = ResolveRequest::new(kind, name);
        request.requesting = requesting.cloned();

        let listeners = flatten(&self.registry.snapshot(kind));
        trace!(domain = %self.domain, kind = %kind, name, listeners = listeners.len(), "[dh-03] Resolving");

        for listener in &listeners {
            match catch_unwind(AssertUnwindSafe(|| listener.resolve(&request))) {
                Ok(Ok(Some(component))) => {
                    if verify(kind, name, &component) {
                        debug!(
                            domain = %self.domain,
                            kind = %kind,
                            name,
                            listener = listener.name(),
                            "[dh-03] Resolved"
                        );
                        RESOLVE_REQUESTS.with_label_values(&[kind.as_str(), "resolved"]).inc();
                        return Resolution::Resolved(component);
                    }
                    debug!(
                        domain = %self.domain,
                        kind = %kind,
                        name,
                        listener = listener.name(),
                        produced = %component.identity,
                        "[dh-03] Listener answer failed verification"
                    );
                }
                Ok(Ok(None)) => {}
                Ok(Err(e)) => self.report(&request, listener.as_ref(), e.to_string(), false),
                Err(payload) => {
                    self.report(&request, listener.as_ref(), panic_message(payload.as_ref()), true)
                }
            }
        }

        RESOLVE_REQUESTS.with_label_values(&[kind.as_str(), "not_found"]).inc();
        Resolution::NotFound
    }

    fn report(&self, request: &ResolveRequest, listener: &dyn ResolveListener, message: String, panicked: bool) {
        let fault = ListenerFault {
            kind: request.kind,
            name: request.name.clone(),
            listener: listener.name().to_string(),
            message,
            panicked,
        };
        warn!(
            domain = %self.domain,
            kind = %fault.kind,
            name = %fault.name,
            listener = %fault.listener,
            error = %fault.message,
            "[dh-03] Listener fault swallowed"
        );
        LISTENER_FAULTS.with_label_values(&[fault.category()]).inc();

        let observer = self.observer.read().clone();
        if let Some(observer) = observer {
            if catch_unwind(AssertUnwindSafe(|| observer.on_fault(&fault))).is_err() {
                warn!(domain = %self.domain, "[dh-03] Fault observer panicked");
            }
        }
    }
}

impl ResolutionApi for ResolutionPipeline {
    fn register(&self, kind: ResolveKind, listener: Arc<dyn ResolveListener>) -> ListenerHandle {
        self.register_arc(kind, listener)
    }

    fn unregister(&self, kind: ResolveKind, handle: &ListenerHandle) -> bool {
        ResolutionPipeline::unregister(self, kind, handle)
    }

    fn resolve(
        &self,
        kind: ResolveKind,
        name: &str,
        requesting: Option<&ComponentIdentity>,
    ) -> Resolution {
        ResolutionPipeline::resolve(self, kind, name, requesting)
    }
}

/// Text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
