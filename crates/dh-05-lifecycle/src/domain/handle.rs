//! # Domain Handles
//!
//! The only way code outside the lifecycle manager reaches a domain. Every
//! operation checks the domain's state on entry; once the domain starts
//! unloading, all handles to it fail with `InvalidHandle`.

use super::context::{ContextError, ContextId};
use super::entities::{Domain, DomainSummary};
use super::errors::{DomainError, DomainResult};
use super::state::DomainState;
use dh_01_load_context::LoadContextSnapshot;
use dh_02_trust::{DomainTrust, GrantSet, TrustEvidence};
use dh_03_resolution::{ListenerHandle, Resolution, ResolveListener};
use dh_04_local_store::{AccessGuard, StoreValue};
use shared_bus::DeliveryReport;
use shared_types::{ComponentIdentity, DomainId, ResolveKind};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Shared reference to a domain.
#[derive(Clone)]
pub struct DomainHandle {
    domain: Arc<Domain>,
}

impl DomainHandle {
    pub(crate) fn new(domain: Arc<Domain>) -> Self {
        Self { domain }
    }

    pub(crate) fn domain(&self) -> &Arc<Domain> {
        &self.domain
    }

    /// Domain id.
    pub fn id(&self) -> DomainId {
        self.domain.id()
    }

    /// Friendly name.
    pub fn friendly_name(&self) -> &str {
        self.domain.friendly_name()
    }

    /// Current state.
    pub fn state(&self) -> DomainState {
        self.domain.state()
    }

    /// Whether operations through this handle can still succeed.
    pub fn is_valid(&self) -> bool {
        self.state().accepts_work()
    }

    /// Whether this is the default domain.
    pub fn is_default(&self) -> bool {
        self.domain.is_default()
    }

    /// Two handles to the same domain.
    pub fn same_domain(&self, other: &DomainHandle) -> bool {
        Arc::ptr_eq(&self.domain, &other.domain)
    }

    /// The domain's sealed load context.
    pub fn load_context(&self) -> DomainResult<Arc<LoadContextSnapshot>> {
        self.ensure_valid()?;
        self.domain
            .snapshot()
            .ok_or(DomainError::InvalidHandle { domain: self.id() })
    }

    fn ensure_valid(&self) -> DomainResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(DomainError::InvalidHandle { domain: self.id() })
        }
    }

    // =========================================================================
    // TRUST
    // =========================================================================

    /// The domain's trust state.
    pub fn trust(&self) -> DomainResult<&Arc<DomainTrust>> {
        self.ensure_valid()?;
        Ok(self.domain.trust())
    }

    /// The domain's grant set.
    pub fn grant(&self) -> DomainResult<GrantSet> {
        self.ensure_valid()?;
        Ok(self.domain.grant())
    }

    /// The domain's evidence.
    pub fn evidence(&self) -> DomainResult<TrustEvidence> {
        self.ensure_valid()?;
        Ok(self.domain.trust().evidence())
    }

    /// Id of the domain's execution context.
    pub fn context_id(&self) -> DomainResult<ContextId> {
        self.ensure_valid()?;
        self.domain
            .context_id()
            .ok_or(DomainError::InvalidHandle { domain: self.id() })
    }

    // =========================================================================
    // RESOLUTION
    // =========================================================================

    /// Append a resolve listener.
    pub fn register_listener<L>(&self, kind: ResolveKind, listener: L) -> DomainResult<ListenerHandle>
    where
        L: ResolveListener + 'static,
    {
        self.register_listener_arc(kind, Arc::new(listener))
    }

    /// Append a shared resolve listener.
    pub fn register_listener_arc(
        &self,
        kind: ResolveKind,
        listener: Arc<dyn ResolveListener>,
    ) -> DomainResult<ListenerHandle> {
        self.ensure_valid()?;
        Ok(self.domain.resolution().register_arc(kind, listener))
    }

    /// Remove a resolve listener.
    pub fn unregister_listener(&self, kind: ResolveKind, handle: &ListenerHandle) -> DomainResult<bool> {
        self.ensure_valid()?;
        Ok(self.domain.resolution().unregister(kind, handle))
    }

    /// Resolve a missing module, type or resource through the pipeline.
    ///
    /// Holds an in-flight slot while the listeners run.
    pub fn resolve(
        &self,
        kind: ResolveKind,
        name: &str,
        requesting: Option<&ComponentIdentity>,
    ) -> DomainResult<Resolution> {
        let _in_flight = self.domain.enter()?;
        Ok(self.domain.resolution().resolve(kind, name, requesting))
    }

    // =========================================================================
    // LOCAL STORE
    // =========================================================================

    /// Store a value in the domain-local store.
    pub fn set_data(
        &self,
        key: &str,
        value: impl Into<StoreValue>,
        guard: Option<AccessGuard>,
    ) -> DomainResult<()> {
        self.ensure_valid()?;
        Ok(self.domain.store().set(key, value, guard)?)
    }

    /// Read a value on behalf of a caller holding `caller_grant`.
    pub fn get_data(&self, key: &str, caller_grant: &GrantSet) -> DomainResult<Option<StoreValue>> {
        self.ensure_valid()?;
        Ok(self.domain.store().get(key, caller_grant)?)
    }

    /// Read a value with this domain's own grant.
    pub fn get_own_data(&self, key: &str) -> DomainResult<Option<StoreValue>> {
        let grant = self.grant()?;
        self.get_data(key, &grant)
    }

    /// Remove a generic store entry.
    pub fn remove_data(&self, key: &str) -> DomainResult<Option<StoreValue>> {
        self.ensure_valid()?;
        Ok(self.domain.store().remove(key)?)
    }

    /// Generic store keys.
    pub fn data_keys(&self) -> DomainResult<Vec<String>> {
        self.ensure_valid()?;
        Ok(self.domain.store().keys())
    }

    // =========================================================================
    // EXECUTION
    // =========================================================================

    /// Run `work` on the domain's execution context and wait for it.
    ///
    /// Holds an in-flight slot for the duration, so unload waits for it. A
    /// panic in `work` is published as a first-chance error and returned as
    /// `ExecutionFailed`.
    pub fn execute<R, F>(&self, work: F) -> DomainResult<R>
    where
        F: FnOnce(&DomainHandle) -> R + Send + 'static,
        R: Send + 'static,
    {
        let _in_flight = self.domain.enter()?;
        let inside = self.clone();
        match self.domain.run_in_context(move || work(&inside)) {
            Ok(result) => Ok(result),
            Err(ContextError::Panicked(message)) => {
                warn!(domain = %self.id(), error = %message, "[dh-05] Work panicked inside domain");
                self.domain.notify_first_chance("Panic", &message);
                Err(DomainError::ExecutionFailed {
                    domain: self.id(),
                    message,
                })
            }
            Err(_) => Err(DomainError::InvalidHandle { domain: self.id() }),
        }
    }

    /// Publish a first-chance error for this domain.
    pub fn report_first_chance(&self, category: &str, message: &str) -> DeliveryReport {
        self.domain.notify_first_chance(category, message)
    }

    /// Serializable summary.
    pub fn summary(&self) -> DomainSummary {
        self.domain.summary()
    }
}

impl PartialEq for DomainHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_domain(other)
    }
}

impl Eq for DomainHandle {}

impl fmt::Debug for DomainHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainHandle")
            .field("id", &self.id())
            .field("friendly_name", &self.friendly_name())
            .field("state", &self.state())
            .finish()
    }
}

impl fmt::Display for DomainHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id(), self.friendly_name())
    }
}
