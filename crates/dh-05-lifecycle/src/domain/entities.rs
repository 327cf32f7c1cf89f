//! # Domain Aggregate
//!
//! One isolated execution context and everything it owns: load context,
//! trust, optional manager, local store, resolution pipeline, worker thread
//! and in-flight counter.
//!
//! Only the lifecycle manager builds or transitions a `Domain`; everyone
//! else goes through a [`DomainHandle`](super::DomainHandle).

use super::context::{ContextError, ContextId, ExecutionContext};
use super::errors::{DomainError, DomainResult};
use super::in_flight::{InFlightGuard, InFlightTracker};
use super::state::DomainState;
use crate::ports::DomainManager;
use dh_01_load_context::{LoadContext, LoadContextSnapshot};
use dh_02_trust::{DomainTrust, GrantSet};
use dh_03_resolution::{ListenerFault, ResolutionPipeline};
use dh_04_local_store::DomainLocalStore;
use parking_lot::RwLock;
use serde::Serialize;
use shared_bus::{DeliveryReport, DomainEvent, InMemoryEventBus};
use shared_types::DomainId;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// An execution domain.
pub struct Domain {
    id: DomainId,
    friendly_name: Arc<str>,
    is_default: bool,
    state: RwLock<DomainState>,
    load_context: Arc<LoadContext>,
    trust: Arc<DomainTrust>,
    manager: RwLock<Option<Arc<dyn DomainManager>>>,
    store: DomainLocalStore,
    resolution: ResolutionPipeline,
    context: RwLock<Option<Arc<ExecutionContext>>>,
    in_flight: InFlightTracker,
    bus: Arc<InMemoryEventBus>,
}

impl Domain {
    /// A domain in `Created` state whose trust has just been resolved.
    pub(crate) fn new(
        id: DomainId,
        friendly_name: Arc<str>,
        is_default: bool,
        load_context: Arc<LoadContext>,
        trust: Arc<DomainTrust>,
        bus: Arc<InMemoryEventBus>,
    ) -> Arc<Self> {
        let resolution = ResolutionPipeline::new(id);
        let fault_bus = Arc::clone(&bus);
        resolution.set_fault_observer(Arc::new(move |fault: &ListenerFault| {
            fault_bus.emit(DomainEvent::FirstChanceError {
                domain_id: id,
                category: fault.category().to_string(),
                message: format!("{} listener '{}' for '{}': {}", fault.kind, fault.listener, fault.name, fault.message),
            });
        }));

        Arc::new(Self {
            id,
            friendly_name,
            is_default,
            state: RwLock::new(DomainState::Created),
            store: DomainLocalStore::new(Arc::clone(&load_context)),
            load_context,
            trust,
            manager: RwLock::new(None),
            resolution,
            context: RwLock::new(None),
            in_flight: InFlightTracker::new(id),
            bus,
        })
    }

    // =========================================================================
    // IDENTITY & STATE
    // =========================================================================

    /// Process-unique id.
    pub fn id(&self) -> DomainId {
        self.id
    }

    /// Friendly name given at creation.
    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    /// Whether this is the default domain.
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DomainState {
        *self.state.read()
    }

    /// Advance one step along the state machine.
    pub(crate) fn transition(&self, to: DomainState) -> DomainResult<()> {
        let mut state = self.state.write();
        if !state.can_transition_to(to) {
            return Err(DomainError::InvalidTransition {
                domain: self.id,
                from: *state,
                to,
            });
        }
        debug!(domain = %self.id, from = %*state, to = %to, "[dh-05] State transition");
        *state = to;
        Ok(())
    }

    /// `Active → Unloading` and close the in-flight tracker.
    pub(crate) fn begin_unload(&self) -> DomainResult<()> {
        let mut state = self.state.write();
        match *state {
            DomainState::Active => {
                *state = DomainState::Unloading;
                self.in_flight.close();
                Ok(())
            }
            DomainState::Unloading | DomainState::Unloaded => Err(DomainError::CannotUnload {
                domain: self.id,
                reason: "the domain is already unloading",
            }),
            other => Err(DomainError::InvalidTransition {
                domain: self.id,
                from: other,
                to: DomainState::Unloading,
            }),
        }
    }

    /// Admit one in-flight call. Fails unless the domain is active.
    pub(crate) fn enter(&self) -> DomainResult<InFlightGuard<'_>> {
        if !self.state().accepts_work() {
            return Err(DomainError::InvalidHandle { domain: self.id });
        }
        self.in_flight
            .enter()
            .ok_or(DomainError::InvalidHandle { domain: self.id })
    }

    pub(crate) fn in_flight(&self) -> &InFlightTracker {
        &self.in_flight
    }

    // =========================================================================
    // OWNED PARTS
    // =========================================================================

    /// The domain's load context.
    pub fn load_context(&self) -> &Arc<LoadContext> {
        &self.load_context
    }

    /// The sealed load context, once the domain is active.
    pub fn snapshot(&self) -> Option<Arc<LoadContextSnapshot>> {
        self.load_context.snapshot()
    }

    /// The domain's trust state.
    pub fn trust(&self) -> &Arc<DomainTrust> {
        &self.trust
    }

    /// The domain's grant set.
    pub fn grant(&self) -> GrantSet {
        self.trust.grant()
    }

    /// The domain's manager, if one was named.
    pub fn manager(&self) -> Option<Arc<dyn DomainManager>> {
        self.manager.read().clone()
    }

    pub(crate) fn set_manager(&self, manager: Arc<dyn DomainManager>) {
        *self.manager.write() = Some(manager);
    }

    pub(crate) fn store(&self) -> &DomainLocalStore {
        &self.store
    }

    pub(crate) fn resolution(&self) -> &ResolutionPipeline {
        &self.resolution
    }

    /// The bus lifecycle events are published on.
    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    // =========================================================================
    // EXECUTION CONTEXT
    // =========================================================================

    pub(crate) fn start_context(&self) -> DomainResult<ContextId> {
        let context = ExecutionContext::start(self.id).map_err(|e| DomainError::InitializationFailed {
            domain: self.id,
            reason: e.to_string(),
        })?;
        let id = context.id();
        *self.context.write() = Some(Arc::new(context));
        Ok(id)
    }

    pub(crate) fn stop_context(&self) {
        let context = self.context.write().take();
        if let Some(context) = context {
            context.stop();
        }
    }

    /// Id of the running execution context.
    pub fn context_id(&self) -> Option<ContextId> {
        self.context.read().as_ref().map(|c| c.id())
    }

    /// Run `work` on the execution context without lifecycle checks.
    pub(crate) fn run_in_context<R, F>(&self, work: F) -> Result<R, ContextError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let context = self.context.read().clone().ok_or(ContextError::Stopped)?;
        context.run(work)
    }

    // =========================================================================
    // NOTIFICATIONS
    // =========================================================================

    /// Publish a first-chance error raised inside this domain.
    pub fn notify_first_chance(&self, category: &str, message: &str) -> DeliveryReport {
        self.bus.emit(DomainEvent::FirstChanceError {
            domain_id: self.id,
            category: category.to_string(),
            message: message.to_string(),
        })
    }

    /// Summary for listings.
    pub fn summary(&self) -> DomainSummary {
        DomainSummary {
            id: self.id.as_u32(),
            friendly_name: self.friendly_name.to_string(),
            state: self.state(),
            is_default: self.is_default,
            homogeneous: self.trust.is_homogeneous(),
            fully_trusted: self.trust.is_fully_trusted(),
            context: self.context_id().map(|c| c.to_string()),
            application_base: self.load_context.application_base(),
        }
    }
}

impl fmt::Debug for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Domain")
            .field("id", &self.id)
            .field("friendly_name", &self.friendly_name)
            .field("state", &self.state())
            .field("is_default", &self.is_default)
            .finish()
    }
}

/// Serializable view of a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainSummary {
    /// Domain id.
    pub id: u32,
    /// Friendly name.
    pub friendly_name: String,
    /// Lifecycle state.
    pub state: DomainState,
    /// Whether this is the default domain.
    pub is_default: bool,
    /// Whether the grant set is fixed.
    pub homogeneous: bool,
    /// Whether the grant set is unrestricted.
    pub fully_trusted: bool,
    /// Execution context id, while running.
    pub context: Option<String>,
    /// Application base.
    pub application_base: Option<PathBuf>,
}
