//! # Domain Lifecycle Manager
//!
//! Creates, activates and unloads domains.
//!
//! ## Creation
//!
//! ```text
//! validate name ─→ creator may supply evidence? ─→ sandbox check (no grant)
//!       │
//!       ↓
//! [Created] ─trust resolved─→ [SecurityInitialized] ─→ manager ─→ seal load context
//!                                                        ─→ start context ─→ initializer ─→ [Active]
//! ```
//!
//! Any failure after the domain was allocated tears it down; it is never
//! published.
//!
//! ## Unload
//!
//! `Active → Unloading` (new work refused) → wait for in-flight work →
//! publish `DomainUnload` → stop the execution context → `Unloaded`.

use crate::adapters::ManagerRegistry;
use crate::domain::{
    current_domain, entered_on_current_thread, ContextError, CreateDomainRequest, Domain,
    DomainError, DomainHandle, DomainResult, DomainState,
};
use crate::ports::DomainLifecycleApi;
use dh_01_load_context::LoadContext;
use dh_02_trust::{TrustEvidence, TrustEvidenceApi, TrustEvidenceResolver, TrustRequest};
use domain_telemetry::{
    log_domain_event, HistogramTimer, DOMAINS_ACTIVE, DOMAINS_CREATED, DOMAINS_UNLOADED,
    DOMAIN_CREATE_FAILURES, UNLOAD_DRAIN_DURATION,
};
use parking_lot::RwLock;
use shared_bus::{DeliveryReport, DomainEvent, InMemoryEventBus};
use shared_types::{DomainId, ProcessServices};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Friendly name of the default domain.
pub const DEFAULT_DOMAIN_NAME: &str = "default";

/// Builder for [`DomainLifecycleManager`].
pub struct LifecycleManagerBuilder {
    services: Option<Arc<ProcessServices>>,
    bus: Option<Arc<InMemoryEventBus>>,
    trust: Option<Arc<dyn TrustEvidenceApi>>,
    managers: Option<Arc<ManagerRegistry>>,
    default_context: Option<LoadContext>,
}

impl LifecycleManagerBuilder {
    /// Process services (id allocator, interner).
    #[must_use]
    pub fn services(mut self, services: Arc<ProcessServices>) -> Self {
        self.services = Some(services);
        self
    }

    /// Bus for lifecycle events.
    #[must_use]
    pub fn bus(mut self, bus: Arc<InMemoryEventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Trust resolver.
    #[must_use]
    pub fn trust(mut self, trust: Arc<dyn TrustEvidenceApi>) -> Self {
        self.trust = Some(trust);
        self
    }

    /// Domain manager factories.
    #[must_use]
    pub fn managers(mut self, managers: Arc<ManagerRegistry>) -> Self {
        self.managers = Some(managers);
        self
    }

    /// Load context of the default domain. Its base defaults to the
    /// current directory.
    #[must_use]
    pub fn default_context(mut self, context: LoadContext) -> Self {
        self.default_context = Some(context);
        self
    }

    /// Build the manager and activate the default domain.
    pub fn build(self) -> DomainResult<DomainLifecycleManager> {
        DomainLifecycleManager::start(
            self.services.unwrap_or_else(ProcessServices::new),
            self.bus.unwrap_or_else(|| Arc::new(InMemoryEventBus::new())),
            self.trust.unwrap_or_else(|| {
                Arc::new(TrustEvidenceResolver::with_defaults()) as Arc<dyn TrustEvidenceApi>
            }),
            self.managers.unwrap_or_default(),
            self.default_context.unwrap_or_default(),
        )
    }
}

/// Owns every domain in the process.
pub struct DomainLifecycleManager {
    services: Arc<ProcessServices>,
    bus: Arc<InMemoryEventBus>,
    trust: Arc<dyn TrustEvidenceApi>,
    managers: Arc<ManagerRegistry>,
    domains: RwLock<BTreeMap<DomainId, Arc<Domain>>>,
    default_domain: DomainHandle,
}

impl DomainLifecycleManager {
    /// Start configuring a manager.
    pub fn builder() -> LifecycleManagerBuilder {
        LifecycleManagerBuilder {
            services: None,
            bus: None,
            trust: None,
            managers: None,
            default_context: None,
        }
    }

    /// Manager with default collaborators and the given default load context.
    pub fn new(default_context: LoadContext) -> DomainResult<Self> {
        Self::builder().default_context(default_context).build()
    }

    fn start(
        services: Arc<ProcessServices>,
        bus: Arc<InMemoryEventBus>,
        trust: Arc<dyn TrustEvidenceApi>,
        managers: Arc<ManagerRegistry>,
        default_context: LoadContext,
    ) -> DomainResult<Self> {
        if default_context.application_base().is_none() {
            let cwd = std::env::current_dir()
                .map_err(|e| DomainError::InvalidArgument(format!("no application base: {}", e)))?;
            default_context.set_application_base(cwd)?;
        }

        let id = services.ids().allocate();
        let mut request = TrustRequest::new(id).generate_default(true);
        if let Some(base) = default_context.application_base() {
            request = request.application_base(base);
        }
        let domain_trust = trust.resolve(request)?;

        let domain = Domain::new(
            id,
            services.interner().intern(DEFAULT_DOMAIN_NAME),
            true,
            Arc::new(default_context),
            domain_trust,
            Arc::clone(&bus),
        );

        let manager = Self {
            services,
            bus,
            trust,
            managers,
            domains: RwLock::new(BTreeMap::new()),
            default_domain: DomainHandle::new(Arc::clone(&domain)),
        };

        domain.transition(DomainState::SecurityInitialized)?;
        if let Err(e) = manager.activate(&domain) {
            manager.tear_down(&domain, &e);
            return Err(e);
        }
        manager.publish(domain);
        Ok(manager)
    }

    // =========================================================================
    // CREATION
    // =========================================================================

    /// Create and activate a domain.
    pub fn create(
        &self,
        friendly_name: &str,
        load_context: LoadContext,
        evidence: Option<TrustEvidence>,
    ) -> DomainResult<DomainHandle> {
        let mut request = CreateDomainRequest::new(friendly_name, load_context);
        request.evidence = evidence;
        self.create_domain(request)
    }

    /// Create and activate a domain from a full request.
    #[instrument(skip_all, fields(name = %request.friendly_name))]
    pub fn create_domain(&self, request: CreateDomainRequest) -> DomainResult<DomainHandle> {
        self.try_create(request).map_err(|e| {
            DOMAIN_CREATE_FAILURES.with_label_values(&[e.kind().as_label()]).inc();
            warn!(error = %e, kind = %e.kind(), "[dh-05] Domain creation failed");
            e
        })
    }

    fn try_create(&self, request: CreateDomainRequest) -> DomainResult<DomainHandle> {
        let friendly_name = request.friendly_name.trim();
        if friendly_name.is_empty() {
            return Err(DomainError::InvalidArgument("friendly name must not be empty".into()));
        }
        if request.grant.is_none() && !request.full_trust.is_empty() {
            return Err(DomainError::InvalidArgument(
                "a full-trust list requires an explicit grant set".into(),
            ));
        }

        let creator = request.creator.clone().unwrap_or_else(|| self.default_domain());
        if !creator.is_valid() {
            return Err(DomainError::InvalidHandle { domain: creator.id() });
        }
        let creator_trust = Arc::clone(creator.domain().trust());

        if let Some(evidence) = &request.evidence {
            self.trust.authorize_evidence(&creator_trust)?;
            if request.grant.is_none() {
                self.trust.check_sandbox_creation(evidence, &creator_trust)?;
            }
        }

        let load_context = request.load_context;
        if let Some(defaults) = self.default_domain.domain().snapshot() {
            load_context.inherit_from(&defaults)?;
        }

        let id = self.services.ids().allocate();
        let mut trust_request = TrustRequest::new(id).generate_default(request.generate_default_evidence);
        if let Some(base) = load_context.application_base() {
            trust_request = trust_request.application_base(base);
        }
        if let Some(evidence) = request.evidence {
            trust_request = trust_request.provided(evidence);
        }
        if !creator.is_default() {
            trust_request = trust_request.creator_evidence(creator_trust.evidence());
        }
        if request.inherit_evidence_from_default {
            trust_request = trust_request.inherit_from(Arc::clone(self.default_domain.domain().trust()));
        }
        if let Some(grant) = request.grant {
            trust_request = trust_request.homogeneous(grant, request.full_trust);
        }

        let domain = Domain::new(
            id,
            self.services.interner().intern(friendly_name),
            false,
            Arc::new(load_context),
            self.trust.resolve(trust_request)?,
            Arc::clone(&self.bus),
        );
        domain.transition(DomainState::SecurityInitialized)?;

        if let Err(e) = self.activate(&domain) {
            self.tear_down(&domain, &e);
            return Err(e);
        }
        Ok(self.publish(domain))
    }

    /// Manager, seal, context, initializer, `Active`.
    fn activate(&self, domain: &Arc<Domain>) -> DomainResult<()> {
        let id = domain.id();
        let context = domain.load_context();

        if let Some(type_name) = context.manager_type() {
            let manager = self.managers.create(&type_name).ok_or_else(|| {
                DomainError::InvalidArgument(format!("unknown domain manager type '{}'", type_name))
            })?;
            manager
                .initialize_new_domain(id, context)
                .map_err(|e| DomainError::InitializationFailed {
                    domain: id,
                    reason: format!("manager '{}' failed: {}", manager.name(), e),
                })?;
            domain.set_manager(manager);
        }

        context.finalize()?;
        domain.start_context()?;

        if let Some((initializer, args)) = context.take_initializer() {
            let outcome = domain.run_in_context(move || initializer(args));
            let reason = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(format!("initializer failed: {}", e)),
                Err(ContextError::Panicked(message)) => Some(format!("initializer panicked: {}", message)),
                Err(e) => Some(e.to_string()),
            };
            if let Some(reason) = reason {
                return Err(DomainError::InitializationFailed { domain: id, reason });
            }
        }

        domain.trust().freeze();
        domain.transition(DomainState::Active)
    }

    fn tear_down(&self, domain: &Arc<Domain>, cause: &DomainError) {
        domain.stop_context();
        domain.resolution().clear();
        domain.notify_first_chance("InitializationFailed", &cause.to_string());
        warn!(domain = %domain.id(), error = %cause, "[dh-05] Half-built domain torn down");
    }

    fn publish(&self, domain: Arc<Domain>) -> DomainHandle {
        let handle = DomainHandle::new(Arc::clone(&domain));
        self.domains.write().insert(domain.id(), Arc::clone(&domain));
        DOMAINS_CREATED.inc();
        DOMAINS_ACTIVE.inc();
        log_domain_event!(
            info,
            "dh-05",
            domain.id(),
            "[dh-05] Domain activated",
            friendly_name = %domain.friendly_name(),
            context = ?domain.context_id(),
            homogeneous = domain.trust().is_homogeneous()
        );
        handle
    }

    // =========================================================================
    // UNLOAD
    // =========================================================================

    /// Drain and unload a domain. Blocks until in-flight work finishes.
    #[instrument(skip_all, fields(domain = %handle.id()))]
    pub fn unload(&self, handle: &DomainHandle) -> DomainResult<()> {
        let domain = handle.domain();
        let id = domain.id();

        if domain.is_default() {
            return Err(DomainError::CannotUnload {
                domain: id,
                reason: "the default domain is never unloaded",
            });
        }
        if current_domain() == Some(id) || entered_on_current_thread(id) {
            return Err(DomainError::CannotUnload {
                domain: id,
                reason: "unload requested from inside the domain would wait on itself",
            });
        }

        domain.begin_unload()?;
        info!(domain = %id, in_flight = domain.in_flight().active(), "[dh-05] Unloading domain");

        {
            let _timer = HistogramTimer::new(&UNLOAD_DRAIN_DURATION);
            domain.in_flight().wait_idle();
        }

        self.bus.emit(DomainEvent::DomainUnload {
            domain_id: id,
            friendly_name: domain.friendly_name().to_string(),
        });

        domain.stop_context();
        domain.resolution().clear();
        domain.store().clear();
        domain.transition(DomainState::Unloaded)?;
        self.domains.write().remove(&id);

        DOMAINS_UNLOADED.inc();
        DOMAINS_ACTIVE.dec();
        log_domain_event!(info, "dh-05", id, "[dh-05] Domain unloaded");
        Ok(())
    }

    /// Publish `ProcessExit` and unload every non-default domain.
    ///
    /// Returns the number of domains unloaded.
    pub fn shutdown(&self) -> usize {
        let targets: Vec<DomainHandle> = self
            .domains()
            .into_iter()
            .filter(|handle| !handle.is_default())
            .collect();

        self.bus.emit(DomainEvent::ProcessExit {
            active_domains: targets.len() + 1,
        });

        let mut unloaded = 0;
        for handle in &targets {
            match self.unload(handle) {
                Ok(()) => unloaded += 1,
                Err(e) => warn!(domain = %handle.id(), error = %e, "[dh-05] Domain not unloaded at shutdown"),
            }
        }
        info!(unloaded, "[dh-05] Host shut down");
        unloaded
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// The default domain.
    pub fn default_domain(&self) -> DomainHandle {
        self.default_domain.clone()
    }

    /// Whether `handle` refers to the default domain.
    pub fn is_default(&self, handle: &DomainHandle) -> bool {
        handle.same_domain(&self.default_domain)
    }

    /// An active domain by id.
    pub fn get(&self, id: DomainId) -> Option<DomainHandle> {
        self.domains.read().get(&id).cloned().map(DomainHandle::new)
    }

    /// Every registered domain, by id.
    pub fn domains(&self) -> Vec<DomainHandle> {
        self.domains.read().values().cloned().map(DomainHandle::new).collect()
    }

    /// The lifecycle event bus.
    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    /// Process services.
    pub fn services(&self) -> &Arc<ProcessServices> {
        &self.services
    }

    /// Domain manager factories.
    pub fn managers(&self) -> &Arc<ManagerRegistry> {
        &self.managers
    }

    // =========================================================================
    // NOTIFICATIONS
    // =========================================================================

    /// Publish an unhandled error raised in `handle`'s domain.
    ///
    /// The report says whether any observer saw it.
    pub fn report_unhandled_error(
        &self,
        handle: &DomainHandle,
        message: &str,
        is_terminating: bool,
    ) -> DeliveryReport {
        let report = self.bus.emit(DomainEvent::UnhandledError {
            domain_id: handle.id(),
            message: message.to_string(),
            is_terminating,
        });
        if is_terminating {
            error!(domain = %handle.id(), error = message, "[dh-05] Terminating unhandled error");
        }
        report
    }

    /// Publish a first-chance error raised in `handle`'s domain.
    pub fn report_first_chance(&self, handle: &DomainHandle, category: &str, message: &str) -> DeliveryReport {
        handle.report_first_chance(category, message)
    }
}

impl DomainLifecycleApi for DomainLifecycleManager {
    fn create(
        &self,
        friendly_name: &str,
        load_context: LoadContext,
        evidence: Option<TrustEvidence>,
    ) -> DomainResult<DomainHandle> {
        DomainLifecycleManager::create(self, friendly_name, load_context, evidence)
    }

    fn create_domain(&self, request: CreateDomainRequest) -> DomainResult<DomainHandle> {
        DomainLifecycleManager::create_domain(self, request)
    }

    fn unload(&self, handle: &DomainHandle) -> DomainResult<()> {
        DomainLifecycleManager::unload(self, handle)
    }

    fn is_default(&self, handle: &DomainHandle) -> bool {
        DomainLifecycleManager::is_default(self, handle)
    }

    fn get(&self, id: DomainId) -> Option<DomainHandle> {
        DomainLifecycleManager::get(self, id)
    }

    fn report_unhandled_error(
        &self,
        handle: &DomainHandle,
        message: &str,
        is_terminating: bool,
    ) -> DeliveryReport {
        DomainLifecycleManager::report_unhandled_error(self, handle, message, is_terminating)
    }
}
