//! # Host Runtime
//!
//! Wires the subsystems together.
//!
//! ## Startup Sequence
//!
//! 1. Build the lifecycle manager (creates the default domain)
//! 2. Attach bus observers that log unhandled and first-chance errors
//! 3. Create every configured plugin domain, each with a probing module
//!    listener over its sealed load context
//! 4. Ask each plugin domain for its grant set through the invoker

use crate::config::HostConfig;
use anyhow::{Context, Result};
use dh_01_load_context::{ComponentLocator, OsFileProbe};
use dh_02_trust::GrantSet;
use dh_03_resolution::ProbingListener;
use dh_05_lifecycle::{DomainHandle, DomainLifecycleManager, DomainSummary};
use dh_06_cross_domain::{CrossDomainCallback, CrossDomainInvoker};
use serde::{Deserialize, Serialize};
use shared_bus::{DomainEvent, EventFilter, EventTopic};
use shared_types::ResolveKind;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Asks a domain for its own grant set.
#[derive(Debug, Serialize, Deserialize)]
pub struct GrantQuery;

impl CrossDomainCallback for GrantQuery {
    type Output = GrantSet;

    fn call(self, domain: &DomainHandle) -> Result<GrantSet> {
        Ok(domain.grant()?)
    }
}

/// The running host.
pub struct HostRuntime {
    config: HostConfig,
    lifecycle: Arc<DomainLifecycleManager>,
    invoker: CrossDomainInvoker,
    plugins: Vec<DomainHandle>,
}

impl HostRuntime {
    /// Create the lifecycle manager and its default domain.
    pub fn new(config: HostConfig) -> Result<Self> {
        info!("Creating domain host runtime");

        let lifecycle = Arc::new(
            DomainLifecycleManager::new(config.default_load_context())
                .context("Failed to create the default domain")?,
        );
        let invoker = CrossDomainInvoker::new(Arc::clone(&lifecycle));

        Ok(Self {
            config,
            lifecycle,
            invoker,
            plugins: Vec::new(),
        })
    }

    /// Attach observers and create the configured plugin domains.
    pub fn start(&mut self) -> Result<()> {
        self.attach_observers();

        for name in self.config.domains.clone() {
            let handle = self.create_plugin(&name)?;
            match self
                .invoker
                .invoke(&self.lifecycle.default_domain(), &handle, GrantQuery)
            {
                Ok(grant) => info!(
                    domain = %handle.id(),
                    unrestricted = grant.is_unrestricted(),
                    "[host] Plugin domain ready"
                ),
                Err(e) => warn!(domain = %handle.id(), error = %e, "[host] Grant query failed"),
            }
            self.plugins.push(handle);
        }

        info!(domains = self.lifecycle.domains().len(), "[host] Host started");
        Ok(())
    }

    fn create_plugin(&self, name: &str) -> Result<DomainHandle> {
        let context = self
            .config
            .plugin_load_context(name)
            .with_context(|| format!("Invalid load context for '{}'", name))?;
        let handle = self
            .lifecycle
            .create(name, context, None)
            .with_context(|| format!("Failed to create domain '{}'", name))?;

        let locator = ComponentLocator::new(handle.load_context()?, OsFileProbe);
        handle
            .register_listener(ResolveKind::Module, ProbingListener::new(locator))
            .context("Failed to register the probing listener")?;
        Ok(handle)
    }

    fn attach_observers(&self) {
        self.lifecycle.bus().on(
            EventFilter::topics(vec![EventTopic::UnhandledError]),
            |event| {
                if let DomainEvent::UnhandledError {
                    domain_id, message, ..
                } = event
                {
                    error!(domain = %domain_id, %message, "[host] Unhandled error");
                }
                Ok(())
            },
        );
        self.lifecycle.bus().on(
            EventFilter::topics(vec![EventTopic::FirstChanceError]),
            |event| {
                if let DomainEvent::FirstChanceError {
                    domain_id,
                    category,
                    message,
                } = event
                {
                    warn!(domain = %domain_id, %category, %message, "[host] First-chance error");
                }
                Ok(())
            },
        );
    }

    /// Summaries of every active domain, default first.
    pub fn summaries(&self) -> Vec<DomainSummary> {
        self.lifecycle.domains().iter().map(DomainHandle::summary).collect()
    }

    /// Plugin domains created at startup.
    pub fn plugins(&self) -> &[DomainHandle] {
        &self.plugins
    }

    /// The lifecycle manager.
    pub fn lifecycle(&self) -> &Arc<DomainLifecycleManager> {
        &self.lifecycle
    }

    /// The cross-domain invoker.
    pub fn invoker(&self) -> &CrossDomainInvoker {
        &self.invoker
    }

    /// Publish process exit and unload every plugin domain.
    pub fn shutdown(&mut self) -> usize {
        info!("Initiating graceful shutdown...");
        let unloaded = self.lifecycle.shutdown();
        self.plugins.clear();
        info!(unloaded, "Shutdown complete");
        unloaded
    }
}
