//! # Manager Registry
//!
//! Named factories for [`DomainManager`]s. A load context refers to a
//! manager by type name; the registry turns that name into an instance.

use crate::ports::DomainManager;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Produces a fresh manager for each domain.
pub type ManagerFactory = Arc<dyn Fn() -> Arc<dyn DomainManager> + Send + Sync>;

/// Registry of manager factories, keyed by type name.
#[derive(Default)]
pub struct ManagerRegistry {
    factories: RwLock<BTreeMap<String, ManagerFactory>>,
}

impl ManagerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for `type_name`.
    pub fn register<F>(&self, type_name: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn DomainManager> + Send + Sync + 'static,
    {
        self.factories.write().insert(type_name.into(), Arc::new(factory));
    }

    /// Instantiate the manager registered as `type_name`.
    pub fn create(&self, type_name: &str) -> Option<Arc<dyn DomainManager>> {
        let factory = self.factories.read().get(type_name).cloned();
        factory.map(|factory| factory())
    }

    /// Whether `type_name` is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.read().contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.factories.read().keys().cloned().collect()
    }
}

impl fmt::Debug for ManagerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerRegistry").field("names", &self.names()).finish()
    }
}
