//! # Catalog Listener
//!
//! Answers from an in-memory set of components. Used by hosts that preload
//! components and by tests.

use crate::algorithms::verify;
use crate::domain::{ListenerResult, ResolveListener, ResolveRequest};
use parking_lot::RwLock;
use shared_types::Component;

/// In-memory component catalog.
#[derive(Debug, Default)]
pub struct CatalogListener {
    name: String,
    components: RwLock<Vec<Component>>,
}

impl CatalogListener {
    /// An empty catalog.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: RwLock::new(Vec::new()),
        }
    }

    /// Add a component.
    #[must_use]
    pub fn with(self, component: Component) -> Self {
        self.add(component);
        self
    }

    /// Add a component to a shared catalog.
    pub fn add(&self, component: Component) {
        self.components.write().push(component);
    }

    /// Number of catalogued components.
    pub fn len(&self) -> usize {
        self.components.read().len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.components.read().is_empty()
    }
}

impl ResolveListener for CatalogListener {
    fn resolve(&self, request: &ResolveRequest) -> ListenerResult {
        Ok(self
            .components
            .read()
            .iter()
            .find(|component| verify(request.kind, &request.name, component))
            .cloned())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
