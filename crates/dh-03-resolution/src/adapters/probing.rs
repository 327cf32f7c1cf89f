//! # Probing Listener
//!
//! Module listener backed by the sealed load context: walks the probe plan
//! and reports the first existing candidate file as the component location.

use crate::algorithms::module_reference;
use crate::domain::{ListenerResult, ResolveListener, ResolveRequest};
use dh_01_load_context::{ComponentLocator, FileProbe};
use shared_types::{Component, ResolveKind};
use tracing::debug;

/// Finds module files on the domain's probe plan.
pub struct ProbingListener<P: FileProbe> {
    locator: ComponentLocator<P>,
}

impl<P: FileProbe> ProbingListener<P> {
    /// Wrap a locator.
    pub fn new(locator: ComponentLocator<P>) -> Self {
        Self { locator }
    }
}

impl<P: FileProbe> ResolveListener for ProbingListener<P> {
    fn resolve(&self, request: &ResolveRequest) -> ListenerResult {
        if request.kind != ResolveKind::Module {
            return Ok(None);
        }
        let reference = module_reference(&request.name);
        let Some(path) = self.locator.locate(&reference.name) else {
            return Ok(None);
        };
        debug!(module = %request.name, path = %path.display(), "[dh-03] Module found on probe path");

        // A file on disk only proves the simple name; the requested
        // version, culture and key are taken as declared.
        Ok(Some(Component::new(reference).at(path)))
    }

    fn name(&self) -> &str {
        "probing"
    }
}
