//! # Resolve Listeners
//!
//! A listener answers "where is X?" with `Ok(Some(component))`, `Ok(None)`
//! for "not me", or `Err` for a failure the pipeline will swallow.

use super::value_objects::ResolveRequest;
use shared_types::Component;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by a listener.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ListenerError(pub String);

/// What a listener returns.
pub type ListenerResult = Result<Option<Component>, ListenerError>;

/// Answers resolve requests.
pub trait ResolveListener: Send + Sync {
    /// Try to produce the requested component.
    fn resolve(&self, request: &ResolveRequest) -> ListenerResult;

    /// Name used in logs and fault reports.
    fn name(&self) -> &str {
        "listener"
    }

    /// Sub-listeners tried in order, if this listener is a composite.
    fn chained(&self) -> Option<&[Arc<dyn ResolveListener>]> {
        None
    }
}

impl<F> ResolveListener for F
where
    F: Fn(&ResolveRequest) -> ListenerResult + Send + Sync,
{
    fn resolve(&self, request: &ResolveRequest) -> ListenerResult {
        self(request)
    }
}

/// A composite listener: its sub-listeners run in chain order, each
/// result verified on its own.
#[derive(Clone, Default)]
pub struct ListenerChain {
    name: String,
    listeners: Vec<Arc<dyn ResolveListener>>,
}

impl ListenerChain {
    /// An empty chain.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            listeners: Vec::new(),
        }
    }

    /// Append a listener.
    #[must_use]
    pub fn then(mut self, listener: impl ResolveListener + 'static) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    /// Append a shared listener.
    #[must_use]
    pub fn then_arc(mut self, listener: Arc<dyn ResolveListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Number of direct sub-listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl ResolveListener for ListenerChain {
    /// Direct call: first `Some` from the chain, without verification.
    fn resolve(&self, request: &ResolveRequest) -> ListenerResult {
        for listener in &self.listeners {
            if let Some(component) = listener.resolve(request)? {
                return Ok(Some(component));
            }
        }
        Ok(None)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn chained(&self) -> Option<&[Arc<dyn ResolveListener>]> {
        Some(&self.listeners)
    }
}

impl fmt::Debug for ListenerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerChain")
            .field("name", &self.name)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Flatten composites into the order their leaves are tried.
pub fn flatten(listeners: &[Arc<dyn ResolveListener>]) -> Vec<Arc<dyn ResolveListener>> {
    let mut flat = Vec::with_capacity(listeners.len());
    for listener in listeners {
        match listener.chained() {
            Some(children) => flat.extend(flatten(children)),
            None => flat.push(Arc::clone(listener)),
        }
    }
    flat
}
