//! # Resolution Value Objects

use shared_types::{Component, ComponentIdentity, ResolveKind};

/// One request travelling through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    /// What is missing.
    pub kind: ResolveKind,
    /// Requested name: an identity string, a type name or a resource name.
    pub name: String,
    /// The component whose code triggered the request, if known.
    pub requesting: Option<ComponentIdentity>,
}

impl ResolveRequest {
    /// Create a request.
    pub fn new(kind: ResolveKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            requesting: None,
        }
    }

    /// Record the requesting component.
    #[must_use]
    pub fn requested_by(mut self, identity: ComponentIdentity) -> Self {
        self.requesting = Some(identity);
        self
    }
}

/// Outcome of a resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A listener produced a component that passed verification.
    Resolved(Component),
    /// No listener produced an acceptable component.
    NotFound,
}

impl Resolution {
    /// The resolved component, if any.
    pub fn component(&self) -> Option<&Component> {
        match self {
            Self::Resolved(component) => Some(component),
            Self::NotFound => None,
        }
    }

    /// Whether a component was found.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Consume into the component.
    pub fn into_component(self) -> Option<Component> {
        match self {
            Self::Resolved(component) => Some(component),
            Self::NotFound => None,
        }
    }
}

/// A listener error or panic that the pipeline swallowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerFault {
    /// Kind being resolved.
    pub kind: ResolveKind,
    /// Name being resolved.
    pub name: String,
    /// Name of the faulting listener.
    pub listener: String,
    /// Error text or panic payload.
    pub message: String,
    /// Whether the listener panicked (as opposed to returning `Err`).
    pub panicked: bool,
}

impl ListenerFault {
    /// Category label (`ListenerError` or `ListenerPanic`).
    pub fn category(&self) -> &'static str {
        if self.panicked {
            "ListenerPanic"
        } else {
            "ListenerError"
        }
    }
}
