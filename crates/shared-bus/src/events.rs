//! # Lifecycle Events
//!
//! The notification channels every host exposes: process exit, domain unload,
//! unhandled errors and first-chance errors.

use serde::{Deserialize, Serialize};
use shared_types::entities::DomainId;

/// All events that can be published to the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainEvent {
    /// The host process is shutting down.
    ProcessExit {
        /// Domains still active when the exit began.
        active_domains: usize,
    },

    /// A domain is about to release its execution context.
    ///
    /// Published after in-flight work has drained and before the state
    /// becomes `Unloaded`.
    DomainUnload {
        /// The domain being unloaded.
        domain_id: DomainId,
        /// Its friendly name.
        friendly_name: String,
    },

    /// An error escaped all handlers inside a domain.
    UnhandledError {
        /// Domain in which the error surfaced.
        domain_id: DomainId,
        /// Error text.
        message: String,
        /// Whether the host intends to terminate because of it.
        is_terminating: bool,
    },

    /// An error was raised inside a domain, before any handler saw it.
    FirstChanceError {
        /// Domain in which the error was raised.
        domain_id: DomainId,
        /// Error category (e.g. `ListenerFault`, `Panic`).
        category: String,
        /// Error text.
        message: String,
    },
}

impl DomainEvent {
    /// Topic of this event.
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ProcessExit { .. } => EventTopic::ProcessExit,
            Self::DomainUnload { .. } => EventTopic::DomainUnload,
            Self::UnhandledError { .. } => EventTopic::UnhandledError,
            Self::FirstChanceError { .. } => EventTopic::FirstChanceError,
        }
    }

    /// Domain the event is about, if any.
    pub fn domain_id(&self) -> Option<DomainId> {
        match self {
            Self::ProcessExit { .. } => None,
            Self::DomainUnload { domain_id, .. }
            | Self::UnhandledError { domain_id, .. }
            | Self::FirstChanceError { domain_id, .. } => Some(*domain_id),
        }
    }
}

/// Event topics for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Process exit.
    ProcessExit,
    /// Domain unload.
    DomainUnload,
    /// Unhandled error.
    UnhandledError,
    /// First-chance error.
    FirstChanceError,
}

/// Filter for subscriptions and handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Topics to accept (empty means all).
    pub topics: Vec<EventTopic>,
    /// Only accept events about this domain (process-wide events always pass).
    pub domain: Option<DomainId>,
}

impl EventFilter {
    /// Accept everything.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Accept only the given topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            domain: None,
        }
    }

    /// Restrict to events about one domain.
    #[must_use]
    pub fn for_domain(mut self, domain: DomainId) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Whether `event` passes this filter.
    #[must_use]
    pub fn matches(&self, event: &DomainEvent) -> bool {
        if !self.topics.is_empty() && !self.topics.contains(&event.topic()) {
            return false;
        }
        match (self.domain, event.domain_id()) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => true,
        }
    }
}
