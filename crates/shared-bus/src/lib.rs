//! # Shared Bus - Lifecycle Observer Channels
//!
//! Fire-and-forget notification channels shared by every domain in a host.
//!
//! ## Topics
//!
//! | Topic | Published when |
//! |-------|----------------|
//! | `ProcessExit` | the host begins shutting down |
//! | `DomainUnload` | a domain has drained and is about to release its context |
//! | `UnhandledError` | an error escaped every handler inside a domain |
//! | `FirstChanceError` | an error was raised inside a domain (e.g. a faulting resolver) |
//!
//! ```text
//! ┌──────────────┐   emit()    ┌──────────────┐   handler(&event)   ┌──────────┐
//! │  Lifecycle   │ ──────────→ │  Event Bus   │ ──────────────────→ │ Observer │
//! │  Manager     │             │              │ ── broadcast ─────→ │  Stream  │
//! └──────────────┘             └──────────────┘                     └──────────┘
//! ```
//!
//! Dispatch is isolated: a handler that fails or panics never prevents the
//! remaining observers from being notified.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{DomainEvent, EventFilter, EventTopic};
pub use publisher::{
    DeliveryReport, EventHandler, EventPublisher, HandlerError, HandlerId, InMemoryEventBus,
};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
    }
}
