//! # Event Publisher
//!
//! The publishing side of the bus, plus synchronous observer handlers.
//!
//! Two delivery paths exist for every event:
//!
//! - **Handlers** registered with [`InMemoryEventBus::on`] run synchronously
//!   on the publishing thread, each one isolated: an `Err` or a panic from one
//!   handler is logged and the remaining handlers still run.
//! - **Subscriptions** receive a copy through a `tokio::sync::broadcast`
//!   channel and consume it at their own pace.

use crate::events::{DomainEvent, EventFilter, EventTopic};
use crate::subscriber::{EventStream, EventSubscriber, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

/// Error returned by an observer handler.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Event handler failed: {0}")]
pub struct HandlerError(pub String);

/// A synchronous observer.
pub type EventHandler = Arc<dyn Fn(&DomainEvent) -> Result<(), HandlerError> + Send + Sync>;

/// Identifies a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// What happened to one published event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Broadcast receivers the event was queued for.
    pub receivers: usize,
    /// Handlers that ran to completion.
    pub handlers_notified: usize,
    /// Handlers that returned an error or panicked.
    pub handler_failures: usize,
}

impl DeliveryReport {
    /// Whether at least one observer saw the event.
    pub fn observed(&self) -> bool {
        self.receivers > 0 || self.handlers_notified > 0
    }
}

/// Trait for publishing events to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to the bus.
    async fn publish(&self, event: DomainEvent) -> DeliveryReport;

    /// Total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the event bus.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<DomainEvent>,
    handlers: RwLock<Vec<(HandlerId, EventFilter, EventHandler)>>,
    next_handler_id: AtomicU64,
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,
    events_published: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory event bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            handlers: RwLock::new(Vec::new()),
            next_handler_id: AtomicU64::new(1),
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to events matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let topic_key = format!("{:?}", filter.topics);

        if let Ok(mut subs) = self.subscriptions.write() {
            *subs.entry(topic_key.clone()).or_insert(0) += 1;
        }

        debug!(topics = ?filter.topics, "New subscription created");

        Subscription::new(receiver, filter, self.subscriptions.clone(), topic_key)
    }

    /// Stream of events matching a filter.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Register a synchronous handler.
    pub fn on<F>(&self, filter: EventFilter, handler: F) -> HandlerId
    where
        F: Fn(&DomainEvent) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let id = HandlerId(self.next_handler_id.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut handlers) = self.handlers.write() {
            handlers.push((id, filter, Arc::new(handler)));
        }
        id
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn remove_handler(&self, id: HandlerId) -> bool {
        let Ok(mut handlers) = self.handlers.write() else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(hid, _, _)| *hid != id);
        handlers.len() != before
    }

    /// Publish synchronously from non-async code.
    pub fn emit(&self, event: DomainEvent) -> DeliveryReport {
        let topic = event.topic();
        self.events_published.fetch_add(1, Ordering::Relaxed);

        let mut report = self.dispatch_handlers(&event);

        report.receivers = match self.sender.send(event) {
            Ok(count) => count,
            Err(_) => 0,
        };

        debug!(
            topic = ?topic,
            receivers = report.receivers,
            handlers = report.handlers_notified,
            failures = report.handler_failures,
            "Event published"
        );

        if topic == EventTopic::UnhandledError && !report.observed() {
            error!("Unhandled error event reached no observer");
        }

        report
    }

    /// Run matching handlers on a snapshot, isolating each one.
    fn dispatch_handlers(&self, event: &DomainEvent) -> DeliveryReport {
        let snapshot: Vec<EventHandler> = match self.handlers.read() {
            Ok(handlers) => handlers
                .iter()
                .filter(|(_, filter, _)| filter.matches(event))
                .map(|(_, _, handler)| handler.clone())
                .collect(),
            Err(_) => Vec::new(),
        };

        let mut report = DeliveryReport::default();
        for handler in snapshot {
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => report.handlers_notified += 1,
                Ok(Err(e)) => {
                    warn!(topic = ?event.topic(), error = %e, "Event handler failed");
                    report.handler_failures += 1;
                }
                Err(_) => {
                    warn!(topic = ?event.topic(), "Event handler panicked");
                    report.handler_failures += 1;
                }
            }
        }
        report
    }

    /// Number of active broadcast subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.read().map(|h| h.len()).unwrap_or(0)
    }

    /// Channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, filter: EventFilter) -> Subscription {
        InMemoryEventBus::subscribe(self, filter)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: DomainEvent) -> DeliveryReport {
        self.emit(event)
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
