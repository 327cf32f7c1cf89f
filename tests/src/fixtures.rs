//! # Test Fixtures

use dh_01_load_context::LoadContext;
use dh_03_resolution::{ListenerResult, ResolveRequest};
use dh_05_lifecycle::DomainLifecycleManager;
use parking_lot::Mutex;
use shared_bus::{DomainEvent, EventFilter, EventTopic};
use shared_types::Component;
use std::sync::Arc;

/// Application base of every test host.
pub const HOST_BASE: &str = "/srv/host";

/// A lifecycle manager with the default domain rooted at [`HOST_BASE`].
pub fn host() -> Arc<DomainLifecycleManager> {
    Arc::new(
        DomainLifecycleManager::new(LoadContext::builder().application_base(HOST_BASE).build())
            .expect("default domain"),
    )
}

/// Record every bus event on `topic`.
pub fn record(host: &DomainLifecycleManager, topic: EventTopic) -> Arc<Mutex<Vec<DomainEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    host.bus().on(EventFilter::topics(vec![topic]), move |event| {
        sink.lock().push(event.clone());
        Ok(())
    });
    seen
}

/// A listener that logs its label into `log` and answers with `answer`.
pub fn logging_listener(
    label: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
    answer: Option<Component>,
) -> impl Fn(&ResolveRequest) -> ListenerResult + Send + Sync + 'static {
    move |_request: &ResolveRequest| {
        log.lock().push(label);
        Ok(answer.clone())
    }
}
