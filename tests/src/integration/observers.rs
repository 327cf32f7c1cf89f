//! # Observer Integration
//!
//! Process-level notifications as seen by handlers and async subscribers:
//! a misbehaving handler never blocks the others, and an unhandled error
//! report says whether anyone was listening.

#[cfg(test)]
mod tests {
    use crate::fixtures::{host, record};
    use dh_01_load_context::LoadContext;
    use shared_bus::{DomainEvent, EventFilter, EventTopic, HandlerError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    // =============================================================================
    // HANDLER ISOLATION
    // =============================================================================

    #[test]
    fn test_failing_handlers_do_not_block_others() {
        let host = host();
        let domain = host.create("noisy", LoadContext::new(), None).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let topics = || EventFilter::topics(vec![EventTopic::UnhandledError]);
        host.bus()
            .on(topics(), |_| Err(HandlerError("observer offline".into())));
        host.bus().on(topics(), |_| panic!("observer bug"));
        let counter = Arc::clone(&calls);
        host.bus().on(topics(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let report = host.report_unhandled_error(&domain, "plugin crashed", false);
        assert!(report.observed());
        assert_eq!(report.handlers_notified, 1);
        assert_eq!(report.handler_failures, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unobserved_unhandled_error_is_reported() {
        let host = host();
        let domain = host.create("quiet", LoadContext::new(), None).unwrap();

        let report = host.report_unhandled_error(&domain, "nobody home", false);
        assert!(!report.observed());

        let seen = record(&host, EventTopic::UnhandledError);
        assert!(host.report_unhandled_error(&domain, "now observed", true).observed());
        assert!(matches!(
            seen.lock().as_slice(),
            [DomainEvent::UnhandledError { is_terminating: true, .. }]
        ));
    }

    #[test]
    fn test_domain_filter_limits_delivery() {
        let host = host();
        let a = host.create("a", LoadContext::new(), None).unwrap();
        let b = host.create("b", LoadContext::new(), None).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        host.bus().on(
            EventFilter::topics(vec![EventTopic::FirstChanceError]).for_domain(a.id()),
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        );

        a.report_first_chance("Custom", "seen");
        b.report_first_chance("Custom", "ignored");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    // =============================================================================
    // ASYNC SUBSCRIPTIONS
    // =============================================================================

    #[tokio::test]
    async fn test_subscription_receives_domain_unload() {
        let host = host();
        let mut subscription = host
            .bus()
            .subscribe(EventFilter::topics(vec![EventTopic::DomainUnload]));
        let domain = host.create("short-lived", LoadContext::new(), None).unwrap();
        let id = domain.id();

        host.unload(&domain).unwrap();

        let event = tokio::time::timeout(Duration::from_secs(1), subscription.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.domain_id(), Some(id));
        assert!(matches!(
            event,
            DomainEvent::DomainUnload { friendly_name, .. } if friendly_name == "short-lived"
        ));
    }

    #[tokio::test]
    async fn test_shutdown_publishes_exit_before_unloads() {
        let host = host();
        let mut subscription = host.bus().subscribe(EventFilter::topics(vec![
            EventTopic::ProcessExit,
            EventTopic::DomainUnload,
        ]));
        host.create("a", LoadContext::new(), None).unwrap();

        assert_eq!(host.shutdown(), 1);

        let events = subscription.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].topic(), EventTopic::ProcessExit);
        assert_eq!(events[1].topic(), EventTopic::DomainUnload);
    }
}
