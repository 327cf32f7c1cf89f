//! # Resolution Integration
//!
//! Listener ordering, answer verification and fault isolation as seen
//! through a live domain, including the first-chance events raised for
//! swallowed listener faults.

#[cfg(test)]
mod tests {
    use crate::fixtures::{host, logging_listener, record};
    use dh_01_load_context::{ComponentLocator, LoadContext, MockFileProbe};
    use dh_03_resolution::{
        ListenerChain, ListenerError, ListenerResult, ProbingListener, ResolveRequest,
    };
    use parking_lot::Mutex;
    use shared_bus::{DomainEvent, EventTopic};
    use shared_types::{Component, ResolveKind};
    use std::sync::Arc;

    // =============================================================================
    // ORDERING
    // =============================================================================

    #[test]
    fn test_listeners_run_in_registration_order() {
        let host = host();
        let domain = host.create("ordered", LoadContext::new(), None).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        for label in ["a", "b", "c"] {
            domain
                .register_listener(ResolveKind::Type, logging_listener(label, Arc::clone(&log), None))
                .unwrap();
        }

        assert!(!domain.resolve(ResolveKind::Type, "Ns.Missing", None).unwrap().is_resolved());
        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_chain_runs_inline_with_outer_listeners() {
        let host = host();
        let domain = host.create("chained", LoadContext::new(), None).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        domain
            .register_listener(
                ResolveKind::Module,
                ListenerChain::new("inner")
                    .then(logging_listener("chain-1", Arc::clone(&log), None))
                    .then(logging_listener("chain-2", Arc::clone(&log), None)),
            )
            .unwrap();
        domain
            .register_listener(
                ResolveKind::Module,
                logging_listener("outer", Arc::clone(&log), Some(Component::named("Lib"))),
            )
            .unwrap();

        assert!(domain.resolve(ResolveKind::Module, "Lib", None).unwrap().is_resolved());
        assert_eq!(*log.lock(), vec!["chain-1", "chain-2", "outer"]);
    }

    #[test]
    fn test_unregistered_listener_is_skipped() {
        let host = host();
        let domain = host.create("churn", LoadContext::new(), None).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        let first = domain
            .register_listener(ResolveKind::Resource, logging_listener("first", Arc::clone(&log), None))
            .unwrap();
        domain
            .register_listener(ResolveKind::Resource, logging_listener("second", Arc::clone(&log), None))
            .unwrap();

        assert!(domain.unregister_listener(ResolveKind::Resource, &first).unwrap());
        domain.resolve(ResolveKind::Resource, "strings.resources", None).unwrap();
        assert_eq!(*log.lock(), vec!["second"]);
    }

    // =============================================================================
    // VERIFICATION
    // =============================================================================

    #[test]
    fn test_mismatched_answer_is_ignored() {
        let host = host();
        let domain = host.create("verify", LoadContext::new(), None).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        domain
            .register_listener(
                ResolveKind::Module,
                logging_listener("wrong", Arc::clone(&log), Some(Component::named("Other"))),
            )
            .unwrap();
        domain
            .register_listener(
                ResolveKind::Module,
                logging_listener("right", Arc::clone(&log), Some(Component::named("Wanted"))),
            )
            .unwrap();

        let component = domain
            .resolve(ResolveKind::Module, "Wanted", None)
            .unwrap()
            .into_component()
            .unwrap();
        assert_eq!(component.identity.name, "Wanted");
        assert_eq!(*log.lock(), vec!["wrong", "right"]);
    }

    #[test]
    fn test_type_request_matches_declared_type() {
        let host = host();
        let domain = host.create("types", LoadContext::new(), None).unwrap();
        let component = Component::named("Plugin.Core").with_type("Plugin.Core.Widget");
        domain
            .register_listener(ResolveKind::Type, move |_: &ResolveRequest| -> ListenerResult {
                Ok(Some(component.clone()))
            })
            .unwrap();

        let resolution = domain
            .resolve(ResolveKind::Type, "Plugin.Core.Widget, Plugin.Core, Version=1.0.0.0", None)
            .unwrap();
        assert!(resolution.is_resolved());
        assert!(!domain.resolve(ResolveKind::Type, "Plugin.Core.Gadget", None).unwrap().is_resolved());
    }

    #[test]
    fn test_probing_listener_uses_domain_load_context() {
        let host = host();
        let domain = host
            .create(
                "probing",
                LoadContext::builder()
                    .private_search_path("plugins")
                    .module_extensions(["dll"])
                    .build(),
                None,
            )
            .unwrap();

        let probe = MockFileProbe::new();
        probe.add_file("/srv/host/plugins/Extra.dll");
        let locator = ComponentLocator::new(domain.load_context().unwrap(), probe);
        domain
            .register_listener(ResolveKind::Module, ProbingListener::new(locator))
            .unwrap();

        let component = domain
            .resolve(ResolveKind::Module, "Extra", None)
            .unwrap()
            .into_component()
            .unwrap();
        assert_eq!(
            component.location.as_deref(),
            Some(std::path::Path::new("/srv/host/plugins/Extra.dll"))
        );
    }

    // =============================================================================
    // FAULT ISOLATION
    // =============================================================================

    #[test]
    fn test_faulting_listeners_do_not_stop_resolution() {
        let host = host();
        let faults = record(&host, EventTopic::FirstChanceError);
        let domain = host.create("faulty", LoadContext::new(), None).unwrap();

        domain
            .register_listener(ResolveKind::Module, |_: &ResolveRequest| -> ListenerResult {
                Err(ListenerError("disk unavailable".into()))
            })
            .unwrap();
        domain
            .register_listener(ResolveKind::Module, |_: &ResolveRequest| -> ListenerResult {
                panic!("listener bug")
            })
            .unwrap();
        domain
            .register_listener(ResolveKind::Module, |_: &ResolveRequest| -> ListenerResult {
                Ok(Some(Component::named("Lib")))
            })
            .unwrap();

        assert!(domain.resolve(ResolveKind::Module, "Lib", None).unwrap().is_resolved());

        let faults = faults.lock();
        let categories: Vec<&str> = faults
            .iter()
            .filter_map(|event| match event {
                DomainEvent::FirstChanceError { domain_id, category, .. } if *domain_id == domain.id() => {
                    Some(category.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(categories, vec!["ListenerError", "ListenerPanic"]);
    }

    #[test]
    fn test_unloaded_domain_refuses_resolution() {
        let host = host();
        let domain = host.create("gone", LoadContext::new(), None).unwrap();
        host.unload(&domain).unwrap();

        assert!(domain.resolve(ResolveKind::Module, "Lib", None).is_err());
        assert!(domain
            .register_listener(ResolveKind::Module, |_: &ResolveRequest| -> ListenerResult {
                Ok(None)
            })
            .is_err());
    }
}
