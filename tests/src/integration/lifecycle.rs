//! # Lifecycle Integration
//!
//! Domain creation, trust resolution and unload exercised across the
//! load-context, trust, store and lifecycle crates together.

#[cfg(test)]
mod tests {
    use crate::fixtures::{host, record, HOST_BASE};
    use dh_01_load_context::LoadContext;
    use dh_02_trust::{EvidenceSource, GrantSet, Permission, SecurityZone, TrustEvidence};
    use dh_04_local_store::{AccessGuard, StoreValue};
    use dh_03_resolution::{ListenerResult, ResolveRequest};
    use dh_05_lifecycle::{CreateDomainRequest, DomainState};
    use parking_lot::Mutex;
    use shared_bus::{DomainEvent, EventTopic};
    use shared_types::{Component, ComponentIdentity, ErrorKind, ResolveKind};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{mpsc, Arc};
    use std::time::Duration;

    // =============================================================================
    // LOAD CONTEXT
    // =============================================================================

    #[test]
    fn test_concurrent_finalize_yields_one_snapshot() {
        let context = Arc::new(
            LoadContext::builder()
                .application_base("/srv/app")
                .private_search_path("bin")
                .build(),
        );

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let context = Arc::clone(&context);
                std::thread::spawn(move || context.finalize().unwrap())
            })
            .collect();
        let snapshots: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();

        assert!(context.is_sealed());
        for snapshot in &snapshots[1..] {
            assert!(Arc::ptr_eq(&snapshots[0], snapshot));
        }
    }

    #[test]
    fn test_new_domain_inherits_default_base() {
        let host = host();
        let domain = host.create("child", LoadContext::new(), None).unwrap();

        assert_eq!(
            domain.load_context().unwrap().application_base,
            PathBuf::from(HOST_BASE)
        );
        assert_eq!(domain.state(), DomainState::Active);
    }

    // =============================================================================
    // TRUST
    // =============================================================================

    #[test]
    fn test_sandbox_requires_explicit_grant() {
        let host = host();
        let err = host
            .create(
                "sandbox",
                LoadContext::new(),
                Some(TrustEvidence::for_zone(SecurityZone::Internet)),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedSandboxCreation);

        // Nothing half-built is visible.
        assert_eq!(host.domains().len(), 1);
    }

    #[test]
    fn test_homogeneous_grant_is_fixed() {
        let host = host();
        let grant = GrantSet::of([Permission::Execution, Permission::Reflection]);
        let domain = host
            .create_domain(
                CreateDomainRequest::new("fixed", LoadContext::new())
                    .evidence(TrustEvidence::for_zone(SecurityZone::MyComputer))
                    .homogeneous(grant.clone(), Vec::new()),
            )
            .unwrap();

        let trust = domain.trust().unwrap();
        assert!(trust.is_homogeneous());
        assert_eq!(domain.grant().unwrap(), grant);
        // MyComputer evidence would normally be unrestricted.
        let unlisted = ComponentIdentity::new("Anything");
        assert_eq!(
            trust.grant_for_component(&unlisted, &TrustEvidence::for_zone(SecurityZone::MyComputer)),
            grant
        );
    }

    #[test]
    fn test_lazy_evidence_matches_default_zone() {
        let host = host();
        let deferred = host.create("deferred", LoadContext::new(), None).unwrap();
        let inherited = host
            .create_domain(
                CreateDomainRequest::new("inherited", LoadContext::new()).inherit_evidence_from_default(),
            )
            .unwrap();

        let deferred_trust = deferred.trust().unwrap();
        assert_eq!(deferred_trust.evidence_source(), EvidenceSource::Deferred);
        assert!(!deferred_trust.has_resolved_evidence());

        let inherited_trust = inherited.trust().unwrap();
        assert_eq!(inherited_trust.evidence_source(), EvidenceSource::InheritedFromDefault);

        let default_zone = host.default_domain().evidence().unwrap().zone();
        assert_eq!(default_zone, SecurityZone::MyComputer);
        assert_eq!(deferred.evidence().unwrap().zone(), default_zone);
        assert_eq!(inherited.evidence().unwrap().zone(), default_zone);
        assert!(deferred_trust.has_resolved_evidence());
    }

    // =============================================================================
    // LOCAL STORE
    // =============================================================================

    #[test]
    fn test_guarded_entry_denies_restricted_caller() {
        let host = host();
        let domain = host.create("guarded", LoadContext::new(), None).unwrap();
        domain
            .set_data(
                "secret",
                "token",
                Some(AccessGuard::Demand(Permission::Reflection)),
            )
            .unwrap();

        let err = domain
            .get_data("secret", &GrantSet::of([Permission::Execution]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);

        let value = domain
            .get_data("secret", &GrantSet::of([Permission::Reflection]))
            .unwrap();
        assert_eq!(value, Some(StoreValue::Text("token".into())));
    }

    #[test]
    fn test_store_entries_are_per_domain() {
        let host = host();
        let a = host.create("a", LoadContext::new(), None).unwrap();
        let b = host.create("b", LoadContext::new(), None).unwrap();

        a.set_data("counter", 1i64, None).unwrap();
        assert_eq!(a.get_own_data("counter").unwrap(), Some(StoreValue::Integer(1)));
        assert_eq!(b.get_own_data("counter").unwrap(), None);
    }

    // =============================================================================
    // UNLOAD
    // =============================================================================

    #[test]
    fn test_unload_drains_in_flight_work() {
        let host = host();
        let unloads = record(&host, EventTopic::DomainUnload);
        let domain = host.create("busy", LoadContext::new(), None).unwrap();
        let finished = Arc::new(AtomicBool::new(false));
        let (started_tx, started_rx) = mpsc::channel();

        let worker = {
            let domain = domain.clone();
            let finished = Arc::clone(&finished);
            std::thread::spawn(move || {
                domain
                    .execute(move |_| {
                        started_tx.send(()).unwrap();
                        std::thread::sleep(Duration::from_millis(50));
                        finished.store(true, Ordering::SeqCst);
                    })
                    .unwrap();
            })
        };

        started_rx.recv().unwrap();
        host.unload(&domain).unwrap();
        assert!(finished.load(Ordering::SeqCst));
        worker.join().unwrap();

        assert!(!domain.is_valid());
        assert_eq!(domain.get_own_data("ApplicationBase").unwrap_err().kind(), ErrorKind::InvalidHandle);
        let unloads = unloads.lock();
        assert_eq!(unloads.len(), 1);
        assert!(matches!(
            &unloads[0],
            DomainEvent::DomainUnload { friendly_name, .. } if friendly_name == "busy"
        ));
    }

    #[test]
    fn test_unload_waits_for_blocked_resolve() {
        let host = host();
        let domain = host.create("resolving", LoadContext::new(), None).unwrap();
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let entered_tx = Mutex::new(entered_tx);
        let release_rx = Mutex::new(release_rx);

        domain
            .register_listener(ResolveKind::Module, move |_: &ResolveRequest| -> ListenerResult {
                let _ = entered_tx.lock().send(());
                let _ = release_rx.lock().recv();
                Ok(Some(Component::named("Lib")))
            })
            .unwrap();

        let resolver = {
            let domain = domain.clone();
            std::thread::spawn(move || domain.resolve(ResolveKind::Module, "Lib", None))
        };
        entered_rx.recv_timeout(Duration::from_secs(2)).unwrap();

        let unloaded = Arc::new(AtomicBool::new(false));
        let unloader = {
            let host = Arc::clone(&host);
            let domain = domain.clone();
            let unloaded = Arc::clone(&unloaded);
            std::thread::spawn(move || {
                let outcome = host.unload(&domain);
                unloaded.store(true, Ordering::SeqCst);
                outcome
            })
        };

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while domain.state() != DomainState::Unloading && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(domain.state(), DomainState::Unloading);
        std::thread::sleep(Duration::from_millis(50));
        assert!(!unloaded.load(Ordering::SeqCst));

        release_tx.send(()).unwrap();
        assert!(resolver.join().unwrap().unwrap().is_resolved());
        unloader.join().unwrap().unwrap();

        assert_eq!(
            domain.resolve(ResolveKind::Module, "Lib", None).unwrap_err().kind(),
            ErrorKind::InvalidHandle
        );
    }

    #[test]
    fn test_default_domain_survives_shutdown() {
        let host = host();
        let exits = record(&host, EventTopic::ProcessExit);
        host.create("a", LoadContext::new(), None).unwrap();
        host.create("b", LoadContext::new(), None).unwrap();

        assert_eq!(host.shutdown(), 2);
        assert!(host.default_domain().is_valid());
        assert_eq!(
            host.unload(&host.default_domain()).unwrap_err().kind(),
            ErrorKind::CannotUnload
        );
        assert!(matches!(
            exits.lock().as_slice(),
            [DomainEvent::ProcessExit { active_domains: 3 }]
        ));
    }
}
