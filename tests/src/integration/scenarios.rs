//! # End-to-End Scenarios
//!
//! 1. **Application base round trip**: a domain created with a base reports
//!    the same base through its local store.
//! 2. **Full-trust allow-list**: a homogeneous domain grants `Unrestricted`
//!    to an allow-listed component and its fixed grant to everything else.
//! 3. **Listener chain**: of two module listeners, the first declines and the
//!    second answers.

#[cfg(test)]
mod tests {
    use crate::fixtures::{host, logging_listener};
    use dh_01_load_context::LoadContext;
    use dh_02_trust::{EvidenceItem, GrantSet, Permission, SecurityZone, TrustEvidence};
    use dh_04_local_store::StoreValue;
    use dh_05_lifecycle::CreateDomainRequest;
    use parking_lot::Mutex;
    use shared_types::{Component, ComponentIdentity, PublicKeyToken, ResolveKind, Version};
    use std::path::PathBuf;
    use std::sync::Arc;

    // =============================================================================
    // SCENARIO A: APPLICATION BASE
    // =============================================================================

    #[test]
    fn test_application_base_round_trip() {
        let host = host();
        let domain = host
            .create(
                "plugins",
                LoadContext::builder()
                    .application_base("/srv/plugins")
                    .application_name("Plugins")
                    .build(),
                None,
            )
            .unwrap();

        assert_eq!(
            domain.get_own_data("ApplicationBase").unwrap(),
            Some(StoreValue::Path(PathBuf::from("/srv/plugins")))
        );
        assert_eq!(
            domain.get_own_data("ApplicationName").unwrap(),
            Some(StoreValue::Text("Plugins".into()))
        );
        assert_eq!(
            domain.summary().application_base,
            Some(PathBuf::from("/srv/plugins"))
        );
    }

    // =============================================================================
    // SCENARIO B: FULL-TRUST ALLOW-LIST
    // =============================================================================

    #[test]
    fn test_allow_listed_component_is_unrestricted() {
        let host = host();
        let key = PublicKeyToken::new(vec![0xb7, 0x7a, 0x5c, 0x56]);
        let trusted = ComponentIdentity::strong("Host.Contracts", key, Version::new(2, 0, 0, 0));
        let grant = GrantSet::of([Permission::Execution]);

        let sandbox = host
            .create_domain(
                CreateDomainRequest::new("sandbox", LoadContext::new())
                    .evidence(TrustEvidence::for_zone(SecurityZone::Internet))
                    .homogeneous(grant.clone(), vec![trusted.clone()]),
            )
            .unwrap();
        let trust = sandbox.trust().unwrap();

        let evidence = TrustEvidence::for_zone(SecurityZone::Internet)
            .with(EvidenceItem::StrongName(trusted.clone()));
        assert_eq!(trust.grant_for_component(&trusted, &evidence), GrantSet::Unrestricted);

        let untrusted = ComponentIdentity::new("ThirdParty");
        assert_eq!(
            trust.grant_for_component(&untrusted, &TrustEvidence::for_zone(SecurityZone::Internet)),
            grant
        );
        assert_eq!(sandbox.grant().unwrap(), grant);
    }

    // =============================================================================
    // SCENARIO C: LISTENER CHAIN
    // =============================================================================

    #[test]
    fn test_second_listener_answers() {
        let host = host();
        let domain = host.create("plugins", LoadContext::new(), None).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        domain
            .register_listener(ResolveKind::Module, logging_listener("first", Arc::clone(&log), None))
            .unwrap();
        domain
            .register_listener(
                ResolveKind::Module,
                logging_listener(
                    "second",
                    Arc::clone(&log),
                    Some(Component::named("Plugin.Core").at("/srv/host/bin/Plugin.Core.dll")),
                ),
            )
            .unwrap();

        let resolution = domain.resolve(ResolveKind::Module, "Plugin.Core", None).unwrap();
        let component = resolution.into_component().unwrap();
        assert_eq!(component.identity.name, "Plugin.Core");
        assert_eq!(*log.lock(), vec!["first", "second"]);
    }
}
