//! # Cross-Domain Integration
//!
//! Callbacks that touch per-domain state on the far side of the boundary:
//! local store writes, grant reads and failures copied back to the caller.

#[cfg(test)]
mod tests {
    use crate::fixtures::{host, record};
    use dh_01_load_context::LoadContext;
    use dh_02_trust::{GrantSet, Permission, SecurityZone, TrustEvidence};
    use dh_04_local_store::StoreValue;
    use dh_05_lifecycle::{CreateDomainRequest, DomainHandle};
    use dh_06_cross_domain::{CrossDomainApi, CrossDomainCallback, CrossDomainInvoker, InvokeError};
    use serde::{Deserialize, Serialize};
    use shared_bus::{DomainEvent, EventTopic};
    use shared_types::{DomainId, ErrorKind};
    use std::sync::Arc;

    /// Store `value` under `key` in the target domain.
    #[derive(Serialize, Deserialize)]
    struct Remember {
        key: String,
        value: String,
    }

    impl CrossDomainCallback for Remember {
        type Output = Vec<String>;

        fn call(self, domain: &DomainHandle) -> anyhow::Result<Vec<String>> {
            domain.set_data(&self.key, self.value, None)?;
            Ok(domain.data_keys()?)
        }
    }

    /// Read a text entry from the target domain.
    #[derive(Serialize, Deserialize)]
    struct Recall {
        key: String,
    }

    impl CrossDomainCallback for Recall {
        type Output = Option<String>;

        fn call(self, domain: &DomainHandle) -> anyhow::Result<Option<String>> {
            match domain.get_own_data(&self.key)? {
                Some(StoreValue::Text(text)) => Ok(Some(text)),
                Some(other) => anyhow::bail!("'{}' holds a {:?}", self.key, other),
                None => Ok(None),
            }
        }
    }

    #[derive(Serialize, Deserialize)]
    struct ReadGrant;

    impl CrossDomainCallback for ReadGrant {
        type Output = GrantSet;

        fn call(self, domain: &DomainHandle) -> anyhow::Result<GrantSet> {
            Ok(domain.grant()?)
        }
    }

    fn invoker() -> (CrossDomainInvoker, DomainHandle, DomainHandle) {
        let host = host();
        let a = host.create("a", LoadContext::new(), None).unwrap();
        let b = host.create("b", LoadContext::new(), None).unwrap();
        (CrossDomainInvoker::new(host), a, b)
    }

    // =============================================================================
    // STATE ON THE FAR SIDE
    // =============================================================================

    #[test]
    fn test_callback_writes_target_store_only() {
        let (invoker, a, b) = invoker();

        let keys = invoker
            .invoke(
                &a,
                &b,
                Remember {
                    key: "greeting".into(),
                    value: "hello".into(),
                },
            )
            .unwrap();
        assert_eq!(keys, vec!["greeting".to_string()]);

        assert_eq!(
            b.get_own_data("greeting").unwrap(),
            Some(StoreValue::Text("hello".into()))
        );
        assert_eq!(a.get_own_data("greeting").unwrap(), None);

        let recalled = invoker
            .invoke(&a, &b, Recall { key: "greeting".into() })
            .unwrap();
        assert_eq!(recalled.as_deref(), Some("hello"));
    }

    #[test]
    fn test_restricted_grant_copied_back() {
        let host = host();
        let grant = GrantSet::of([Permission::Execution]);
        let sandbox = host
            .create_domain(
                CreateDomainRequest::new("sandbox", LoadContext::new())
                    .evidence(TrustEvidence::for_zone(SecurityZone::Internet))
                    .homogeneous(grant.clone(), Vec::new()),
            )
            .unwrap();
        let invoker = CrossDomainInvoker::new(Arc::clone(&host));

        let copied = invoker.invoke(&host.default_domain(), &sandbox, ReadGrant).unwrap();
        assert_eq!(copied, grant);
    }

    // =============================================================================
    // FAILURES
    // =============================================================================

    #[test]
    fn test_callback_error_arrives_as_remote_error() {
        let host = host();
        let faults = record(&host, EventTopic::FirstChanceError);
        let target = host.create("target", LoadContext::new(), None).unwrap();
        target.set_data("count", 3i64, None).unwrap();
        let invoker = CrossDomainInvoker::new(Arc::clone(&host));

        let err = invoker
            .invoke(&host.default_domain(), &target, Recall { key: "count".into() })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PropagatedError);
        let remote = err.remote().unwrap();
        assert_eq!(remote.category, "CallbackError");
        assert!(remote.message.contains("count"));

        assert!(faults.lock().iter().any(|event| matches!(
            event,
            DomainEvent::FirstChanceError { domain_id, .. } if *domain_id == target.id()
        )));
    }

    #[test]
    fn test_unknown_domain_id_is_invalid_handle() {
        let (invoker, a, _b) = invoker();

        let err = invoker
            .invoke_by_id(a.id(), DomainId(999), ReadGrant)
            .unwrap_err();
        assert!(matches!(err, InvokeError::InvalidHandle { domain } if domain == DomainId(999)));
    }

    #[test]
    fn test_unloaded_source_is_refused() {
        let (invoker, a, b) = invoker();
        invoker.lifecycle().unload(&a).unwrap();

        let err = invoker.invoke(&a, &b, ReadGrant).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHandle);
        // The target is unaffected.
        assert!(CrossDomainApi::invoke_by_id(&invoker, b.id(), b.id(), ReadGrant).is_ok());
    }
}
