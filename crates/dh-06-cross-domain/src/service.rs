//! # Cross-Domain Invoker
//!
//! ```text
//! caller (source)                         target domain context
//! ───────────────                         ─────────────────────
//! encode callback (binary)
//! seal request envelope ──────────────→  verify envelope
//!                                         decode callback
//!                                         run (errors + panics captured)
//!                                         marshal output
//! verify reply envelope  ←──────────────  seal reply envelope
//! decode output / raise PropagatedError
//! ```
//!
//! The target's in-flight slot is held for the whole call, so unloading the
//! target waits for pending invocations.

use crate::domain::{
    from_binary, to_binary, CrossDomainCallback, InvokeError, Marshal, RemoteError, ReplyBody,
};
use crate::ports::CrossDomainApi;
use dh_03_resolution::panic_message;
use dh_05_lifecycle::{DomainHandle, DomainLifecycleManager};
use domain_telemetry::{HistogramTimer, CROSS_DOMAIN_CALLS, CROSS_DOMAIN_DURATION};
use shared_types::{CrossDomainEnvelope, DomainId, PayloadEncoding};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Runs serializable callbacks inside other domains.
pub struct CrossDomainInvoker {
    lifecycle: Arc<DomainLifecycleManager>,
}

impl CrossDomainInvoker {
    /// Invoker over the domains of `lifecycle`.
    pub fn new(lifecycle: Arc<DomainLifecycleManager>) -> Self {
        Self { lifecycle }
    }

    /// The lifecycle manager used for id lookups.
    pub fn lifecycle(&self) -> &Arc<DomainLifecycleManager> {
        &self.lifecycle
    }

    /// Run `callback` inside `target` and return its copied result.
    #[instrument(skip_all, fields(source = %source.id(), target = %target.id()))]
    pub fn invoke<C: CrossDomainCallback>(
        &self,
        source: &DomainHandle,
        target: &DomainHandle,
        callback: C,
    ) -> Result<C::Output, InvokeError> {
        let _timer = HistogramTimer::new(&CROSS_DOMAIN_DURATION);
        let result = self.round_trip(source, target, callback);

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.outcome_label(),
        };
        CROSS_DOMAIN_CALLS.with_label_values(&[outcome]).inc();
        if let Err(e) = &result {
            warn!(error = %e, "[dh-06] Cross-domain call failed");
        }
        result
    }

    /// Run `callback` inside the domain with id `target`.
    pub fn invoke_by_id<C: CrossDomainCallback>(
        &self,
        source: DomainId,
        target: DomainId,
        callback: C,
    ) -> Result<C::Output, InvokeError> {
        let lookup = |id: DomainId| {
            self.lifecycle
                .get(id)
                .ok_or(InvokeError::InvalidHandle { domain: id })
        };
        let (source, target) = match (lookup(source), lookup(target)) {
            (Ok(source), Ok(target)) => (source, target),
            (Err(e), _) | (_, Err(e)) => {
                CROSS_DOMAIN_CALLS.with_label_values(&[e.outcome_label()]).inc();
                return Err(e);
            }
        };
        self.invoke(&source, &target, callback)
    }

    fn round_trip<C: CrossDomainCallback>(
        &self,
        source: &DomainHandle,
        target: &DomainHandle,
        callback: C,
    ) -> Result<C::Output, InvokeError> {
        if !source.is_valid() {
            return Err(InvokeError::InvalidHandle { domain: source.id() });
        }

        let request = CrossDomainEnvelope::seal(
            source.id(),
            target.id(),
            PayloadEncoding::Binary,
            to_binary(&callback)?,
        );
        let correlation_id = request.correlation_id;
        debug!(%correlation_id, bytes = request.payload.len(), "[dh-06] Request sealed");

        let reply = target.execute(move |handle| dispatch::<C>(&request, handle))?;
        reply.verify(source.id())?;
        debug!(%correlation_id, encoding = ?reply.encoding, "[dh-06] Reply received");

        match from_binary::<ReplyBody>(&reply.payload)? {
            ReplyBody::Returned(bytes) => Ok(<C::Output as Marshal>::unmarshal(&bytes)?),
            ReplyBody::Failed(error) => Err(InvokeError::Propagated {
                domain: target.id(),
                error,
            }),
        }
    }
}

/// Target side: decode, run and answer. Never fails; failures travel in the reply.
fn dispatch<C: CrossDomainCallback>(
    request: &CrossDomainEnvelope,
    handle: &DomainHandle,
) -> CrossDomainEnvelope {
    let (encoding, body) = match run::<C>(request, handle) {
        Ok(bytes) => (<C::Output as Marshal>::ENCODING, ReplyBody::Returned(bytes)),
        Err(error) => {
            handle.report_first_chance(&error.category, &error.message);
            (PayloadEncoding::Binary, ReplyBody::Failed(error))
        }
    };

    let payload = match to_binary(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "[dh-06] Reply could not be encoded");
            Vec::new()
        }
    };
    CrossDomainEnvelope::reply_to(request, encoding, payload)
}

fn run<C: CrossDomainCallback>(
    request: &CrossDomainEnvelope,
    handle: &DomainHandle,
) -> Result<Vec<u8>, RemoteError> {
    let marshal_error = |message: String| RemoteError {
        category: "Marshal".to_string(),
        message,
        stack: String::new(),
    };

    request
        .verify(handle.id())
        .map_err(|e| marshal_error(e.to_string()))?;
    let callback: C = from_binary(&request.payload).map_err(|e| marshal_error(e.to_string()))?;

    let output = match catch_unwind(AssertUnwindSafe(|| callback.call(handle))) {
        Ok(Ok(output)) => output,
        Ok(Err(error)) => return Err(RemoteError::from_error(&error)),
        Err(payload) => return Err(RemoteError::from_panic(panic_message(payload.as_ref()))),
    };
    Marshal::marshal(&output).map_err(|e| marshal_error(e.to_string()))
}

impl CrossDomainApi for CrossDomainInvoker {
    fn invoke<C: CrossDomainCallback>(
        &self,
        source: &DomainHandle,
        target: &DomainHandle,
        callback: C,
    ) -> Result<C::Output, InvokeError> {
        CrossDomainInvoker::invoke(self, source, target, callback)
    }

    fn invoke_by_id<C: CrossDomainCallback>(
        &self,
        source: DomainId,
        target: DomainId,
        callback: C,
    ) -> Result<C::Output, InvokeError> {
        CrossDomainInvoker::invoke_by_id(self, source, target, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Binary;
    use dh_01_load_context::LoadContext;
    use dh_02_trust::{GrantSet, Permission};
    use dh_05_lifecycle::{current_domain, CreateDomainRequest, DomainState};
    use parking_lot::Mutex;
    use serde::{Deserialize, Serialize};
    use shared_bus::{DomainEvent, EventFilter, EventTopic};
    use shared_types::ErrorKind;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    static SLEEP_STARTED: AtomicBool = AtomicBool::new(false);

    fn lifecycle() -> Arc<DomainLifecycleManager> {
        Arc::new(
            DomainLifecycleManager::new(LoadContext::builder().application_base("/srv/host").build())
                .unwrap(),
        )
    }

    #[derive(Serialize, Deserialize)]
    struct Describe {
        prefix: String,
    }

    impl CrossDomainCallback for Describe {
        type Output = String;

        fn call(self, domain: &DomainHandle) -> anyhow::Result<String> {
            Ok(format!(
                "{} {} on {:?}",
                self.prefix,
                domain.friendly_name(),
                current_domain()
            ))
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

    #[derive(Serialize, Deserialize)]
    struct Fail {
        panic: bool,
    }

    impl CrossDomainCallback for Fail {
        type Output = ();

        fn call(self, _domain: &DomainHandle) -> anyhow::Result<()> {
            if self.panic {
                panic!("callback exploded");
            }
            Err(anyhow::anyhow!("plugin index corrupt").context("scanning plugins"))
        }
    }

    #[derive(Serialize, Deserialize)]
    struct Sleep {
        millis: u64,
    }

    impl CrossDomainCallback for Sleep {
        type Output = Binary<Vec<u64>>;

        fn call(self, _domain: &DomainHandle) -> anyhow::Result<Binary<Vec<u64>>> {
            SLEEP_STARTED.store(true, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(self.millis));
            Ok(Binary(vec![self.millis]))
        }
    }

    #[test]
    fn test_result_copied_back() {
        let lifecycle = lifecycle();
        let invoker = CrossDomainInvoker::new(Arc::clone(&lifecycle));
        let target = lifecycle.create("plugins", LoadContext::new(), None).unwrap();

        let text = invoker
            .invoke(&lifecycle.default_domain(), &target, Describe { prefix: "hello".into() })
            .unwrap();
        assert_eq!(text, format!("hello plugins on {:?}", Some(target.id())));
    }

    #[test]
    fn test_security_object_returned() {
        let lifecycle = lifecycle();
        let invoker = CrossDomainInvoker::new(Arc::clone(&lifecycle));
        let target = lifecycle
            .create_domain(
                CreateDomainRequest::new("sandbox", LoadContext::new())
                    .homogeneous(GrantSet::of([Permission::Execution]), Vec::new()),
            )
            .unwrap();

        let grant = invoker.invoke(&lifecycle.default_domain(), &target, ReadGrant).unwrap();
        assert_eq!(grant, GrantSet::of([Permission::Execution]));
    }

    #[test]
    fn test_callback_error_propagated() {
        let lifecycle = lifecycle();
        let invoker = CrossDomainInvoker::new(Arc::clone(&lifecycle));
        let target = lifecycle.create("plugins", LoadContext::new(), None).unwrap();

        let err = invoker
            .invoke(&lifecycle.default_domain(), &target, Fail { panic: false })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PropagatedError);
        let remote = err.remote().unwrap();
        assert_eq!(remote.category, "CallbackError");
        assert_eq!(remote.message, "scanning plugins");
        assert!(remote.stack.contains("plugin index corrupt"));
    }

    #[test]
    fn test_callback_panic_propagated_and_reported() {
        let lifecycle = lifecycle();
        let invoker = CrossDomainInvoker::new(Arc::clone(&lifecycle));
        let target = lifecycle.create("plugins", LoadContext::new(), None).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        lifecycle.bus().on(
            EventFilter::topics(vec![EventTopic::FirstChanceError]).for_domain(target.id()),
            move |event| {
                sink.lock().push(event.clone());
                Ok(())
            },
        );

        let err = invoker
            .invoke(&lifecycle.default_domain(), &target, Fail { panic: true })
            .unwrap_err();
        let remote = err.remote().unwrap();
        assert_eq!(remote.category, "Panic");
        assert_eq!(remote.message, "callback exploded");
        assert_eq!(
            *seen.lock(),
            vec![DomainEvent::FirstChanceError {
                domain_id: target.id(),
                category: "Panic".into(),
                message: "callback exploded".into(),
            }]
        );

        // The target is still usable.
        assert_eq!(target.state(), DomainState::Active);
        assert!(invoker
            .invoke(&lifecycle.default_domain(), &target, Describe { prefix: "again".into() })
            .is_ok());
    }

    #[test]
    fn test_unloaded_target_is_invalid_handle() {
        let lifecycle = lifecycle();
        let invoker = CrossDomainInvoker::new(Arc::clone(&lifecycle));
        let target = lifecycle.create("plugins", LoadContext::new(), None).unwrap();
        lifecycle.unload(&target).unwrap();

        let err = invoker
            .invoke(&lifecycle.default_domain(), &target, Describe { prefix: "x".into() })
            .unwrap_err();
        assert_eq!(err, InvokeError::InvalidHandle { domain: target.id() });

        let err = invoker
            .invoke_by_id(DomainId::DEFAULT, target.id(), Describe { prefix: "x".into() })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHandle);
    }

    #[test]
    fn test_invoke_between_non_default_domains() {
        let lifecycle = lifecycle();
        let invoker = CrossDomainInvoker::new(Arc::clone(&lifecycle));
        let a = lifecycle.create("a", LoadContext::new(), None).unwrap();
        let b = lifecycle.create("b", LoadContext::new(), None).unwrap();

        let text = invoker
            .invoke_by_id(a.id(), b.id(), Describe { prefix: "from a:".into() })
            .unwrap();
        assert!(text.starts_with("from a: b"));
    }

    #[test]
    fn test_unload_waits_for_pending_invocation() {
        let lifecycle = lifecycle();
        let invoker = Arc::new(CrossDomainInvoker::new(Arc::clone(&lifecycle)));
        let target = lifecycle.create("slow", LoadContext::new(), None).unwrap();

        let caller = {
            let invoker = Arc::clone(&invoker);
            let source = lifecycle.default_domain();
            let target = target.clone();
            std::thread::spawn(move || invoker.invoke(&source, &target, Sleep { millis: 150 }))
        };

        while !SLEEP_STARTED.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(1));
        }
        lifecycle.unload(&target).unwrap();

        let result = caller.join().unwrap();
        assert_eq!(result.map(Binary::into_inner), Ok(vec![150]));
        assert_eq!(target.state(), DomainState::Unloaded);
    }
}
