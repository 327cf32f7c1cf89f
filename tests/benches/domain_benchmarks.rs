//! # Domain Host Benchmarks
//!
//! | Area | Operation | Expectation |
//! |------|-----------|-------------|
//! | dh-01 Load Context | finalize + probe plan | microseconds |
//! | dh-03 Resolution | pipeline walk | linear in listener count |
//! | dh-04 Local Store | guarded read | constant |
//! | dh-06 Cross-Domain | invoke round trip | dominated by the context hop |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dh_01_load_context::LoadContext;
use dh_02_trust::{GrantSet, Permission};
use dh_03_resolution::{ListenerResult, ResolveRequest};
use dh_04_local_store::AccessGuard;
use dh_05_lifecycle::DomainHandle;
use dh_06_cross_domain::{CrossDomainCallback, CrossDomainInvoker};
use dh_tests::fixtures::host;
use serde::{Deserialize, Serialize};
use shared_types::{Component, ResolveKind};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// DH-01: Load Context
// ============================================================================

fn bench_load_context_finalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("dh-01-load-context");

    group.bench_function("finalize", |b| {
        b.iter(|| {
            let context = LoadContext::builder()
                .application_base("/srv/app")
                .private_search_paths(["bin", "lib", "plugins"])
                .build();
            black_box(context.finalize().is_ok())
        })
    });

    let snapshot = LoadContext::builder()
        .application_base("/srv/app")
        .private_search_paths(["bin", "lib", "plugins"])
        .build()
        .finalize()
        .ok();
    group.bench_function("candidate_files", |b| {
        b.iter(|| black_box(snapshot.as_ref().map(|s| s.candidate_files("Plugin.Core").len())))
    });

    group.finish();
}

// ============================================================================
// DH-03: Resolution Pipeline
// ============================================================================

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("dh-03-resolution");

    for listeners in [1usize, 8, 32] {
        let host = host();
        let domain = host
            .create("bench", LoadContext::new(), None)
            .unwrap_or_else(|e| panic!("domain creation failed: {e}"));
        for _ in 1..listeners {
            let _ = domain.register_listener(ResolveKind::Module, |_: &ResolveRequest| -> ListenerResult {
                Ok(None)
            });
        }
        let _ = domain.register_listener(ResolveKind::Module, |_: &ResolveRequest| -> ListenerResult {
            Ok(Some(Component::named("Target")))
        });

        group.throughput(Throughput::Elements(listeners as u64));
        group.bench_with_input(BenchmarkId::new("resolve_last", listeners), &domain, |b, domain| {
            b.iter(|| black_box(domain.resolve(ResolveKind::Module, "Target", None).is_ok()))
        });
    }

    group.finish();
}

// ============================================================================
// DH-04: Local Store
// ============================================================================

fn bench_local_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("dh-04-local-store");

    let host = host();
    let domain = host
        .create("store", LoadContext::new(), None)
        .unwrap_or_else(|e| panic!("domain creation failed: {e}"));
    let _ = domain.set_data("plain", "value", None);
    let _ = domain.set_data("guarded", "value", Some(AccessGuard::Demand(Permission::Reflection)));
    let caller = GrantSet::of([Permission::Reflection]);

    group.bench_function("get_plain", |b| {
        b.iter(|| black_box(domain.get_data("plain", &caller).is_ok()))
    });
    group.bench_function("get_guarded", |b| {
        b.iter(|| black_box(domain.get_data("guarded", &caller).is_ok()))
    });
    group.bench_function("get_well_known", |b| {
        b.iter(|| black_box(domain.get_data("ApplicationBase", &caller).is_ok()))
    });

    group.finish();
}

// ============================================================================
// DH-06: Cross-Domain Invocation
// ============================================================================

#[derive(Serialize, Deserialize)]
struct Echo(Vec<u8>);

impl CrossDomainCallback for Echo {
    type Output = Vec<u8>;

    fn call(self, _domain: &DomainHandle) -> anyhow::Result<Vec<u8>> {
        Ok(self.0)
    }
}

fn bench_cross_domain(c: &mut Criterion) {
    let mut group = c.benchmark_group("dh-06-cross-domain");
    group.measurement_time(Duration::from_secs(10));

    let host = host();
    let target = host
        .create("target", LoadContext::new(), None)
        .unwrap_or_else(|e| panic!("domain creation failed: {e}"));
    let source = host.default_domain();
    let invoker = CrossDomainInvoker::new(Arc::clone(&host));

    for size in [16usize, 1024, 64 * 1024] {
        let payload = vec![0xA5u8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("invoke_echo", size), &payload, |b, payload| {
            b.iter(|| black_box(invoker.invoke(&source, &target, Echo(payload.clone())).is_ok()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_load_context_finalize,
    bench_resolution,
    bench_local_store,
    bench_cross_domain,
);

criterion_main!(benches);
