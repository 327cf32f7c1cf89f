//! Prometheus metrics for Domain Host subsystems.
//!
//! All metrics follow the naming convention: `dh_<subsystem>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., domains_created_total)
//! - **Gauge**: Value that can go up or down (e.g., domains_active)
//! - **Histogram**: Distribution of values (e.g., unload_drain_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // LIFECYCLE METRICS (Subsystem 5)
    // =========================================================================

    /// Domains that reached `Active`
    pub static ref DOMAINS_CREATED: Counter = Counter::new(
        "dh_lifecycle_domains_created_total",
        "Total number of domains that became active"
    ).expect("metric creation failed");

    /// Domains that reached `Unloaded`
    pub static ref DOMAINS_UNLOADED: Counter = Counter::new(
        "dh_lifecycle_domains_unloaded_total",
        "Total number of domains unloaded"
    ).expect("metric creation failed");

    /// Domains currently registered (default domain included)
    pub static ref DOMAINS_ACTIVE: Gauge = Gauge::new(
        "dh_lifecycle_domains_active",
        "Number of domains currently registered"
    ).expect("metric creation failed");

    /// Failed creations by reason
    pub static ref DOMAIN_CREATE_FAILURES: CounterVec = CounterVec::new(
        Opts::new("dh_lifecycle_create_failures_total", "Domain creations that failed"),
        &["reason"]  // invalid_argument, access_denied, sandbox, initialization
    ).expect("metric creation failed");

    /// Time spent waiting for in-flight work during unload
    pub static ref UNLOAD_DRAIN_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "dh_lifecycle_unload_drain_duration_seconds",
            "Time spent draining in-flight work before unload"
        ).buckets(exponential_buckets(0.0001, 4.0, 10).expect("bucket layout"))
    ).expect("metric creation failed");

    // =========================================================================
    // RESOLUTION METRICS (Subsystem 3)
    // =========================================================================

    /// Resolve requests by kind and outcome
    pub static ref RESOLVE_REQUESTS: CounterVec = CounterVec::new(
        Opts::new("dh_resolution_requests_total", "Resolve requests"),
        &["kind", "outcome"]  // kind: module/type/resource, outcome: resolved/not_found
    ).expect("metric creation failed");

    /// Listener errors and panics swallowed by the pipeline
    pub static ref LISTENER_FAULTS: CounterVec = CounterVec::new(
        Opts::new("dh_resolution_listener_faults_total", "Listener faults swallowed"),
        &["kind"]
    ).expect("metric creation failed");

    // =========================================================================
    // LOCAL STORE METRICS (Subsystem 4)
    // =========================================================================

    /// Guarded reads rejected
    pub static ref STORE_ACCESS_DENIED: Counter = Counter::new(
        "dh_store_access_denied_total",
        "Local store reads rejected by an access guard"
    ).expect("metric creation failed");

    // =========================================================================
    // CROSS-DOMAIN METRICS (Subsystem 6)
    // =========================================================================

    /// Cross-domain invocations by outcome
    pub static ref CROSS_DOMAIN_CALLS: CounterVec = CounterVec::new(
        Opts::new("dh_cross_domain_calls_total", "Cross-domain invocations"),
        &["outcome"]  // ok, invalid_handle, propagated, marshal
    ).expect("metric creation failed");

    /// Cross-domain round trip latency
    pub static ref CROSS_DOMAIN_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "dh_cross_domain_call_duration_seconds",
            "Round trip time of a cross-domain invocation"
        ).buckets(exponential_buckets(0.00005, 2.0, 16).expect("bucket layout"))
    ).expect("metric creation failed");
}

/// Metrics handle for lifecycle management.
#[derive(Debug, Clone)]
pub struct MetricsHandle {
    registered: usize,
}

impl MetricsHandle {
    /// Number of collectors newly registered by this call.
    pub fn registered(&self) -> usize {
        self.registered
    }
}

/// Register all metrics with the global registry.
///
/// Collectors that are already registered are skipped, so calling this more
/// than once is harmless.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Lifecycle
        Box::new(DOMAINS_CREATED.clone()),
        Box::new(DOMAINS_UNLOADED.clone()),
        Box::new(DOMAINS_ACTIVE.clone()),
        Box::new(DOMAIN_CREATE_FAILURES.clone()),
        Box::new(UNLOAD_DRAIN_DURATION.clone()),
        // Resolution
        Box::new(RESOLVE_REQUESTS.clone()),
        Box::new(LISTENER_FAULTS.clone()),
        // Store
        Box::new(STORE_ACCESS_DENIED.clone()),
        // Cross-domain
        Box::new(CROSS_DOMAIN_CALLS.clone()),
        Box::new(CROSS_DOMAIN_DURATION.clone()),
    ];

    let mut registered = 0;
    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) => registered += 1,
            Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { registered })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::HistogramTimer::new(&$histogram)
    };
}
