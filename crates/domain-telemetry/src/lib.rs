//! # Domain Telemetry
//!
//! Logging and metrics for a Domain Host process.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` with an `EnvFilter` and a fmt or JSON layer
//! - **Metrics**: Prometheus counters, gauges and histograms per subsystem
//!
//! ## Usage
//!
//! ```rust,ignore
//! use domain_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // host runs here
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DH_SERVICE_NAME` | `domain-host` | Service name in logs |
//! | `DH_HOST_ID` | `0` | Host instance identifier |
//! | `DH_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also accepted) |
//! | `DH_JSON_LOGS` | `false` | JSON log lines |
//! | `DH_METRICS_ENABLED` | `true` | Register Prometheus collectors |

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::{init_logging, LoggingHandle};
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, MetricsHandle, CROSS_DOMAIN_CALLS,
    CROSS_DOMAIN_DURATION, DOMAINS_ACTIVE, DOMAINS_CREATED, DOMAINS_UNLOADED,
    DOMAIN_CREATE_FAILURES, LISTENER_FAULTS, REGISTRY, RESOLVE_REQUESTS, STORE_ACCESS_DENIED,
    UNLOAD_DRAIN_DURATION,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// A collector could not be created or registered.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// The configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and, if enabled, metrics.
///
/// Returns a guard that should be held for the lifetime of the host.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = if config.metrics_enabled {
        Some(register_metrics()?)
    } else {
        None
    };

    let logging = init_logging(&config)?;

    Ok(TelemetryGuard {
        _logging: logging,
        metrics,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _logging: LoggingHandle,
    metrics: Option<MetricsHandle>,
}

impl TelemetryGuard {
    /// Whether Prometheus collectors were registered.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics.is_some()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("[telemetry] Shutting down telemetry");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
