//! Structured logging setup.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either a
//! JSON layer (containers, log shipping) or a human-readable fmt layer.
//! Every log line emitted through [`log_domain_event!`](crate::log_domain_event)
//! carries a `domain_id` field so one domain's history can be filtered out of
//! a shared host log.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Handle returned once logging is installed.
#[derive(Debug)]
pub struct LoggingHandle {
    json: bool,
}

impl LoggingHandle {
    /// Whether logs are emitted as JSON.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Build the filter from `RUST_LOG`, falling back to the configured level.
pub(crate) fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::Config(e.to_string()))
}

/// Install the global subscriber.
///
/// Fails with [`TelemetryError::LoggingInit`] if a global subscriber is
/// already set (for instance by a test harness).
pub fn init_logging(config: &TelemetryConfig) -> Result<LoggingHandle, TelemetryError> {
    let filter = build_filter(config)?;

    if !config.console_output {
        tracing_subscriber::registry()
            .with(filter)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
        return Ok(LoggingHandle {
            json: config.json_logs,
        });
    }

    if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    tracing::info!(
        service = %config.full_service_name(),
        json_logs = config.json_logs,
        "[telemetry] Logging initialized"
    );

    Ok(LoggingHandle {
        json: config.json_logs,
    })
}

/// Emit a log line attributed to a subsystem and a domain.
///
/// ```rust,ignore
/// log_domain_event!(info, "dh-05", domain_id, "Domain activated", friendly_name = %name);
/// ```
#[macro_export]
macro_rules! log_domain_event {
    (info, $subsystem:expr, $domain:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            subsystem = $subsystem,
            domain_id = %$domain,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $subsystem:expr, $domain:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            subsystem = $subsystem,
            domain_id = %$domain,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $subsystem:expr, $domain:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            subsystem = $subsystem,
            domain_id = %$domain,
            $($($field)*,)?
            $msg
        )
    };

    (error, $subsystem:expr, $domain:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            subsystem = $subsystem,
            domain_id = %$domain,
            $($($field)*,)?
            $msg
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_level() {
        let config = TelemetryConfig {
            log_level: "debug,dh_03_resolution=trace".to_string(),
            ..TelemetryConfig::default()
        };
        assert!(build_filter(&config).is_ok());
    }

    #[test]
    fn test_log_domain_event_compiles_without_subscriber() {
        let domain = 7u32;
        log_domain_event!(info, "dh-05", domain, "Domain activated");
        log_domain_event!(warn, "dh-05", domain, "Slow drain", waited_ms = 12u64);
    }
}
