//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line.
    pub service_name: String,

    /// Host instance identifier.
    pub host_id: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive.
    pub log_level: String,

    /// Whether to write logs to the console.
    pub console_output: bool,

    /// Whether to format logs as JSON.
    pub json_logs: bool,

    /// Whether to register the Prometheus collectors.
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "domain-host".to_string(),
            host_id: "0".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DH_SERVICE_NAME`: Service name (default: domain-host)
    /// - `DH_HOST_ID`: Host instance identifier (default: 0)
    /// - `DH_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `DH_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `DH_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    /// - `DH_METRICS_ENABLED`: Register Prometheus collectors (default: true)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("DH_SERVICE_NAME")
                .unwrap_or_else(|_| "domain-host".to_string()),

            host_id: env::var("DH_HOST_ID").unwrap_or_else(|_| "0".to_string()),

            log_level: env::var("DH_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("DH_CONSOLE_OUTPUT")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),

            json_logs: env::var("DH_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(is_container),

            metrics_enabled: env::var("DH_METRICS_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
        }
    }

    /// Full service name including the host id.
    pub fn full_service_name(&self) -> String {
        if self.host_id == "0" {
            self.service_name.clone()
        } else {
            format!("{}-{}", self.service_name, self.host_id)
        }
    }
}

fn parse_flag(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    value == "true" || value == "1" || value == "yes"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "domain-host");
        assert_eq!(config.log_level, "info");
        assert!(config.metrics_enabled);
    }

    #[test]
    fn test_full_service_name() {
        let mut config = TelemetryConfig::default();
        assert_eq!(config.full_service_name(), "domain-host");

        config.host_id = "7".to_string();
        assert_eq!(config.full_service_name(), "domain-host-7");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("0"));
    }
}
