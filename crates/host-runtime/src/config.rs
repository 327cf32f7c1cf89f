//! # Host Configuration
//!
//! Everything the host reads at startup.
//!
//! ## Environment Variables
//!
//! - `DH_APP_BASE`: application base of the default domain (default: cwd)
//! - `DH_DOMAINS`: comma-separated friendly names of plugin domains to create
//! - `DH_PRIVATE_PATHS`: `;`-separated private search paths for plugin domains
//! - `DH_SHADOW_COPY`: enable shadow copying in plugin domains
//! - `DH_LOAD_CONTEXT`: path to a JSON `LoadContextConfig` applied to every
//!   plugin domain
//!
//! Telemetry variables are read by `TelemetryConfig::from_env`.

use dh_01_load_context::{LoadContext, LoadContextConfig, LoadContextError};
use domain_telemetry::TelemetryConfig;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A domain name in `DH_DOMAINS` is empty.
    #[error("DH_DOMAINS contains an empty domain name")]
    EmptyDomainName,

    /// The load-context file could not be read.
    #[error("Cannot read load context file {path}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// IO error.
        source: std::io::Error,
    },

    /// The load-context file is not valid JSON.
    #[error("Invalid load context file {path}: {message}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The load context rejected a value.
    #[error(transparent)]
    LoadContext(#[from] LoadContextError),
}

/// Complete host configuration.
#[derive(Debug, Clone, Default)]
pub struct HostConfig {
    /// Application base of the default domain.
    pub app_base: Option<PathBuf>,
    /// Plugin domains to create at startup.
    pub domains: Vec<String>,
    /// Private search paths for plugin domains.
    pub private_paths: Vec<PathBuf>,
    /// Shadow copy in plugin domains.
    pub shadow_copy: bool,
    /// Shared load-context template for plugin domains.
    pub load_context: Option<LoadContextConfig>,
    /// Logging and metrics.
    pub telemetry: TelemetryConfig,
}

impl HostConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_vars(|name| std::env::var(name).ok())?;
        config.telemetry = TelemetryConfig::from_env();
        Ok(config)
    }

    /// Read configuration through `lookup`.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            app_base: lookup("DH_APP_BASE").filter(|v| !v.is_empty()).map(PathBuf::from),
            shadow_copy: lookup("DH_SHADOW_COPY").map(|v| parse_flag(&v)).unwrap_or(false),
            ..Self::default()
        };

        if let Some(names) = lookup("DH_DOMAINS").filter(|v| !v.trim().is_empty()) {
            for name in names.split(',').map(str::trim) {
                if name.is_empty() {
                    return Err(ConfigError::EmptyDomainName);
                }
                config.domains.push(name.to_string());
            }
        }

        if let Some(paths) = lookup("DH_PRIVATE_PATHS") {
            config.private_paths = paths
                .split(';')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .collect();
        }

        if let Some(path) = lookup("DH_LOAD_CONTEXT").map(PathBuf::from) {
            let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            let parsed = LoadContextConfig::from_json(&text).map_err(|e| ConfigError::Parse {
                path,
                message: e.to_string(),
            })?;
            config.load_context = Some(parsed);
        }

        Ok(config)
    }

    /// Load context for the default domain.
    pub fn default_load_context(&self) -> LoadContext {
        let mut builder = LoadContext::builder().application_name("host");
        if let Some(base) = &self.app_base {
            builder = builder.application_base(base.clone());
        }
        builder.build()
    }

    /// Fresh load context for a plugin domain.
    pub fn plugin_load_context(&self, friendly_name: &str) -> Result<LoadContext, ConfigError> {
        let context = match &self.load_context {
            Some(template) => template.clone().into_builder().build(),
            None => LoadContext::new(),
        };
        if context.application_name().is_none() {
            context.set_application_name(friendly_name)?;
        }
        if !self.private_paths.is_empty() {
            context.set_private_search_paths(self.private_paths.clone())?;
        }
        if self.shadow_copy {
            context.set_shadow_copy_enabled(true);
        }
        Ok(context)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_empty_environment() {
        let config = HostConfig::from_vars(vars(&[])).unwrap();
        assert!(config.app_base.is_none());
        assert!(config.domains.is_empty());
        assert!(!config.shadow_copy);
    }

    #[test]
    fn test_domains_and_paths() {
        let config = HostConfig::from_vars(vars(&[
            ("DH_APP_BASE", "/srv/host"),
            ("DH_DOMAINS", "plugins, reports"),
            ("DH_PRIVATE_PATHS", "bin;lib;"),
            ("DH_SHADOW_COPY", "yes"),
        ]))
        .unwrap();

        assert_eq!(config.app_base, Some(PathBuf::from("/srv/host")));
        assert_eq!(config.domains, vec!["plugins", "reports"]);
        assert_eq!(config.private_paths, vec![PathBuf::from("bin"), PathBuf::from("lib")]);
        assert!(config.shadow_copy);
    }

    #[test]
    fn test_empty_domain_name_rejected() {
        let err = HostConfig::from_vars(vars(&[("DH_DOMAINS", "a,,b")])).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyDomainName));
    }

    #[test]
    fn test_plugin_context_named_after_domain() {
        let config = HostConfig::from_vars(vars(&[("DH_SHADOW_COPY", "1")])).unwrap();
        let context = config.plugin_load_context("plugins").unwrap();
        assert_eq!(context.application_name().as_deref(), Some("plugins"));
        assert!(context.shadow_copy().enabled);
    }

    #[test]
    fn test_missing_load_context_file() {
        let err = HostConfig::from_vars(vars(&[("DH_LOAD_CONTEXT", "/nonexistent/ctx.json")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_context_file_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctx.json");
        std::fs::write(&path, r#"{ "application_name": "shared" }"#).unwrap();

        let config =
            HostConfig::from_vars(vars(&[("DH_LOAD_CONTEXT", path.to_str().unwrap())])).unwrap();
        let context = config.plugin_load_context("plugins").unwrap();
        assert_eq!(context.application_name().as_deref(), Some("shared"));
    }
}
