//! # Serialized Load Context Configuration
//!
//! The data fields of a load context in serde form, so hosts can describe
//! their domains in JSON.

use crate::domain::{LoadContext, LoadContextBuilder, LoadContextError, ShadowCopySettings};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// JSON-friendly description of a load context.
///
/// Callbacks (the initializer) cannot be serialized and are attached on the
/// returned builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadContextConfig {
    /// Application base path.
    pub application_base: Option<PathBuf>,
    /// Application name.
    pub application_name: Option<String>,
    /// Private search paths, relative to the base.
    pub private_search_paths: Vec<PathBuf>,
    /// Shadow-copy settings.
    pub shadow_copy: ShadowCopySettings,
    /// Dynamic base directory.
    pub dynamic_base: Option<PathBuf>,
    /// Configuration blob as text.
    pub configuration: Option<String>,
    /// Compatibility switches.
    pub compatibility_switches: Vec<String>,
    /// Domain manager type name.
    pub manager_type: Option<String>,
    /// Initializer arguments.
    pub initializer_args: Vec<String>,
    /// Probing extensions; defaults apply when absent.
    pub module_extensions: Option<Vec<String>>,
    /// Only allow components from local paths.
    pub disallow_code_download: bool,
}

impl LoadContextConfig {
    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, LoadContextError> {
        serde_json::from_str(json).map_err(|e| LoadContextError::InvalidConfig(e.to_string()))
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, LoadContextError> {
        serde_json::to_string_pretty(self).map_err(|e| LoadContextError::InvalidConfig(e.to_string()))
    }

    /// A builder preloaded with these fields.
    pub fn into_builder(self) -> LoadContextBuilder {
        let mut builder = LoadContext::builder()
            .private_search_paths(self.private_search_paths)
            .compatibility_switches(self.compatibility_switches)
            .initializer_args(self.initializer_args)
            .disallow_code_download(self.disallow_code_download);

        if let Some(base) = self.application_base {
            builder = builder.application_base(base);
        }
        if let Some(name) = self.application_name {
            builder = builder.application_name(name);
        }
        if self.shadow_copy.enabled {
            builder = builder.shadow_copy(self.shadow_copy.cache_path, self.shadow_copy.directories);
        }
        if let Some(dynamic) = self.dynamic_base {
            builder = builder.dynamic_base(dynamic);
        }
        if let Some(configuration) = self.configuration {
            builder = builder.configuration_blob(configuration.into_bytes());
        }
        if let Some(manager) = self.manager_type {
            builder = builder.manager_type(manager);
        }
        if let Some(extensions) = self.module_extensions {
            builder = builder.module_extensions(extensions);
        }
        builder
    }
}

impl From<LoadContextConfig> for LoadContext {
    fn from(config: LoadContextConfig) -> Self {
        config.into_builder().build()
    }
}
