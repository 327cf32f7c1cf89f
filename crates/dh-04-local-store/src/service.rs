//! # Domain-Local Store
//!
//! Per-domain key/value storage. Generic entries live in a map under one
//! mutex, each with an optional read guard. Well-known keys bypass the map
//! and read or write the domain's load context under its own lock.

use crate::domain::{AccessGuard, StoreError, StoreValue, WellKnownKey};
use dh_01_load_context::{LoadContext, LoadContextError};
use dh_02_trust::GrantSet;
use domain_telemetry::STORE_ACCESS_DENIED;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct Entry {
    value: StoreValue,
    guard: Option<AccessGuard>,
}

/// Key/value store owned by one domain.
pub struct DomainLocalStore {
    context: Arc<LoadContext>,
    entries: Mutex<HashMap<String, Entry>>,
}

impl DomainLocalStore {
    /// A store whose well-known keys map onto `context`.
    pub fn new(context: Arc<LoadContext>) -> Self {
        Self {
            context,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The load context behind the well-known keys.
    pub fn load_context(&self) -> &Arc<LoadContext> {
        &self.context
    }

    /// Store `value` under `key`, replacing any previous entry.
    ///
    /// Well-known keys are written through to the load context and cannot
    /// carry a guard.
    pub fn set(
        &self,
        key: &str,
        value: impl Into<StoreValue>,
        guard: Option<AccessGuard>,
    ) -> Result<(), StoreError> {
        let value = value.into();
        if let Some(well_known) = WellKnownKey::from_key(key) {
            if guard.is_some() {
                return Err(invalid(well_known, "well-known keys cannot carry an access guard"));
            }
            return self.write_well_known(well_known, value);
        }

        debug!(key, guarded = guard.is_some(), "[dh-04] Store entry set");
        self.entries.lock().insert(key.to_string(), Entry { value, guard });
        Ok(())
    }

    /// Read `key` on behalf of a caller holding `caller_grant`.
    ///
    /// Missing keys read as `None`. Well-known keys are not guarded.
    pub fn get(&self, key: &str, caller_grant: &GrantSet) -> Result<Option<StoreValue>, StoreError> {
        if let Some(well_known) = WellKnownKey::from_key(key) {
            return Ok(self.read_well_known(well_known));
        }

        // Guards may read the store, so they run with the lock released.
        let Some(entry) = self.entries.lock().get(key).cloned() else {
            return Ok(None);
        };
        if let Some(guard) = &entry.guard {
            if !guard.check(caller_grant) {
                STORE_ACCESS_DENIED.inc();
                warn!(key, guard = %guard, "[dh-04] Store read denied");
                return Err(StoreError::AccessDenied {
                    key: key.to_string(),
                    requirement: guard.to_string(),
                });
            }
        }
        Ok(Some(entry.value))
    }

    /// Remove a generic entry, returning its value.
    pub fn remove(&self, key: &str) -> Result<Option<StoreValue>, StoreError> {
        if let Some(well_known) = WellKnownKey::from_key(key) {
            return Err(invalid(well_known, "well-known keys cannot be removed"));
        }
        Ok(self.entries.lock().remove(key).map(|entry| entry.value))
    }

    /// Generic keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of generic entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether there are no generic entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every generic entry. Called when the domain unloads.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn read_well_known(&self, key: WellKnownKey) -> Option<StoreValue> {
        let ctx = &self.context;
        match key {
            WellKnownKey::ApplicationBase => ctx.application_base().map(StoreValue::Path),
            WellKnownKey::ApplicationName => ctx.application_name().map(StoreValue::Text),
            WellKnownKey::DynamicBase => ctx.dynamic_base().map(StoreValue::Path),
            WellKnownKey::ShadowCopyDirectories => {
                non_empty(ctx.shadow_copy().directories).map(StoreValue::PathList)
            }
            WellKnownKey::ConfigurationBytes => ctx.configuration_blob().map(StoreValue::Bytes),
            WellKnownKey::PrivateBinPath => non_empty(ctx.private_search_paths()).map(StoreValue::PathList),
            WellKnownKey::CachePath => ctx.shadow_copy().cache_path.map(StoreValue::Path),
        }
    }

    fn write_well_known(&self, key: WellKnownKey, value: StoreValue) -> Result<(), StoreError> {
        let ctx = &self.context;
        let shape_error = || invalid(key, format!("unexpected value shape: {}", value.shape()));

        match key {
            WellKnownKey::ApplicationBase => {
                let path = value.as_path().ok_or_else(shape_error)?;
                ctx.set_application_base(path).map_err(|e| sealed(key, e))?;
            }
            WellKnownKey::ApplicationName => {
                let name = value.as_text().ok_or_else(shape_error)?;
                ctx.set_application_name(name).map_err(|e| sealed(key, e))?;
            }
            WellKnownKey::DynamicBase => {
                ctx.set_dynamic_base(value.as_path().ok_or_else(shape_error)?);
            }
            WellKnownKey::ShadowCopyDirectories => {
                ctx.set_shadow_copy_directories(value.as_path_list().ok_or_else(shape_error)?);
            }
            WellKnownKey::ConfigurationBytes => {
                let blob = value.as_bytes().ok_or_else(shape_error)?.to_vec();
                ctx.set_configuration_blob(blob).map_err(|e| sealed(key, e))?;
            }
            WellKnownKey::PrivateBinPath => {
                let paths = value.as_path_list().ok_or_else(shape_error)?;
                ctx.set_private_search_paths(paths).map_err(|e| sealed(key, e))?;
            }
            WellKnownKey::CachePath => {
                ctx.set_cache_path(value.as_path().ok_or_else(shape_error)?);
            }
        }
        debug!(key = %key, "[dh-04] Well-known key written through to load context");
        Ok(())
    }
}

fn invalid(key: WellKnownKey, reason: impl Into<String>) -> StoreError {
    StoreError::InvalidOperation {
        key,
        reason: reason.into(),
    }
}

/// Sealed-field rejections become `InvalidOperation`; bad input stays a
/// load context error.
fn sealed(key: WellKnownKey, error: LoadContextError) -> StoreError {
    if error.is_sealed() {
        invalid(key, error.to_string())
    } else {
        StoreError::LoadContext(error)
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
