//! # Load Context Entities
//!
//! [`LoadContext`] is the mutable configuration record a domain is created
//! from. [`LoadContext::finalize`] seals it exactly once and hands every
//! caller the same [`LoadContextSnapshot`].
//!
//! ```text
//! builder ──build──→ [open] ──inherit_from(default)──→ [open] ──finalize──→ [sealed]
//!                      │                                                    │
//!                      └── any setter ok                 sealed fields → Err(Sealed)
//!                                                        dynamic base / shadow copy → ok
//! ```

use super::errors::LoadContextError;
use super::invariants::invariant_non_empty_name;
use super::value_objects::{Initializer, InitializerError, ProbePlan, SealedField, ShadowCopySettings};
use crate::algorithms::{
    build_probe_plan, candidate_files, default_application_name, normalize_base,
    normalize_private_path, DEFAULT_MODULE_EXTENSIONS,
};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
struct Fields {
    application_base: Option<PathBuf>,
    application_name: Option<String>,
    private_search_paths: Vec<PathBuf>,
    shadow_copy: ShadowCopySettings,
    dynamic_base: Option<PathBuf>,
    configuration_blob: Option<Vec<u8>>,
    manager_type: Option<String>,
    initializer: Option<Initializer>,
    initializer_args: Vec<String>,
    compatibility_switches: BTreeSet<String>,
    module_extensions: Vec<String>,
    disallow_code_download: bool,
}

impl Default for Fields {
    fn default() -> Self {
        Self {
            application_base: None,
            application_name: None,
            private_search_paths: Vec::new(),
            shadow_copy: ShadowCopySettings::default(),
            dynamic_base: None,
            configuration_blob: None,
            manager_type: None,
            initializer: None,
            initializer_args: Vec::new(),
            compatibility_switches: BTreeSet::new(),
            module_extensions: DEFAULT_MODULE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            disallow_code_download: false,
        }
    }
}

/// The sealed, shared view of a finalized load context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadContextSnapshot {
    /// Absolute, normalized application base.
    pub application_base: PathBuf,
    /// Application name (defaulted from the base if unset).
    pub application_name: String,
    /// Validated private search paths, relative to the base.
    pub private_search_paths: Vec<PathBuf>,
    /// Configuration blob.
    pub configuration_blob: Option<Vec<u8>>,
    /// Domain manager type name.
    pub manager_type: Option<String>,
    /// Compatibility switches.
    pub compatibility_switches: BTreeSet<String>,
    /// Extensions tried for each candidate directory.
    pub module_extensions: Vec<String>,
    /// Whether components may only come from local paths.
    pub disallow_code_download: bool,
    /// Candidate directories, in probing order.
    pub probe_plan: ProbePlan,
}

impl LoadContextSnapshot {
    /// Whether a compatibility switch is set.
    pub fn has_switch(&self, switch: &str) -> bool {
        self.compatibility_switches.contains(switch)
    }

    /// Candidate files for a component name, in probing order.
    pub fn candidate_files(&self, component_name: &str) -> Vec<PathBuf> {
        candidate_files(&self.probe_plan, component_name, &self.module_extensions)
    }
}

/// Configuration record describing where a domain's code comes from.
///
/// Safe to share between threads. Sealed fields reject mutation once
/// [`finalize`](Self::finalize) has run.
pub struct LoadContext {
    fields: RwLock<Fields>,
    sealed: AtomicBool,
    snapshot: Mutex<Option<Arc<LoadContextSnapshot>>>,
}

impl LoadContext {
    /// An empty, unsealed context.
    pub fn new() -> Self {
        Self::from_fields(Fields::default())
    }

    /// Start building a context.
    pub fn builder() -> LoadContextBuilder {
        LoadContextBuilder::default()
    }

    fn from_fields(fields: Fields) -> Self {
        Self {
            fields: RwLock::new(fields),
            sealed: AtomicBool::new(false),
            snapshot: Mutex::new(None),
        }
    }

    // =========================================================================
    // SEALING
    // =========================================================================

    /// Whether finalization has completed.
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// The sealed snapshot, if finalization has completed.
    pub fn snapshot(&self) -> Option<Arc<LoadContextSnapshot>> {
        self.snapshot.lock().clone()
    }

    /// Seal the context.
    ///
    /// Exactly one caller performs the work; every caller, concurrent or
    /// later, receives the same snapshot. On failure nothing is sealed and
    /// the caller may fix the fields and retry.
    pub fn finalize(&self) -> Result<Arc<LoadContextSnapshot>, LoadContextError> {
        if self.sealed.load(Ordering::Acquire) {
            if let Some(snapshot) = self.snapshot.lock().as_ref() {
                return Ok(Arc::clone(snapshot));
            }
        }

        let mut slot = self.snapshot.lock();
        if let Some(snapshot) = slot.as_ref() {
            return Ok(Arc::clone(snapshot));
        }

        let mut fields = self.fields.write();
        let base = fields
            .application_base
            .as_deref()
            .ok_or(LoadContextError::MissingApplicationBase)
            .and_then(normalize_base)?;
        let private_search_paths = fields
            .private_search_paths
            .iter()
            .map(|p| normalize_private_path(p))
            .collect::<Result<Vec<_>, _>>()?;
        let application_name = match fields.application_name.as_deref() {
            Some(name) if invariant_non_empty_name(name) => name.to_string(),
            _ => default_application_name(&base),
        };
        let probe_plan = build_probe_plan(&base, &application_name, &private_search_paths);

        fields.application_base = Some(base.clone());
        fields.application_name = Some(application_name.clone());
        fields.private_search_paths = private_search_paths.clone();

        let snapshot = Arc::new(LoadContextSnapshot {
            application_base: base,
            application_name,
            private_search_paths,
            configuration_blob: fields.configuration_blob.clone(),
            manager_type: fields.manager_type.clone(),
            compatibility_switches: fields.compatibility_switches.clone(),
            module_extensions: fields.module_extensions.clone(),
            disallow_code_download: fields.disallow_code_download,
            probe_plan,
        });

        *slot = Some(Arc::clone(&snapshot));
        self.sealed.store(true, Ordering::Release);

        debug!(
            application_base = %snapshot.application_base.display(),
            application_name = %snapshot.application_name,
            probe_dirs = snapshot.probe_plan.len(),
            "[dh-01] Load context sealed"
        );

        Ok(snapshot)
    }

    /// Fill unset fields from a parent (normally the default domain).
    ///
    /// Inherits the application base and configuration blob when unset,
    /// and the compatibility switches when empty.
    pub fn inherit_from(&self, parent: &LoadContextSnapshot) -> Result<(), LoadContextError> {
        self.mutate(SealedField::ApplicationBase, |fields| {
            if fields.application_base.is_none() {
                fields.application_base = Some(parent.application_base.clone());
            }
            if fields.configuration_blob.is_none() {
                fields.configuration_blob = parent.configuration_blob.clone();
            }
            if fields.compatibility_switches.is_empty() {
                fields.compatibility_switches = parent.compatibility_switches.clone();
            }
        })
    }

    fn mutate<F>(&self, field: SealedField, apply: F) -> Result<(), LoadContextError>
    where
        F: FnOnce(&mut Fields),
    {
        let mut fields = self.fields.write();
        if self.sealed.load(Ordering::Acquire) {
            warn!(field = %field, "[dh-01] Rejected mutation of sealed load context");
            return Err(LoadContextError::Sealed { field });
        }
        apply(&mut fields);
        Ok(())
    }

    // =========================================================================
    // SEALED FIELDS
    // =========================================================================

    /// Application base path.
    pub fn application_base(&self) -> Option<PathBuf> {
        self.fields.read().application_base.clone()
    }

    /// Set the application base path.
    pub fn set_application_base(&self, base: impl Into<PathBuf>) -> Result<(), LoadContextError> {
        let base = base.into();
        self.mutate(SealedField::ApplicationBase, |f| f.application_base = Some(base))
    }

    /// Application name.
    pub fn application_name(&self) -> Option<String> {
        self.fields.read().application_name.clone()
    }

    /// Set the application name.
    pub fn set_application_name(&self, name: impl Into<String>) -> Result<(), LoadContextError> {
        let name = name.into();
        if !invariant_non_empty_name(&name) {
            return Err(LoadContextError::EmptyApplicationName);
        }
        self.mutate(SealedField::ApplicationName, |f| f.application_name = Some(name))
    }

    /// Private search paths, relative to the base.
    pub fn private_search_paths(&self) -> Vec<PathBuf> {
        self.fields.read().private_search_paths.clone()
    }

    /// Replace the private search paths.
    pub fn set_private_search_paths(&self, paths: Vec<PathBuf>) -> Result<(), LoadContextError> {
        self.mutate(SealedField::PrivateSearchPaths, |f| f.private_search_paths = paths)
    }

    /// Configuration blob.
    pub fn configuration_blob(&self) -> Option<Vec<u8>> {
        self.fields.read().configuration_blob.clone()
    }

    /// Set the configuration blob.
    pub fn set_configuration_blob(&self, blob: Vec<u8>) -> Result<(), LoadContextError> {
        self.mutate(SealedField::ConfigurationBlob, |f| f.configuration_blob = Some(blob))
    }

    /// Domain manager type name.
    pub fn manager_type(&self) -> Option<String> {
        self.fields.read().manager_type.clone()
    }

    /// Set the domain manager type name.
    pub fn set_manager_type(&self, name: impl Into<String>) -> Result<(), LoadContextError> {
        let name = name.into();
        self.mutate(SealedField::ManagerType, |f| f.manager_type = Some(name))
    }

    /// Compatibility switches.
    pub fn compatibility_switches(&self) -> BTreeSet<String> {
        self.fields.read().compatibility_switches.clone()
    }

    /// Replace the compatibility switches.
    pub fn set_compatibility_switches<I, S>(&self, switches: I) -> Result<(), LoadContextError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let switches: BTreeSet<String> = switches.into_iter().map(Into::into).collect();
        self.mutate(SealedField::CompatibilitySwitches, |f| {
            f.compatibility_switches = switches
        })
    }

    // =========================================================================
    // ADJUSTABLE FIELDS
    // =========================================================================

    /// Dynamic base directory.
    pub fn dynamic_base(&self) -> Option<PathBuf> {
        self.fields.read().dynamic_base.clone()
    }

    /// Set the dynamic base directory. Allowed after sealing.
    pub fn set_dynamic_base(&self, path: impl Into<PathBuf>) {
        self.fields.write().dynamic_base = Some(path.into());
    }

    /// Shadow-copy settings.
    pub fn shadow_copy(&self) -> ShadowCopySettings {
        self.fields.read().shadow_copy.clone()
    }

    /// Turn shadow copying on or off. Allowed after sealing.
    pub fn set_shadow_copy_enabled(&self, enabled: bool) {
        self.fields.write().shadow_copy.enabled = enabled;
    }

    /// Replace the shadow-copy directories. Allowed after sealing.
    pub fn set_shadow_copy_directories(&self, directories: Vec<PathBuf>) {
        self.fields.write().shadow_copy.directories = directories;
    }

    /// Set the shadow-copy cache path. Allowed after sealing.
    pub fn set_cache_path(&self, path: impl Into<PathBuf>) {
        self.fields.write().shadow_copy.cache_path = Some(path.into());
    }

    /// Extensions tried when probing.
    pub fn module_extensions(&self) -> Vec<String> {
        self.fields.read().module_extensions.clone()
    }

    /// Whether code download is disallowed.
    pub fn disallow_code_download(&self) -> bool {
        self.fields.read().disallow_code_download
    }

    // =========================================================================
    // INITIALIZER
    // =========================================================================

    /// Arguments passed to the initializer.
    pub fn initializer_args(&self) -> Vec<String> {
        self.fields.read().initializer_args.clone()
    }

    /// Whether an initializer is configured and not yet taken.
    pub fn has_initializer(&self) -> bool {
        self.fields.read().initializer.is_some()
    }

    /// Take the initializer together with a copy of its arguments.
    ///
    /// Returns `Some` at most once per context.
    pub fn take_initializer(&self) -> Option<(Initializer, Vec<String>)> {
        let mut fields = self.fields.write();
        let initializer = fields.initializer.take()?;
        Some((initializer, fields.initializer_args.clone()))
    }

    /// Candidate files for a component name; `None` until sealed.
    pub fn candidate_files(&self, component_name: &str) -> Option<Vec<PathBuf>> {
        self.snapshot().map(|s| s.candidate_files(component_name))
    }
}

impl Default for LoadContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields.read();
        f.debug_struct("LoadContext")
            .field("application_base", &fields.application_base)
            .field("application_name", &fields.application_name)
            .field("private_search_paths", &fields.private_search_paths)
            .field("manager_type", &fields.manager_type)
            .field("has_initializer", &fields.initializer.is_some())
            .field("sealed", &self.is_sealed())
            .finish()
    }
}

/// Builder for [`LoadContext`].
#[derive(Default)]
pub struct LoadContextBuilder {
    fields: Fields,
}

impl LoadContextBuilder {
    /// Application base path.
    pub fn application_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.fields.application_base = Some(base.into());
        self
    }

    /// Application name.
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.fields.application_name = Some(name.into());
        self
    }

    /// Append a private search path.
    pub fn private_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.fields.private_search_paths.push(path.into());
        self
    }

    /// Replace the private search paths.
    pub fn private_search_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.fields.private_search_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Enable shadow copying.
    pub fn shadow_copy(mut self, cache_path: Option<PathBuf>, directories: Vec<PathBuf>) -> Self {
        self.fields.shadow_copy = ShadowCopySettings {
            enabled: true,
            cache_path,
            directories,
        };
        self
    }

    /// Dynamic base directory.
    pub fn dynamic_base(mut self, path: impl Into<PathBuf>) -> Self {
        self.fields.dynamic_base = Some(path.into());
        self
    }

    /// Configuration blob.
    pub fn configuration_blob(mut self, blob: impl Into<Vec<u8>>) -> Self {
        self.fields.configuration_blob = Some(blob.into());
        self
    }

    /// Add a compatibility switch.
    pub fn compatibility_switch(mut self, switch: impl Into<String>) -> Self {
        self.fields.compatibility_switches.insert(switch.into());
        self
    }

    /// Replace the compatibility switches.
    pub fn compatibility_switches<I, S>(mut self, switches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.compatibility_switches = switches.into_iter().map(Into::into).collect();
        self
    }

    /// Name of the domain manager registered with the host.
    pub fn manager_type(mut self, name: impl Into<String>) -> Self {
        self.fields.manager_type = Some(name.into());
        self
    }

    /// Callback run once inside the new domain.
    pub fn initializer<F>(mut self, initializer: F) -> Self
    where
        F: Fn(Vec<String>) -> Result<(), InitializerError> + Send + Sync + 'static,
    {
        self.fields.initializer = Some(Arc::new(initializer));
        self
    }

    /// Arguments passed to the initializer.
    pub fn initializer_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.initializer_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Extensions tried when probing (replaces the defaults).
    pub fn module_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.module_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Only allow components from local paths.
    pub fn disallow_code_download(mut self, disallow: bool) -> Self {
        self.fields.disallow_code_download = disallow;
        self
    }

    /// Finish building.
    pub fn build(self) -> LoadContext {
        LoadContext::from_fields(self.fields)
    }
}

/// Whether `path` lies under the sealed application base.
pub fn is_under_base(snapshot: &LoadContextSnapshot, path: &Path) -> bool {
    path.starts_with(&snapshot.application_base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    fn context() -> LoadContext {
        LoadContext::builder()
            .application_base("/srv/app/")
            .private_search_path("bin")
            .configuration_blob(b"<config/>".to_vec())
            .build()
    }

    #[test]
    fn test_finalize_normalizes_and_defaults_name() {
        let ctx = context();
        let snapshot = ctx.finalize().unwrap();
        assert_eq!(snapshot.application_base, PathBuf::from("/srv/app"));
        assert_eq!(snapshot.application_name, "app");
        assert_eq!(ctx.application_name().as_deref(), Some("app"));
        assert!(snapshot.probe_plan.contains(Path::new("/srv/app/bin/app")));
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let ctx = context();
        let first = ctx.finalize().unwrap();
        let second = ctx.finalize().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_concurrent_finalize_single_snapshot() {
        let ctx = Arc::new(context());
        let seen = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ctx = Arc::clone(&ctx);
                let seen = Arc::clone(&seen);
                thread::spawn(move || {
                    let snapshot = ctx.finalize().unwrap();
                    seen.fetch_add(1, Ordering::SeqCst);
                    snapshot
                })
            })
            .collect();

        let snapshots: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(seen.load(Ordering::SeqCst), 8);
        for snapshot in &snapshots[1..] {
            assert!(Arc::ptr_eq(&snapshots[0], snapshot));
        }
    }

    #[test]
    fn test_sealed_fields_reject_mutation() {
        let ctx = context();
        ctx.finalize().unwrap();

        let err = ctx.set_application_base("/other").unwrap_err();
        assert_eq!(
            err,
            LoadContextError::Sealed {
                field: SealedField::ApplicationBase
            }
        );
        assert!(ctx.set_configuration_blob(vec![]).is_err());
        assert!(ctx.set_manager_type("Custom").is_err());
        assert!(ctx.set_compatibility_switches(["x"]).is_err());
        assert!(ctx.set_private_search_paths(vec![]).is_err());
        assert_eq!(ctx.application_base(), Some(PathBuf::from("/srv/app")));
    }

    #[test]
    fn test_adjustable_fields_after_seal() {
        let ctx = context();
        ctx.finalize().unwrap();

        ctx.set_dynamic_base("/tmp/dyn");
        ctx.set_shadow_copy_directories(vec![PathBuf::from("/srv/app/bin")]);
        ctx.set_cache_path("/tmp/cache");

        assert_eq!(ctx.dynamic_base(), Some(PathBuf::from("/tmp/dyn")));
        assert_eq!(ctx.shadow_copy().directories.len(), 1);
        assert_eq!(ctx.shadow_copy().cache_path, Some(PathBuf::from("/tmp/cache")));
    }

    #[test]
    fn test_failed_finalize_leaves_context_open() {
        let ctx = LoadContext::builder()
            .application_base("/srv/app")
            .private_search_path("../escape")
            .build();
        assert!(ctx.finalize().is_err());
        assert!(!ctx.is_sealed());

        ctx.set_private_search_paths(vec![PathBuf::from("lib")]).unwrap();
        assert!(ctx.finalize().is_ok());
    }

    #[test]
    fn test_missing_base() {
        let ctx = LoadContext::new();
        assert_eq!(
            ctx.finalize().unwrap_err(),
            LoadContextError::MissingApplicationBase
        );
    }

    #[test]
    fn test_inherit_from_parent() {
        let parent = LoadContext::builder()
            .application_base("/srv/host")
            .configuration_blob(b"parent".to_vec())
            .compatibility_switch("LegacyProbing")
            .build()
            .finalize()
            .unwrap();

        let child = LoadContext::builder().application_name("child").build();
        child.inherit_from(&parent).unwrap();
        let snapshot = child.finalize().unwrap();

        assert_eq!(snapshot.application_base, PathBuf::from("/srv/host"));
        assert_eq!(snapshot.application_name, "child");
        assert_eq!(snapshot.configuration_blob.as_deref(), Some(&b"parent"[..]));
        assert!(snapshot.has_switch("LegacyProbing"));
    }

    #[test]
    fn test_inherit_keeps_explicit_fields() {
        let parent = context().finalize().unwrap();
        let child = LoadContext::builder()
            .application_base("/srv/child")
            .compatibility_switch("Own")
            .build();
        child.inherit_from(&parent).unwrap();
        let snapshot = child.finalize().unwrap();

        assert_eq!(snapshot.application_base, PathBuf::from("/srv/child"));
        assert!(snapshot.has_switch("Own"));
        assert_eq!(snapshot.compatibility_switches.len(), 1);
    }

    #[test]
    fn test_take_initializer_once() {
        let ctx = LoadContext::builder()
            .initializer(|args| {
                if args.is_empty() {
                    Err(InitializerError("no args".into()))
                } else {
                    Ok(())
                }
            })
            .initializer_args(["--verbose"])
            .build();

        let (init, args) = ctx.take_initializer().unwrap();
        assert_eq!(args, vec!["--verbose".to_string()]);
        assert!(init(args).is_ok());
        assert!(ctx.take_initializer().is_none());
        assert_eq!(ctx.initializer_args().len(), 1);
    }

    #[test]
    fn test_empty_application_name_rejected() {
        let ctx = LoadContext::new();
        assert_eq!(
            ctx.set_application_name(" "),
            Err(LoadContextError::EmptyApplicationName)
        );
    }

    #[test]
    fn test_candidate_files_after_seal() {
        let ctx = LoadContext::builder()
            .application_base("/srv/app")
            .module_extensions(["dll"])
            .build();
        assert!(ctx.candidate_files("Lib").is_none());
        ctx.finalize().unwrap();
        let files = ctx.candidate_files("Lib").unwrap();
        assert_eq!(files[0], PathBuf::from("/srv/app/Lib.dll"));
    }

    #[test]
    fn test_is_under_base() {
        let snapshot = context().finalize().unwrap();
        assert!(is_under_base(&snapshot, Path::new("/srv/app/bin/x.dll")));
        assert!(!is_under_base(&snapshot, Path::new("/srv/other/x.dll")));
    }
}
