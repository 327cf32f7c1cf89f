//! # Component Locator
//!
//! Walks a sealed load context's probe plan and returns the first candidate
//! file that exists.

use crate::domain::LoadContextSnapshot;
use crate::ports::FileProbe;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::trace;

/// Locates component files for one sealed load context.
pub struct ComponentLocator<P: FileProbe> {
    snapshot: Arc<LoadContextSnapshot>,
    probe: P,
}

impl<P: FileProbe> ComponentLocator<P> {
    /// Create a locator over a sealed snapshot.
    pub fn new(snapshot: Arc<LoadContextSnapshot>, probe: P) -> Self {
        Self { snapshot, probe }
    }

    /// First existing candidate file for `component_name`.
    pub fn locate(&self, component_name: &str) -> Option<PathBuf> {
        let found = self
            .snapshot
            .candidate_files(component_name)
            .into_iter()
            .find(|candidate| self.probe.exists(candidate));
        trace!(component = component_name, found = ?found, "[dh-01] Probe finished");
        found
    }

    /// Every existing candidate file for `component_name`, in probing order.
    pub fn locate_all(&self, component_name: &str) -> Vec<PathBuf> {
        self.snapshot
            .candidate_files(component_name)
            .into_iter()
            .filter(|candidate| self.probe.exists(candidate))
            .collect()
    }

    /// The snapshot this locator walks.
    pub fn snapshot(&self) -> &Arc<LoadContextSnapshot> {
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::OsFileProbe;
    use crate::domain::LoadContext;
    use crate::ports::MockFileProbe;

    #[test]
    fn test_locate_prefers_earlier_directory() {
        let snapshot = LoadContext::builder()
            .application_base("/srv/app")
            .private_search_path("bin")
            .module_extensions(["dll"])
            .build()
            .finalize()
            .unwrap();

        let probe = MockFileProbe::new();
        probe.add_file("/srv/app/bin/Lib.dll");
        probe.add_file("/srv/app/app/Lib.dll");

        let locator = ComponentLocator::new(snapshot, probe);
        assert_eq!(locator.locate("Lib"), Some(PathBuf::from("/srv/app/app/Lib.dll")));
        assert_eq!(locator.locate_all("Lib").len(), 2);
        assert_eq!(locator.locate("Missing"), None);
    }

    #[test]
    fn test_locate_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("Reports.so"), b"").unwrap();

        let snapshot = LoadContext::builder()
            .application_base(dir.path())
            .private_search_path("bin")
            .build()
            .finalize()
            .unwrap();

        let locator = ComponentLocator::new(snapshot, OsFileProbe);
        let found = locator.locate("Reports").unwrap();
        assert!(found.ends_with("bin/Reports.so"));
    }
}
