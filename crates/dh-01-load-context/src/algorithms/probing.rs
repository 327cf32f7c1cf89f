//! # Probing
//!
//! Builds the ordered directory list a domain searches for components and
//! expands it into candidate file paths.

use crate::domain::ProbePlan;
use std::path::{Path, PathBuf};

/// Extensions probed when the load context names none.
pub const DEFAULT_MODULE_EXTENSIONS: &[&str] = &["dll", "so", "dylib"];

/// Build the probe plan.
///
/// Order: `base`, `base/<name>`, then for each private path `p` in order,
/// `base/p` followed by `base/p/<name>`.
pub fn build_probe_plan(base: &Path, application_name: &str, private_paths: &[PathBuf]) -> ProbePlan {
    let mut directories = Vec::with_capacity(2 + private_paths.len() * 2);
    directories.push(base.to_path_buf());
    directories.push(base.join(application_name));
    for private in private_paths {
        let dir = base.join(private);
        let nested = dir.join(application_name);
        directories.push(dir);
        directories.push(nested);
    }
    ProbePlan::new(directories)
}

/// Candidate files for `component_name`, in probing order.
///
/// Every directory is tried with every extension before moving on, so an
/// earlier directory always wins over a later one.
pub fn candidate_files(plan: &ProbePlan, component_name: &str, extensions: &[String]) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(plan.len() * extensions.len().max(1));
    for dir in plan.directories() {
        if extensions.is_empty() {
            candidates.push(dir.join(component_name));
            continue;
        }
        for ext in extensions {
            let ext = ext.trim_start_matches('.');
            candidates.push(dir.join(format!("{component_name}.{ext}")));
        }
    }
    candidates
}
