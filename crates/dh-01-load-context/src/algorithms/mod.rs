//! # Algorithms
//!
//! Pure functions used when sealing a load context.

pub mod finalize;
pub mod probing;

pub use finalize::{default_application_name, normalize_base, normalize_private_path};
pub use probing::{build_probe_plan, candidate_files, DEFAULT_MODULE_EXTENSIONS};
