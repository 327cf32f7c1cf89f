//! Load context invariants.

use std::path::{Component, Path};

/// INVARIANT-1: Private search paths are relative.
///
/// An absolute private path would let a domain probe outside its base.
pub fn invariant_relative(path: &Path) -> bool {
    !path.has_root()
        && !path
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
}

/// INVARIANT-2: Private search paths never climb above the application base.
pub fn invariant_contained(path: &Path) -> bool {
    let mut depth: usize = 0;
    for component in path.components() {
        match component {
            Component::ParentDir => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    true
}

/// INVARIANT-3: A domain's friendly and application names are non-empty.
pub fn invariant_non_empty_name(name: &str) -> bool {
    !name.trim().is_empty()
}
