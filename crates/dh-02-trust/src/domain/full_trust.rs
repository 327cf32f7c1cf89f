//! # Full-Trust Allow-List
//!
//! Identities that always run unrestricted inside a homogeneous domain.
//! Matching is exact on (name, public key, version).

use shared_types::ComponentIdentity;
use std::sync::atomic::{AtomicBool, Ordering};

/// One allow-listed identity.
#[derive(Debug)]
pub struct FullTrustEntry {
    identity: ComponentIdentity,
    used: AtomicBool,
}

impl FullTrustEntry {
    /// Create an unused entry.
    pub fn new(identity: ComponentIdentity) -> Self {
        Self {
            identity,
            used: AtomicBool::new(false),
        }
    }

    /// The allow-listed identity.
    pub fn identity(&self) -> &ComponentIdentity {
        &self.identity
    }

    /// Whether a component has matched this entry.
    pub fn is_used(&self) -> bool {
        self.used.load(Ordering::Acquire)
    }

    /// Record a match. Returns `true` only for the first one.
    pub fn mark_used(&self) -> bool {
        !self.used.swap(true, Ordering::AcqRel)
    }
}

/// The allow-list of a homogeneous domain.
#[derive(Debug, Default)]
pub struct FullTrustList {
    entries: Vec<FullTrustEntry>,
}

impl FullTrustList {
    /// Build from identities; duplicates collapse into one entry.
    pub fn new(identities: impl IntoIterator<Item = ComponentIdentity>) -> Self {
        let mut entries: Vec<FullTrustEntry> = Vec::new();
        for identity in identities {
            if !entries.iter().any(|e| e.identity.same_strong_identity(&identity)) {
                entries.push(FullTrustEntry::new(identity));
            }
        }
        Self { entries }
    }

    /// The entry matching `identity`, marked as used.
    pub fn match_and_mark(&self, identity: &ComponentIdentity) -> Option<&FullTrustEntry> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.identity.same_strong_identity(identity))?;
        entry.mark_used();
        Some(entry)
    }

    /// Whether `identity` is listed, without marking anything.
    pub fn contains(&self, identity: &ComponentIdentity) -> bool {
        self.entries
            .iter()
            .any(|e| e.identity.same_strong_identity(identity))
    }

    /// All entries.
    pub fn entries(&self) -> &[FullTrustEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{PublicKeyToken, Version};

    fn lib(version: Version) -> ComponentIdentity {
        ComponentIdentity::strong("Lib", PublicKeyToken::new(vec![0xAB, 0xCD]), version)
    }

    #[test]
    fn test_match_requires_exact_version() {
        let list = FullTrustList::new([lib(Version::new(1, 0, 0, 0))]);
        assert!(list.match_and_mark(&lib(Version::new(1, 0, 0, 0))).is_some());
        assert!(list.match_and_mark(&lib(Version::new(2, 0, 0, 0))).is_none());
    }

    #[test]
    fn test_mark_used_is_idempotent() {
        let entry = FullTrustEntry::new(lib(Version::new(1, 0, 0, 0)));
        assert!(!entry.is_used());
        assert!(entry.mark_used());
        assert!(!entry.mark_used());
        assert!(entry.is_used());
    }

    #[test]
    fn test_duplicates_collapse() {
        let list = FullTrustList::new([lib(Version::new(1, 0, 0, 0)), lib(Version::new(1, 0, 0, 0))]);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_contains_does_not_mark() {
        let list = FullTrustList::new([lib(Version::new(1, 0, 0, 0))]);
        assert!(list.contains(&lib(Version::new(1, 0, 0, 0))));
        assert!(!list.entries()[0].is_used());
    }
}
