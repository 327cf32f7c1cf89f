//! # Process-Wide Services
//!
//! State that is shared by every domain in the process: the domain id counter
//! and the string interner used for friendly names and listener labels.
//!
//! A single `ProcessServices` instance is created by the host and injected
//! into the lifecycle manager, which hands it to each domain at creation.
//! Nothing in here is a `static`; lifetime and locking are explicit.

use crate::entities::DomainId;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Monotonic allocator for [`DomainId`]s.
///
/// Ids start at [`DomainId::DEFAULT`] and are never handed out twice.
#[derive(Debug)]
pub struct DomainIdAllocator {
    next: AtomicU32,
}

impl DomainIdAllocator {
    /// Create an allocator whose first id is the default domain's.
    pub fn new() -> Self {
        Self {
            next: AtomicU32::new(DomainId::DEFAULT.0),
        }
    }

    /// Allocate the next id.
    pub fn allocate(&self) -> DomainId {
        DomainId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> u32 {
        self.next.load(Ordering::Relaxed) - DomainId::DEFAULT.0
    }
}

impl Default for DomainIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Interner for strings that many domains repeat (names, listener labels).
#[derive(Debug, Default)]
pub struct StringInterner {
    strings: Mutex<HashSet<Arc<str>>>,
}

impl StringInterner {
    /// Create an empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the shared copy of `value`, inserting it if new.
    pub fn intern(&self, value: &str) -> Arc<str> {
        let mut strings = self.strings.lock();
        if let Some(existing) = strings.get(value) {
            return existing.clone();
        }
        let shared: Arc<str> = Arc::from(value);
        strings.insert(shared.clone());
        shared
    }

    /// Number of distinct strings held.
    pub fn len(&self) -> usize {
        self.strings.lock().len()
    }

    /// Whether the interner is empty.
    pub fn is_empty(&self) -> bool {
        self.strings.lock().is_empty()
    }
}

/// The process-wide service bundle.
#[derive(Debug, Default)]
pub struct ProcessServices {
    ids: DomainIdAllocator,
    interner: StringInterner,
}

impl ProcessServices {
    /// Create the service bundle. Call once per process.
    pub fn new() -> Arc<Self> {
        debug!("Process services created");
        Arc::new(Self::default())
    }

    /// The domain id allocator.
    pub fn ids(&self) -> &DomainIdAllocator {
        &self.ids
    }

    /// The string interner.
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_first_id_is_default() {
        let services = ProcessServices::new();
        assert_eq!(services.ids().allocate(), DomainId::DEFAULT);
        assert_eq!(services.ids().allocate(), DomainId(2));
        assert_eq!(services.ids().allocated(), 2);
    }

    #[test]
    fn test_ids_unique_across_threads() {
        let services = ProcessServices::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let services = services.clone();
                thread::spawn(move || (0..100).map(|_| services.ids().allocate()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<DomainId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 800);
    }

    #[test]
    fn test_interner_shares_storage() {
        let interner = StringInterner::new();
        let a = interner.intern("DefaultDomain");
        let b = interner.intern("DefaultDomain");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(interner.len(), 1);
        interner.intern("Plugins");
        assert_eq!(interner.len(), 2);
    }
}
