//! # Listener Registry
//!
//! Ordered listener lists, one per resolution kind. Duplicates are allowed:
//! registering the same listener twice makes it run twice.

use super::listener::ResolveListener;
use parking_lot::Mutex;
use shared_types::ResolveKind;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifies one registration.
#[derive(Clone)]
pub struct ListenerHandle {
    id: u64,
    kind: ResolveKind,
    listener: Arc<dyn ResolveListener>,
}

impl ListenerHandle {
    /// Registration id (unique per registry).
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Kind the listener was registered for.
    pub fn kind(&self) -> ResolveKind {
        self.kind
    }

    /// The registered listener.
    pub fn listener(&self) -> &Arc<dyn ResolveListener> {
        &self.listener
    }
}

impl PartialEq for ListenerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ListenerHandle {}

impl fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("listener", &self.listener.name())
            .finish()
    }
}

/// Per-kind ordered listener lists under one lock.
#[derive(Default)]
pub struct ListenerRegistry {
    lists: Mutex<HashMap<ResolveKind, Vec<ListenerHandle>>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener to the kind's list.
    pub fn register(&self, kind: ResolveKind, listener: Arc<dyn ResolveListener>) -> ListenerHandle {
        let handle = ListenerHandle {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            kind,
            listener,
        };
        self.lists.lock().entry(kind).or_default().push(handle.clone());
        handle
    }

    /// Remove one registration. Returns `false` if it was not present.
    pub fn unregister(&self, kind: ResolveKind, handle: &ListenerHandle) -> bool {
        let mut lists = self.lists.lock();
        let Some(list) = lists.get_mut(&kind) else {
            return false;
        };
        match list.iter().position(|h| h.id == handle.id) {
            Some(index) => {
                list.remove(index);
                true
            }
            None => false,
        }
    }

    /// Copy of the kind's list, in registration order.
    pub fn snapshot(&self, kind: ResolveKind) -> Vec<Arc<dyn ResolveListener>> {
        self.lists
            .lock()
            .get(&kind)
            .map(|list| list.iter().map(|h| Arc::clone(&h.listener)).collect())
            .unwrap_or_default()
    }

    /// Number of registrations for a kind.
    pub fn count(&self, kind: ResolveKind) -> usize {
        self.lists.lock().get(&kind).map_or(0, Vec::len)
    }

    /// Drop every registration.
    pub fn clear(&self) {
        self.lists.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ListenerResult, ResolveRequest};

    fn silent(_: &ResolveRequest) -> ListenerResult {
        Ok(None)
    }

    #[test]
    fn test_register_and_unregister() {
        let registry = ListenerRegistry::new();
        let a = registry.register(ResolveKind::Module, Arc::new(silent));
        let b = registry.register(ResolveKind::Module, Arc::new(silent));
        assert_ne!(a, b);
        assert_eq!(registry.count(ResolveKind::Module), 2);

        assert!(registry.unregister(ResolveKind::Module, &a));
        assert!(!registry.unregister(ResolveKind::Module, &a));
        assert!(!registry.unregister(ResolveKind::Type, &b));
        assert_eq!(registry.count(ResolveKind::Module), 1);
    }

    #[test]
    fn test_duplicate_listener_registered_twice() {
        let registry = ListenerRegistry::new();
        let shared: Arc<dyn ResolveListener> = Arc::new(silent);
        let first = registry.register(ResolveKind::Type, Arc::clone(&shared));
        registry.register(ResolveKind::Type, shared);
        assert_eq!(registry.snapshot(ResolveKind::Type).len(), 2);

        registry.unregister(ResolveKind::Type, &first);
        assert_eq!(registry.snapshot(ResolveKind::Type).len(), 1);
    }

    #[test]
    fn test_kinds_are_independent() {
        let registry = ListenerRegistry::new();
        registry.register(ResolveKind::Resource, Arc::new(silent));
        assert_eq!(registry.count(ResolveKind::Module), 0);
        assert!(registry.snapshot(ResolveKind::Module).is_empty());
        registry.clear();
        assert_eq!(registry.count(ResolveKind::Resource), 0);
    }
}
