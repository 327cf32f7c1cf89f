//! # Recursion Guard
//!
//! Per-thread marker for single-keyed lazy lookups that may re-enter
//! themselves (lazy evidence synthesis, lazily computed store values).
//!
//! A lookup calls [`RecursionGuard::enter`] with its key. If the same key is
//! already being loaded further up the current thread's stack, `enter`
//! returns `None` and the caller must fail fast with a diagnostic sentinel
//! instead of recursing or deadlocking.

use std::cell::RefCell;
use tracing::warn;

thread_local! {
    static IN_PROGRESS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// RAII marker for a key that is currently being loaded on this thread.
#[derive(Debug)]
pub struct RecursionGuard {
    key: String,
}

impl RecursionGuard {
    /// Mark `key` as in progress.
    ///
    /// Returns `None` when `key` is already in progress on this thread.
    #[must_use]
    pub fn enter(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        IN_PROGRESS.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.iter().any(|k| *k == key) {
                warn!(key = %key, depth = stack.len(), "Recursive lookup detected");
                return None;
            }
            stack.push(key.clone());
            Some(Self { key })
        })
    }

    /// Whether `key` is in progress on this thread.
    pub fn is_active(key: &str) -> bool {
        IN_PROGRESS.with(|stack| stack.borrow().iter().any(|k| k == key))
    }

    /// Number of keys in progress on this thread.
    pub fn depth() -> usize {
        IN_PROGRESS.with(|stack| stack.borrow().len())
    }

    /// The guarded key.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for RecursionGuard {
    fn drop(&mut self) {
        IN_PROGRESS.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(pos) = stack.iter().rposition(|k| *k == self.key) {
                stack.remove(pos);
            }
        });
    }
}
