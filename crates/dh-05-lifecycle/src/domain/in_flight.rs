//! # In-Flight Tracking
//!
//! Counts resolution and cross-domain calls running against a domain so
//! that unload can wait for them. Once closed, no new entry is admitted.
//!
//! Each thread also remembers which domains it is currently inside, so an
//! unload requested from within one of those calls can be refused instead of
//! waiting on itself.

use parking_lot::{Condvar, Mutex};
use shared_types::DomainId;
use std::cell::RefCell;
use std::time::Duration;

thread_local! {
    static ENTERED: RefCell<Vec<DomainId>> = const { RefCell::new(Vec::new()) };
}

/// Whether the current thread is inside an in-flight call on `domain`.
pub fn entered_on_current_thread(domain: DomainId) -> bool {
    ENTERED.with(|entered| entered.borrow().contains(&domain))
}

/// Domains the current thread is inside, outermost first.
pub(crate) fn entered_snapshot() -> Vec<DomainId> {
    ENTERED.with(|entered| entered.borrow().clone())
}

/// Run `work` with `inherited` pushed onto this thread's entered set.
///
/// Work hopping onto another thread carries its caller's entered set along,
/// so an unload issued from the far side still sees it is inside the call.
pub(crate) fn with_entered<R>(inherited: &[DomainId], work: impl FnOnce() -> R) -> R {
    struct Restore(usize);

    impl Drop for Restore {
        fn drop(&mut self) {
            ENTERED.with(|entered| entered.borrow_mut().truncate(self.0));
        }
    }

    let _restore = ENTERED.with(|entered| {
        let mut entered = entered.borrow_mut();
        let depth = entered.len();
        entered.extend_from_slice(inherited);
        Restore(depth)
    });
    work()
}

#[derive(Debug)]
struct Counter {
    active: usize,
    accepting: bool,
}

/// In-flight counter with a drain wait.
#[derive(Debug)]
pub struct InFlightTracker {
    domain: DomainId,
    counter: Mutex<Counter>,
    drained: Condvar,
}

impl InFlightTracker {
    /// An open tracker with nothing in flight.
    pub fn new(domain: DomainId) -> Self {
        Self {
            domain,
            counter: Mutex::new(Counter {
                active: 0,
                accepting: true,
            }),
            drained: Condvar::new(),
        }
    }

    /// Admit one call. `None` once the tracker is closed.
    pub fn enter(&self) -> Option<InFlightGuard<'_>> {
        let mut counter = self.counter.lock();
        if !counter.accepting {
            return None;
        }
        counter.active += 1;
        drop(counter);

        ENTERED.with(|entered| entered.borrow_mut().push(self.domain));
        Some(InFlightGuard { tracker: self })
    }

    /// Stop admitting calls.
    pub fn close(&self) {
        self.counter.lock().accepting = false;
    }

    /// Whether calls are still admitted.
    pub fn is_open(&self) -> bool {
        self.counter.lock().accepting
    }

    /// Calls currently in flight.
    pub fn active(&self) -> usize {
        self.counter.lock().active
    }

    /// Block until nothing is in flight.
    pub fn wait_idle(&self) {
        let mut counter = self.counter.lock();
        while counter.active > 0 {
            self.drained.wait(&mut counter);
        }
    }

    /// Block until nothing is in flight or `timeout` elapses. Returns
    /// whether the tracker drained.
    pub fn wait_idle_for(&self, timeout: Duration) -> bool {
        let mut counter = self.counter.lock();
        while counter.active > 0 {
            if self.drained.wait_for(&mut counter, timeout).timed_out() {
                return counter.active == 0;
            }
        }
        true
    }

    fn exit(&self) {
        let mut counter = self.counter.lock();
        counter.active = counter.active.saturating_sub(1);
        if counter.active == 0 {
            self.drained.notify_all();
        }
    }
}

/// Holds one in-flight slot; released on drop.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    tracker: &'a InFlightTracker,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let domain = self.tracker.domain;
        ENTERED.with(|entered| {
            let mut entered = entered.borrow_mut();
            if let Some(pos) = entered.iter().rposition(|d| *d == domain) {
                entered.remove(pos);
            }
        });
        self.tracker.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_enter_exit_and_close() {
        let tracker = InFlightTracker::new(DomainId(2));
        {
            let _guard = tracker.enter().unwrap();
            assert_eq!(tracker.active(), 1);
            assert!(entered_on_current_thread(DomainId(2)));
        }
        assert_eq!(tracker.active(), 0);
        assert!(!entered_on_current_thread(DomainId(2)));

        tracker.close();
        assert!(tracker.enter().is_none());
        assert!(!tracker.is_open());
    }

    #[test]
    fn test_entered_set_carried_to_other_thread() {
        let tracker = InFlightTracker::new(DomainId(5));
        let _guard = tracker.enter().unwrap();
        let snapshot = entered_snapshot();

        let seen = thread::spawn(move || {
            let inside = with_entered(&snapshot, || entered_on_current_thread(DomainId(5)));
            (inside, entered_on_current_thread(DomainId(5)))
        })
        .join()
        .unwrap();
        assert_eq!(seen, (true, false));
    }

    #[test]
    fn test_wait_idle_blocks_until_drained() {
        let tracker = Arc::new(InFlightTracker::new(DomainId(3)));
        let released = Arc::new(AtomicBool::new(false));
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();

        let worker = {
            let tracker = Arc::clone(&tracker);
            let released = Arc::clone(&released);
            thread::spawn(move || {
                let _guard = tracker.enter().unwrap();
                entered_tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(50));
                released.store(true, Ordering::SeqCst);
            })
        };

        entered_rx.recv().unwrap();
        tracker.close();
        tracker.wait_idle();
        assert!(released.load(Ordering::SeqCst));
        worker.join().unwrap();
    }

    #[test]
    fn test_wait_idle_for_times_out() {
        let tracker = InFlightTracker::new(DomainId(4));
        let _guard = tracker.enter().unwrap();
        assert!(!tracker.wait_idle_for(Duration::from_millis(10)));
    }
}
