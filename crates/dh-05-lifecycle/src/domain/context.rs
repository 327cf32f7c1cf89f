//! # Execution Contexts
//!
//! Each domain runs its work on one dedicated worker thread. Jobs arrive on
//! an unbounded queue and run in order; a job that panics is caught and
//! reported to its caller, and the worker keeps going.
//!
//! Work submitted from the worker thread itself runs inline, so a domain
//! calling into itself never queues behind its own job. Queued work runs
//! with its caller's entered domains, as tracked by `in_flight`.

use super::in_flight::{entered_snapshot, with_entered};
use parking_lot::Mutex;
use shared_types::DomainId;
use std::cell::Cell;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc as std_mpsc;
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

thread_local! {
    static CURRENT_DOMAIN: Cell<Option<DomainId>> = const { Cell::new(None) };
}

/// Domain whose execution context the current thread is, if any.
pub fn current_domain() -> Option<DomainId> {
    CURRENT_DOMAIN.with(Cell::get)
}

/// Opaque reference to a domain's execution context.
///
/// Carries no arithmetic meaning; only the lifecycle manager creates one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(Uuid);

impl ContextId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0.simple())
    }
}

/// Why work could not be run in a context.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContextError {
    /// The context has been stopped.
    #[error("Execution context stopped")]
    Stopped,

    /// The work panicked.
    #[error("Work panicked: {0}")]
    Panicked(String),

    /// The worker thread could not be spawned.
    #[error("Failed to start execution context: {0}")]
    Spawn(String),
}

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A domain's worker thread.
pub struct ExecutionContext {
    id: ContextId,
    domain: DomainId,
    sender: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ExecutionContext {
    /// Spawn the worker for `domain`.
    pub fn start(domain: DomainId) -> Result<Self, ContextError> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        let worker = thread::Builder::new()
            .name(format!("domain-{}", domain.as_u32()))
            .spawn(move || {
                CURRENT_DOMAIN.with(|current| current.set(Some(domain)));
                while let Some(job) = receiver.blocking_recv() {
                    job();
                }
                debug!(domain = %domain, "[dh-05] Execution context drained");
            })
            .map_err(|e| ContextError::Spawn(e.to_string()))?;

        let id = ContextId::new();
        debug!(domain = %domain, context = %id, "[dh-05] Execution context started");
        Ok(Self {
            id,
            domain,
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Opaque id of this context.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Whether the context still accepts work.
    pub fn is_running(&self) -> bool {
        self.sender.lock().is_some()
    }

    /// Run `work` on the worker and wait for its result.
    pub fn run<R, F>(&self, work: F) -> Result<R, ContextError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if current_domain() == Some(self.domain) {
            return catch_unwind(AssertUnwindSafe(work))
                .map_err(|payload| ContextError::Panicked(panic_text(payload.as_ref())));
        }

        let (reply_tx, reply_rx) = std_mpsc::sync_channel(1);
        let entered = entered_snapshot();
        let job: Job = Box::new(move || {
            let outcome = with_entered(&entered, || catch_unwind(AssertUnwindSafe(work)))
                .map_err(|payload| ContextError::Panicked(panic_text(payload.as_ref())));
            let _ = reply_tx.send(outcome);
        });

        {
            let sender = self.sender.lock();
            let Some(sender) = sender.as_ref() else {
                return Err(ContextError::Stopped);
            };
            sender.send(job).map_err(|_| ContextError::Stopped)?;
        }

        // A job dropped unrun (worker gone) closes the reply channel.
        reply_rx.recv().map_err(|_| ContextError::Stopped)?
    }

    /// Close the queue, let queued jobs finish, and join the worker.
    pub fn stop(&self) {
        let sender = self.sender.lock().take();
        drop(sender);

        let worker = self.worker.lock().take();
        let Some(worker) = worker else {
            return;
        };
        if worker.thread().id() == thread::current().id() {
            warn!(domain = %self.domain, "[dh-05] Execution context stopped from its own thread; not joining");
            return;
        }
        if worker.join().is_err() {
            warn!(domain = %self.domain, "[dh-05] Execution context worker panicked");
        }
        debug!(domain = %self.domain, context = %self.id, "[dh-05] Execution context stopped");
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("id", &self.id)
            .field("domain", &self.domain)
            .field("running", &self.is_running())
            .finish()
    }
}

fn panic_text(payload: &(dyn std::any::Any + Send)) -> String {
    dh_03_resolution::panic_message(payload)
}
