//! Outbound ports (SPI) for the resolution subsystem.

use crate::domain::ListenerFault;
use parking_lot::Mutex;

/// Receives listener faults the pipeline swallowed.
///
/// The lifecycle manager plugs its first-chance error channel in here.
pub trait FaultObserver: Send + Sync {
    /// Called once per fault, on the resolving thread.
    fn on_fault(&self, fault: &ListenerFault);
}

impl<F> FaultObserver for F
where
    F: Fn(&ListenerFault) + Send + Sync,
{
    fn on_fault(&self, fault: &ListenerFault) {
        self(fault)
    }
}

/// Records faults for tests.
#[derive(Debug, Default)]
pub struct RecordingFaultObserver {
    faults: Mutex<Vec<ListenerFault>>,
}

impl RecordingFaultObserver {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Faults seen so far.
    pub fn faults(&self) -> Vec<ListenerFault> {
        self.faults.lock().clone()
    }
}

impl FaultObserver for RecordingFaultObserver {
    fn on_fault(&self, fault: &ListenerFault) {
        self.faults.lock().push(fault.clone());
    }
}
