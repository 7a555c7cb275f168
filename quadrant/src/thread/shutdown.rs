use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::warn;

use crate::thread::mailbox::Mailbox;
use crate::thread::worker::{WorkerId, panic_message};

/// Outcome of draining the pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Worker threads joined, including the ones that panicked.
    pub joined: usize,

    /// Workers whose thread ended in a panic outside the engine call.
    pub panicked: Vec<WorkerId>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.panicked.is_empty()
    }
}

/// Owns the worker threads and brings them down.
///
/// Shutdown is cooperative: it signals cancellation, wakes every waiting
/// worker and joins them all. Workers busy with a request finish it and emit
/// its outcome before they notice the signal.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    mailbox: Arc<Mailbox>,
    handles: Vec<(WorkerId, JoinHandle<()>)>,
}

impl ShutdownCoordinator {
    pub fn new(mailbox: Arc<Mailbox>) -> Self {
        Self {
            mailbox,
            handles: Vec::new(),
        }
    }

    pub(crate) fn register(&mut self, worker: WorkerId, handle: JoinHandle<()>) {
        self.handles.push((worker, handle));
    }

    pub fn workers(&self) -> usize {
        self.handles.len()
    }

    /// Cancels, wakes all waiters and blocks until every worker has exited.
    pub fn shutdown(mut self) -> ShutdownReport {
        self.drain()
    }

    pub(crate) fn drain(&mut self) -> ShutdownReport {
        crate::log_system!("pool_shutdown", "started", workers = self.handles.len());

        self.mailbox.cancellation().cancel();
        self.mailbox.wake_all();

        let mut report = ShutdownReport::default();
        for (worker, handle) in self.handles.drain(..) {
            if let Err(payload) = handle.join() {
                let message = panic_message(payload.as_ref());
                warn!(worker = worker.index(), panic = %message, "worker thread panicked");
                report.panicked.push(worker);
            }
            report.joined += 1;
        }

        crate::log_system!(
            "pool_shutdown",
            "completed",
            joined = report.joined,
            panicked = report.panicked.len()
        );
        report
    }
}
