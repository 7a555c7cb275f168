//! # Worker Thread Module
//!
//! A worker is a dedicated OS thread that repeatedly claims the mailbox's
//! request, integrates it and reports the outcome.
//!
//! ## Lifecycle
//! ```text
//!             claim() -> Some(request)
//!   Waiting ------------------------------> Processing
//!      ^                                         |
//!      +------------ outcome emitted ------------+
//!      |
//!      | claim() -> None (cancelled, nothing ready)
//!      v
//!   Terminated
//! ```
//!
//! Cancellation is only observed inside `claim`. Once a request has been
//! claimed the engine runs to completion and its outcome is always emitted.
//! An engine error or panic is reported and the worker goes back to
//! waiting; one failed computation never takes the worker down.

use std::any::Any;
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use quadrant_api::{Integrand, IntegrationEngine, PendingRequest};
use serde::Serialize;

use crate::thread::mailbox::Mailbox;
use crate::thread::sink::{OutputSink, Report};

/// Identifier of a worker within its pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct WorkerId(usize);

impl WorkerId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// States a worker can be in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    /// Blocked in `claim`, waiting for a request or cancellation
    Waiting = 0,
    /// Running the integration engine on a claimed request
    Processing = 1,
    /// Left its loop; the thread is exiting or has exited
    Terminated = 2,
}

impl WorkerStatus {
    fn from_usize(value: usize) -> Self {
        match value {
            0 => WorkerStatus::Waiting,
            1 => WorkerStatus::Processing,
            _ => WorkerStatus::Terminated,
        }
    }
}

/// Shared, lock-free view of a worker's current status.
#[derive(Debug, Clone)]
pub struct StatusHandle(Arc<AtomicUsize>);

impl StatusHandle {
    fn new() -> Self {
        Self(Arc::new(AtomicUsize::new(WorkerStatus::Waiting as usize)))
    }

    fn store(&self, status: WorkerStatus) {
        self.0.store(status as usize, Ordering::Release);
    }

    pub fn get(&self) -> WorkerStatus {
        WorkerStatus::from_usize(self.0.load(Ordering::Acquire))
    }
}

/// Counts live worker threads. Enlisting increments the counter and the
/// returned guard decrements it when dropped, however the thread ends.
#[derive(Debug)]
pub(crate) struct LiveGuard(Arc<AtomicUsize>);

impl LiveGuard {
    pub(crate) fn enlist(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A pool worker, ready to be spawned onto its own thread.
pub struct Worker {
    id: WorkerId,
    mailbox: Arc<Mailbox>,
    engine: Arc<dyn IntegrationEngine>,
    integrand: Arc<dyn Integrand>,
    sink: Arc<dyn OutputSink>,
    status: StatusHandle,
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("engine", &self.engine.name())
            .field("integrand", &self.integrand.name())
            .field("status", &self.status.get())
            .finish()
    }
}

impl Worker {
    pub fn new(
        id: WorkerId,
        mailbox: Arc<Mailbox>,
        engine: Arc<dyn IntegrationEngine>,
        integrand: Arc<dyn Integrand>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            id,
            mailbox,
            engine,
            integrand,
            sink,
            status: StatusHandle::new(),
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn status(&self) -> StatusHandle {
        self.status.clone()
    }

    /// Starts the worker loop on a new named thread.
    ///
    /// `live` is incremented before the thread starts and decremented when
    /// it exits, including when spawning fails.
    pub fn spawn(self, name: String, live: &Arc<AtomicUsize>) -> io::Result<JoinHandle<()>> {
        let guard = LiveGuard::enlist(live);
        thread::Builder::new().name(name).spawn(move || {
            let _guard = guard;
            self.run();
        })
    }

    /// The worker loop. Returns once the mailbox reports cancellation.
    pub fn run(self) {
        let span = crate::worker_span!(self.id.index());
        let _entered = span.enter();

        self.sink.emit(Report::WorkerStarted { worker: self.id });
        crate::log_worker!(self.id.index(), "started");

        while let Some(request) = self.mailbox.claim() {
            self.status.store(WorkerStatus::Processing);
            let report = self.process(request);
            self.sink.emit(report);
            self.status.store(WorkerStatus::Waiting);
        }

        self.status.store(WorkerStatus::Terminated);
        crate::log_worker!(self.id.index(), "stopped");
        self.sink.emit(Report::WorkerStopped { worker: self.id });
    }

    /// Integrates one claimed request and turns the outcome into a report.
    fn process(&self, request: PendingRequest) -> Report {
        self.sink.emit(Report::ProcessingStarted {
            worker: self.id,
            request,
        });
        crate::log_request!(request.id(), "processing", worker = self.id.index());

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.engine.integrate(
                self.integrand.as_ref(),
                request.lower(),
                request.upper(),
                request.tolerance(),
            )
        }));

        match outcome {
            Ok(Ok(integral)) => {
                crate::log_request!(
                    request.id(),
                    "completed",
                    worker = self.id.index(),
                    evaluations = integral.evaluations,
                    levels = integral.levels
                );
                Report::Completed {
                    worker: self.id,
                    request,
                    value: integral.value,
                    error_estimate: integral.error_estimate,
                }
            }
            Ok(Err(error)) => {
                crate::log_error!(error, worker = self.id.index(), request = %request.id());
                Report::Failed {
                    worker: self.id,
                    request,
                    reason: error.to_string(),
                }
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                crate::log_error!(reason, worker = self.id.index(), request = %request.id(), panicked = true);
                Report::Failed {
                    worker: self.id,
                    request,
                    reason: format!("Engine panicked: {reason}"),
                }
            }
        }
    }
}

/// Extracts the message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::cancel::CancellationToken;
    use crate::thread::sink::ChannelSink;
    use quadrant_api::{EngineError, Integral};

    struct Constant(f64);

    impl IntegrationEngine for Constant {
        fn integrate(
            &self,
            _f: &dyn Integrand,
            _lower: f64,
            _upper: f64,
            tolerance: f64,
        ) -> Result<Integral, EngineError> {
            if tolerance < 0.0 {
                panic!("negative tolerance");
            }
            if tolerance == 0.0 {
                return Err(EngineError::InvalidTolerance(tolerance));
            }
            Ok(Integral::new(self.0, 0.0, 1, 0))
        }
    }

    fn worker(cancel: &CancellationToken) -> (Worker, Arc<Mailbox>, flume::Receiver<Report>) {
        let mailbox = Arc::new(Mailbox::new(cancel.clone()));
        let (sink, rx) = ChannelSink::unbounded();
        let worker = Worker::new(
            WorkerId::new(1),
            Arc::clone(&mailbox),
            Arc::new(Constant(4.0)),
            Arc::new(|x: f64| x),
            Arc::new(sink),
        );
        (worker, mailbox, rx)
    }

    #[test]
    fn drains_ready_request_then_stops() {
        let cancel = CancellationToken::new();
        let (worker, mailbox, rx) = worker(&cancel);
        let request = PendingRequest::new(0.0, 1.0, 1e-9);
        mailbox.publish(request);
        cancel.cancel();

        worker.run();

        let reports: Vec<Report> = rx.drain().collect();
        assert_eq!(reports.len(), 4);
        assert_eq!(reports[0], Report::WorkerStarted { worker: WorkerId::new(1) });
        assert!(matches!(reports[1], Report::ProcessingStarted { request: r, .. } if r == request));
        assert!(matches!(reports[2], Report::Completed { value, .. } if value == 4.0));
        assert_eq!(reports[3], Report::WorkerStopped { worker: WorkerId::new(1) });
    }

    #[test]
    fn engine_error_is_reported_not_fatal() {
        let cancel = CancellationToken::new();
        let (worker, mailbox, rx) = worker(&cancel);
        let status = worker.status();
        let handle = thread::spawn(move || worker.run());

        mailbox.publish(PendingRequest::new(0.0, 1.0, 0.0));
        let failed = rx.iter().find(Report::is_outcome).unwrap();
        assert!(matches!(failed, Report::Failed { ref reason, .. } if reason.contains("Tolerance")));

        mailbox.publish(PendingRequest::new(0.0, 1.0, 1e-3));
        let completed = rx.iter().find(Report::is_outcome).unwrap();
        assert!(matches!(completed, Report::Completed { .. }));

        cancel.cancel();
        mailbox.wake_all();
        handle.join().unwrap();
        assert_eq!(status.get(), WorkerStatus::Terminated);
    }

    #[test]
    fn engine_panic_is_contained() {
        let cancel = CancellationToken::new();
        let (worker, mailbox, rx) = worker(&cancel);
        mailbox.publish(PendingRequest::new(0.0, 1.0, -1.0));
        cancel.cancel();

        worker.run();

        let failed = rx.drain().find(Report::is_outcome).unwrap();
        assert!(matches!(failed, Report::Failed { ref reason, .. } if reason.contains("negative tolerance")));
    }

    #[test]
    fn live_guard_tracks_thread_exit() {
        let live = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let (worker, _mailbox, _rx) = worker(&cancel);
        cancel.cancel();

        let handle = worker.spawn("test-worker".to_string(), &live).unwrap();
        handle.join().unwrap();
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn panic_message_handles_common_payloads() {
        let text: Box<dyn Any + Send> = Box::new("static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(text.as_ref()), "static");
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(other.as_ref()), "unknown panic payload");
    }
}
