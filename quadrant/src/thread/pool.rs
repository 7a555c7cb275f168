use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use quadrant_api::{Integrand, IntegrationEngine, PendingRequest};

use crate::thread::cancel::CancellationToken;
use crate::thread::config::PoolConfig;
use crate::thread::dispatcher::Dispatcher;
use crate::thread::error::SystemError;
use crate::thread::mailbox::Mailbox;
use crate::thread::shutdown::{ShutdownCoordinator, ShutdownReport};
use crate::thread::sink::OutputSink;
use crate::thread::worker::{StatusHandle, Worker, WorkerId, WorkerStatus};

/// A fixed set of worker threads competing for a single-slot mailbox.
///
/// # Thread Safety
/// - The mailbox is the only shared mutable state between the dispatcher and
///   the workers; the output sink serializes its own writes
/// - No lock is held while the engine runs
///
/// # Lifecycle
/// 1. `start` spawns `pool_size` workers, each waiting on the mailbox
/// 2. `submit` publishes a request and wakes one worker
/// 3. `shutdown` cancels, wakes every worker and joins them all
///
/// Dropping a pool that was not shut down explicitly shuts it down.
pub struct IntegrationPool {
    mailbox: Arc<Mailbox>,
    dispatcher: Dispatcher,
    coordinator: Option<ShutdownCoordinator>,
    statuses: Vec<StatusHandle>,
    live: Arc<AtomicUsize>,
    engine_name: String,
    integrand_name: String,
}

impl IntegrationPool {
    /// Spawns the worker threads and returns once all of them exist.
    pub fn start(
        config: PoolConfig,
        engine: Arc<dyn IntegrationEngine>,
        integrand: Arc<dyn Integrand>,
        sink: Arc<dyn OutputSink>,
    ) -> Result<Self, SystemError> {
        config.validate()?;

        let mailbox = Arc::new(Mailbox::new(CancellationToken::new()));
        let live = Arc::new(AtomicUsize::new(0));
        let mut coordinator = ShutdownCoordinator::new(Arc::clone(&mailbox));
        let mut statuses = Vec::with_capacity(config.pool_size);

        for index in 0..config.pool_size {
            let id = WorkerId::new(index);
            let worker = Worker::new(
                id,
                Arc::clone(&mailbox),
                Arc::clone(&engine),
                Arc::clone(&integrand),
                Arc::clone(&sink),
            );
            statuses.push(worker.status());

            match worker.spawn(config.thread_name(index), &live) {
                Ok(handle) => coordinator.register(id, handle),
                Err(e) => {
                    crate::log_error!(e, operation = "pool_startup", worker = index);
                    coordinator.drain();
                    return Err(SystemError::ThreadSetupError {
                        worker: index,
                        source: e,
                    });
                }
            }
        }

        crate::log_system!(
            "pool_startup",
            "completed",
            workers = config.pool_size,
            engine = engine.name(),
            integrand = integrand.name()
        );

        Ok(Self {
            dispatcher: Dispatcher::new(Arc::clone(&mailbox)),
            mailbox,
            coordinator: Some(coordinator),
            statuses,
            live,
            engine_name: engine.name().to_string(),
            integrand_name: integrand.name().to_string(),
        })
    }

    /// Hands a request to the pool. Never blocks beyond the mailbox lock.
    pub fn submit(&mut self, request: PendingRequest) {
        self.dispatcher.submit(request);
    }

    /// Cancels the pool and waits for every worker to finish.
    pub fn shutdown(mut self) -> ShutdownReport {
        self.coordinator
            .take()
            .map(ShutdownCoordinator::shutdown)
            .unwrap_or_default()
    }

    pub fn pool_size(&self) -> usize {
        self.statuses.len()
    }

    /// Number of worker threads that have not exited yet.
    pub fn live_workers(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// A handle that keeps reporting the live worker count after the pool
    /// itself has been consumed by `shutdown`.
    pub fn live_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.live)
    }

    pub fn statuses(&self) -> Vec<WorkerStatus> {
        self.statuses.iter().map(StatusHandle::get).collect()
    }

    pub fn mailbox(&self) -> &Arc<Mailbox> {
        &self.mailbox
    }

    pub fn submitted(&self) -> u64 {
        self.dispatcher.submitted()
    }

    pub fn integrand_name(&self) -> &str {
        &self.integrand_name
    }
}

impl Drop for IntegrationPool {
    fn drop(&mut self) {
        if let Some(mut coordinator) = self.coordinator.take() {
            coordinator.drain();
        }
    }
}

impl fmt::Debug for IntegrationPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationPool")
            .field("pool_size", &self.statuses.len())
            .field("live_workers", &self.live_workers())
            .field("engine", &self.engine_name)
            .field("integrand", &self.integrand_name)
            .field("mailbox", &self.mailbox)
            .finish()
    }
}
