#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use quadrant::thread::{ChannelSink, IntegrationPool, PoolConfig, Report};
use quadrant::{EngineError, Integrand, IntegrationEngine, Integral, TanhSinh};

/// How long a test waits for a report before giving up.
pub const REPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// Bounds seen by the engine for one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Call {
    pub lower: f64,
    pub upper: f64,
}

/// Engine that announces every call and then blocks until released.
///
/// Lets a test hold a worker inside `Processing` for as long as it needs.
/// Dropping the release sender lets every pending and future call through.
pub struct GatedEngine {
    entered: flume::Sender<Call>,
    release: flume::Receiver<()>,
    inner: TanhSinh,
}

pub struct Gate {
    pub entered: flume::Receiver<Call>,
    pub release: flume::Sender<()>,
}

impl Gate {
    /// Waits until a worker is inside the engine.
    pub fn wait_entered(&self) -> Call {
        self.entered
            .recv_timeout(REPORT_TIMEOUT)
            .expect("no worker entered the engine")
    }

    pub fn open_once(&self) {
        self.release.send(()).expect("engine dropped");
    }
}

impl GatedEngine {
    pub fn new() -> (Self, Gate) {
        let (entered_tx, entered_rx) = flume::unbounded();
        let (release_tx, release_rx) = flume::unbounded();
        (
            Self {
                entered: entered_tx,
                release: release_rx,
                inner: TanhSinh::default(),
            },
            Gate {
                entered: entered_rx,
                release: release_tx,
            },
        )
    }
}

impl IntegrationEngine for GatedEngine {
    fn integrate(
        &self,
        f: &dyn Integrand,
        lower: f64,
        upper: f64,
        tolerance: f64,
    ) -> Result<Integral, EngineError> {
        let _ = self.entered.send(Call { lower, upper });
        let _ = self.release.recv();
        self.inner.integrate(f, lower, upper, tolerance)
    }
}

/// Engine that panics whenever the lower bound is negative.
pub struct PanickyEngine;

impl IntegrationEngine for PanickyEngine {
    fn integrate(
        &self,
        f: &dyn Integrand,
        lower: f64,
        upper: f64,
        tolerance: f64,
    ) -> Result<Integral, EngineError> {
        if lower < 0.0 {
            panic!("lower bound {lower} is negative");
        }
        TanhSinh::default().integrate(f, lower, upper, tolerance)
    }
}

pub fn linear() -> Arc<dyn Integrand> {
    Arc::new(|x: f64| 2.0 * x)
}

/// Starts a pool whose reports go to the returned receiver.
pub fn start_pool(
    workers: usize,
    engine: Arc<dyn IntegrationEngine>,
) -> (IntegrationPool, flume::Receiver<Report>) {
    quadrant::logging::init_test();
    let (sink, rx) = ChannelSink::unbounded();
    let pool = IntegrationPool::start(
        PoolConfig::default().with_pool_size(workers),
        engine,
        linear(),
        Arc::new(sink),
    )
    .expect("pool should start");
    (pool, rx)
}

/// Blocks until the next completed or failed report.
pub fn next_outcome(rx: &flume::Receiver<Report>) -> Report {
    loop {
        let report = rx.recv_timeout(REPORT_TIMEOUT).expect("timed out waiting for an outcome");
        if report.is_outcome() {
            return report;
        }
    }
}

pub fn outcomes(reports: &[Report]) -> Vec<&Report> {
    reports.iter().filter(|report| report.is_outcome()).collect()
}

pub fn completed_value(report: &Report) -> f64 {
    match report {
        Report::Completed { value, .. } => *value,
        other => panic!("expected a completed report, got {other:?}"),
    }
}
