//! # Output Sink
//!
//! Everything the operator sees goes through an [`OutputSink`]: worker
//! lifecycle announcements, results, failures and input diagnostics. Sinks
//! are shared by every worker, so an implementation must write each report
//! as one unit that never interleaves with another.

use std::fmt;
use std::io::{self, Stdout, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use clap::ValueEnum;
use quadrant_api::PendingRequest;
use serde::Serialize;
use tracing::warn;

use crate::thread::worker::WorkerId;

/// Significant digits used when rendering a computed integral.
pub const RESULT_SIGNIFICANT_DIGITS: usize = 15;

/// A message for the operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Report {
    /// Usage banner printed once when a session starts.
    Greeting { integrand: String, workers: usize },
    WorkerStarted { worker: WorkerId },
    ProcessingStarted { worker: WorkerId, request: PendingRequest },
    Completed {
        worker: WorkerId,
        request: PendingRequest,
        value: f64,
        error_estimate: f64,
    },
    Failed {
        worker: WorkerId,
        request: PendingRequest,
        reason: String,
    },
    WorkerStopped { worker: WorkerId },
    MalformedInput { line: String, reason: String },
    Goodbye,
}

impl Report {
    /// The worker this report belongs to, if any.
    pub fn worker(&self) -> Option<WorkerId> {
        match self {
            Report::WorkerStarted { worker }
            | Report::ProcessingStarted { worker, .. }
            | Report::Completed { worker, .. }
            | Report::Failed { worker, .. }
            | Report::WorkerStopped { worker } => Some(*worker),
            _ => None,
        }
    }

    /// Whether this report is the final outcome of a claimed request.
    pub fn is_outcome(&self) -> bool {
        matches!(self, Report::Completed { .. } | Report::Failed { .. })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Greeting { integrand, workers } => {
                writeln!(f, "Hello! Let's start. Integrating f(x) = {integrand} on {workers} worker threads.")?;
                writeln!(f, "Input data format: lower_limit upper_limit error_limit")?;
                writeln!(f, "Example: 1.5 2 1.2e-6")?;
                write!(f, "To quit type \"quit\"")
            }
            Report::WorkerStarted { worker } => write!(f, "Worker {worker}: started"),
            Report::ProcessingStarted { worker, request } => {
                write!(f, "Worker {worker}: data received {request}. Start processing...")
            }
            Report::Completed { worker, value, .. } => write!(
                f,
                "Worker {worker}: processing complete. Answer is: {}",
                format_significant(*value, RESULT_SIGNIFICANT_DIGITS)
            ),
            Report::Failed { worker, reason, .. } => {
                write!(f, "Worker {worker}: computation failed. {reason}")
            }
            Report::WorkerStopped { worker } => {
                write!(f, "Worker {worker}: quitting due to shutdown")
            }
            Report::MalformedInput { reason, .. } => write!(
                f,
                "Data is incorrect ({reason}). Try again, please. Example: 1.5 2 1.2e-6"
            ),
            Report::Goodbye => write!(f, "Goodbye!"),
        }
    }
}

/// Renders `value` with `digits` significant digits, switching to
/// scientific notation for very large or very small magnitudes.
pub fn format_significant(value: f64, digits: usize) -> String {
    let digits = digits.max(1);
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return format!("{:.*}", digits - 1, value);
    }
    let exponent = value.abs().log10().floor() as i32;
    if exponent < -5 || exponent >= digits as i32 {
        format!("{:.*e}", digits - 1, value)
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        format!("{:.*}", decimals, value)
    }
}

/// Destination for operator reports. Shared by every worker thread.
pub trait OutputSink: Send + Sync {
    fn emit(&self, report: Report);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Writes reports to any `Write` implementation, one whole report per lock.
pub struct ConsoleSink<W: Write + Send> {
    out: Mutex<W>,
    format: OutputFormat,
}

impl ConsoleSink<Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out: Mutex::new(out),
            format,
        }
    }

    /// Locks the underlying writer.
    pub fn writer(&self) -> MutexGuard<'_, W> {
        self.out.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn render(&self, report: &Report) -> io::Result<String> {
        match self.format {
            OutputFormat::Text => Ok(report.to_string()),
            OutputFormat::Json => serde_json::to_string(report).map_err(io::Error::other),
        }
    }
}

impl<W: Write + Send> OutputSink for ConsoleSink<W> {
    fn emit(&self, report: Report) {
        let result = self.render(&report).and_then(|line| {
            let mut out = self.writer();
            writeln!(out, "{line}")?;
            out.flush()
        });
        if let Err(e) = result {
            warn!(error = %e, "failed to write report");
        }
    }
}

impl<W: Write + Send> fmt::Debug for ConsoleSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("format", &self.format)
            .finish()
    }
}

/// Forwards reports over a channel, for embedding the pool in another
/// program or observing it from tests.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: flume::Sender<Report>,
}

impl ChannelSink {
    pub fn new(tx: flume::Sender<Report>) -> Self {
        Self { tx }
    }

    pub fn unbounded() -> (Self, flume::Receiver<Report>) {
        let (tx, rx) = flume::unbounded();
        (Self::new(tx), rx)
    }
}

impl OutputSink for ChannelSink {
    fn emit(&self, report: Report) {
        // A dropped receiver only means nobody is listening any more.
        let _ = self.tx.send(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn significant_digits_fixed_range() {
        assert_eq!(format_significant(1.0, 15), "1.00000000000000");
        assert_eq!(format_significant(1.0 / 3.0, 15), "0.333333333333333");
        assert_eq!(format_significant(12345.678, 15), "12345.6780000000");
        assert_eq!(format_significant(0.0, 15), "0.00000000000000");
    }

    #[test]
    fn significant_digits_scientific_range() {
        assert_eq!(format_significant(1.5e-7, 15), "1.50000000000000e-7");
        assert_eq!(format_significant(-2.5e20, 15), "-2.50000000000000e20");
    }

    #[test]
    fn significant_digits_non_finite() {
        assert_eq!(format_significant(f64::INFINITY, 15), "inf");
        assert_eq!(format_significant(f64::NAN, 15), "NaN");
    }

    #[test]
    fn completed_report_renders_full_precision() {
        let request = PendingRequest::new(0.0, 1.0, 1e-9);
        let report = Report::Completed {
            worker: WorkerId::new(3),
            request,
            value: 2.0 / 3.0,
            error_estimate: 1e-12,
        };
        assert_eq!(
            report.to_string(),
            "Worker 3: processing complete. Answer is: 0.666666666666667"
        );
    }

    #[test]
    fn console_sink_writes_one_line_per_report() {
        let sink = ConsoleSink::new(Vec::new(), OutputFormat::Text);
        sink.emit(Report::WorkerStarted { worker: WorkerId::new(0) });
        sink.emit(Report::Goodbye);
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "Worker 0: started\nGoodbye!\n");
    }

    #[test]
    fn console_sink_json_lines_are_tagged() {
        let sink = ConsoleSink::new(Vec::new(), OutputFormat::Json);
        sink.emit(Report::WorkerStopped { worker: WorkerId::new(7) });
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["event"], "worker_stopped");
        assert_eq!(value["worker"], 7);
    }

    #[test]
    fn channel_sink_survives_dropped_receiver() {
        let (sink, rx) = ChannelSink::unbounded();
        drop(rx);
        sink.emit(Report::Goodbye);
    }
}
