//! The operator control loop.
//!
//! Reads one line at a time, turns valid lines into submissions and ends
//! the pool on `quit` or end of input. Malformed lines are reported back to
//! the operator and never reach the mailbox.

use std::io::BufRead;
use std::sync::Arc;

use anyhow::Context;
use tracing::warn;

use crate::input::{Command, parse_bytes};
use crate::thread::{IntegrationPool, OutputSink, Report, ShutdownReport};

/// What happened during a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Requests handed to the dispatcher, superseded ones included.
    pub submitted: u64,
    /// Lines rejected as malformed.
    pub rejected: u64,
    /// `true` for an explicit `quit`, `false` when input simply ended.
    pub quit_requested: bool,
    pub shutdown: ShutdownReport,
}

pub struct Session {
    pool: IntegrationPool,
    sink: Arc<dyn OutputSink>,
    integrand: String,
}

impl Session {
    /// `integrand` is the description shown in the greeting.
    pub fn new(pool: IntegrationPool, sink: Arc<dyn OutputSink>, integrand: impl Into<String>) -> Self {
        Self {
            pool,
            sink,
            integrand: integrand.into(),
        }
    }

    /// Runs until `quit` or end of input, then drains the pool.
    pub fn run<R: BufRead>(mut self, mut reader: R) -> anyhow::Result<SessionSummary> {
        self.sink.emit(Report::Greeting {
            integrand: self.integrand.clone(),
            workers: self.pool.pool_size(),
        });

        let mut rejected = 0;
        let mut quit_requested = false;

        let mut raw = Vec::new();
        loop {
            raw.clear();
            let read = reader
                .read_until(b'\n', &mut raw)
                .context("failed to read operator input")?;
            if read == 0 {
                break;
            }
            match parse_bytes(&raw) {
                Ok(Command::Submit(request)) => self.pool.submit(request),
                Ok(Command::Quit) => {
                    quit_requested = true;
                    break;
                }
                Err(e) => {
                    rejected += 1;
                    let line = String::from_utf8_lossy(&raw)
                        .trim_end_matches(['\n', '\r'])
                        .to_string();
                    warn!(line = %line, error = %e, "malformed input");
                    self.sink.emit(Report::MalformedInput {
                        line,
                        reason: e.to_string(),
                    });
                }
            }
        }

        crate::log_system!("session", "ending", quit_requested = quit_requested);
        let submitted = self.pool.submitted();
        let shutdown = self.pool.shutdown();
        self.sink.emit(Report::Goodbye);

        Ok(SessionSummary {
            submitted,
            rejected,
            quit_requested,
            shutdown,
        })
    }
}
