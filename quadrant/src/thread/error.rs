use std::io;

use thiserror::Error;

/// Failures while configuring or starting the worker pool.
///
/// Nothing in here describes a failed integration: those are reported to
/// the operator and never surface as errors from the pool itself.
#[derive(Error, Debug)]
pub enum SystemError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// The OS refused to create a worker thread. Workers spawned before it
    /// have already been drained.
    #[error("Thread setup error: could not spawn worker {worker}: {source}")]
    ThreadSetupError {
        worker: usize,
        #[source]
        source: io::Error,
    },
    #[error("Internal system error: {0}")]
    Other(#[from] anyhow::Error),
}
