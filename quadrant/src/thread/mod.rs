#![doc = " Thread-based integration worker pool for Quadrant."]

pub mod cancel;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod mailbox;
pub mod pool;
pub mod shutdown;
pub mod sink;
pub mod worker;

// Re-export key types for easier usage
pub use cancel::CancellationToken;
pub use config::{PoolConfig, DEFAULT_POOL_SIZE};
pub use dispatcher::Dispatcher;
pub use error::SystemError;
pub use mailbox::Mailbox;
pub use pool::IntegrationPool;
pub use shutdown::{ShutdownCoordinator, ShutdownReport};
pub use sink::{ChannelSink, ConsoleSink, OutputFormat, OutputSink, Report};
pub use worker::{WorkerId, WorkerStatus};
