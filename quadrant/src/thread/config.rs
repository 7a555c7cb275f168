use crate::thread::error::SystemError;

/// Number of worker threads when nothing else is configured.
pub const DEFAULT_POOL_SIZE: usize = 10;

pub const DEFAULT_THREAD_NAME_PREFIX: &str = "quadrant-worker";

/// Configuration for an `IntegrationPool`.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// The number of worker threads. Fixed for the lifetime of the pool.
    pub pool_size: usize,

    /// Worker threads are named `<prefix>-<id>`.
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl PoolConfig {
    /// One worker per available CPU.
    pub fn with_available_parallelism() -> Self {
        Self {
            pool_size: num_cpus::get(),
            ..Default::default()
        }
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    pub fn validate(&self) -> Result<(), SystemError> {
        if self.pool_size == 0 {
            return Err(SystemError::ConfigError(
                "pool_size must be at least 1".to_string(),
            ));
        }
        if self.thread_name_prefix.trim().is_empty() {
            return Err(SystemError::ConfigError(
                "thread_name_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn thread_name(&self, index: usize) -> String {
        format!("{}-{}", self.thread_name_prefix, index)
    }
}
