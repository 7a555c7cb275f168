// Integration tests for config types in quadrant::thread::config

use quadrant::thread::config::*;
use quadrant::thread::SystemError;

#[test]
fn test_pool_config_defaults() {
    let config = PoolConfig::default();

    assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
    assert_eq!(config.pool_size, 10);
    assert_eq!(config.thread_name_prefix, DEFAULT_THREAD_NAME_PREFIX);
    assert!(config.validate().is_ok());
}

#[test]
fn test_available_parallelism() {
    let config = PoolConfig::with_available_parallelism();
    assert_eq!(config.pool_size, num_cpus::get());
    assert!(config.validate().is_ok());
}

#[test]
fn test_builder_overrides() {
    let config = PoolConfig::default()
        .with_pool_size(3)
        .with_thread_name_prefix("integrator");
    assert_eq!(config.pool_size, 3);
    assert_eq!(config.thread_name_prefix, "integrator");
}

#[test]
fn test_validation_rejects_bad_values() {
    let empty_pool = PoolConfig::default().with_pool_size(0);
    assert!(matches!(empty_pool.validate(), Err(SystemError::ConfigError(_))));

    let blank_prefix = PoolConfig::default().with_thread_name_prefix("  ");
    assert!(matches!(blank_prefix.validate(), Err(SystemError::ConfigError(_))));
}

#[test]
fn test_config_debug_format() {
    let config = PoolConfig::default();
    assert!(format!("{:?}", config).contains("pool_size"));
}
