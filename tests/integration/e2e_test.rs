//! End-to-end integration tests

use poly_copy::config::{Config, ExecutionMode};

#[test]
fn test_example_config_loads() {
    // The bundled example is also the fallback default in main
    let toml = include_str!("../../config.toml.example");
    let config: Config = toml::from_str(toml).unwrap();

    assert_eq!(config.execution.mode, ExecutionMode::Paper);
    assert_eq!(config.monitor.fetch_interval_secs, 1);
    assert_eq!(config.dedup.ttl_seconds, 60);
    assert!(config.validate().is_ok());
}
