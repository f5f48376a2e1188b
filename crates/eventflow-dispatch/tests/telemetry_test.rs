//! Global tracing initialisation.

use eventflow_dispatch::config::LoggingConfig;
use eventflow_dispatch::telemetry::init_tracing;
use eventflow_dispatch::TelemetryError;

#[test]
fn test_second_initialisation_is_reported() {
    let config = LoggingConfig {
        level: "not a [valid filter".to_string(),
        json: true,
    };
    init_tracing(&config).expect("first initialisation should succeed");

    let err = init_tracing(&LoggingConfig::default()).expect_err("second should fail");
    assert!(matches!(err, TelemetryError::AlreadyInitialized(_)));
}
