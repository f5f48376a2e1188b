//! Environment overrides for configuration.
//!
//! Kept to a single test so no other test in this binary observes the
//! variables.

use std::io::Write;

use eventflow_dispatch::config::{load_config, PanicPolicy};
use eventflow_dispatch::Order;

#[test]
fn test_environment_overrides_file_values() {
    let mut file = tempfile::NamedTempFile::new().expect("should create temp file");
    file.write_all(b"[dispatch]\npanic_policy = \"log\"\ndefault_order = \"FIRST\"\n")
        .expect("should write config");
    let path = file.path().to_str();

    std::env::set_var("EVENTFLOW_PANIC_POLICY", "propagate");
    std::env::set_var("EVENTFLOW_DEFAULT_ORDER", "late");
    std::env::set_var("EVENTFLOW_LOG_LEVEL", "debug");
    std::env::set_var("EVENTFLOW_LOG_JSON", "1");

    let config = load_config(path).expect("should load");
    assert_eq!(config.dispatch.panic_policy, PanicPolicy::Propagate);
    assert_eq!(config.dispatch.default_order, Order::Late);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);

    // Unparseable values leave the file's settings in place.
    std::env::set_var("EVENTFLOW_PANIC_POLICY", "explode");
    std::env::set_var("EVENTFLOW_DEFAULT_ORDER", "whenever");

    let config = load_config(path).expect("should load");
    assert_eq!(config.dispatch.panic_policy, PanicPolicy::Log);
    assert_eq!(config.dispatch.default_order, Order::First);

    for key in [
        "EVENTFLOW_PANIC_POLICY",
        "EVENTFLOW_DEFAULT_ORDER",
        "EVENTFLOW_LOG_LEVEL",
        "EVENTFLOW_LOG_JSON",
    ] {
        std::env::remove_var(key);
    }
}
