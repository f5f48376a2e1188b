//! Dispatcher configuration loading from file and environment variables.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::order::Order;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Dispatcher behaviour.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// What [`EventDispatcher::post`](crate::EventDispatcher::post) does when a
/// listener panics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanicPolicy {
    /// Log a warning and report success.
    #[default]
    Log,
    /// Finish delivery, then return
    /// [`DispatchError::ListenerPanicked`](crate::DispatchError::ListenerPanicked).
    Propagate,
}

impl std::str::FromStr for PanicPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "propagate" => Ok(Self::Propagate),
            _ => Err(format!("unknown panic policy: {s}")),
        }
    }
}

/// Dispatcher settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DispatchConfig {
    /// Listener panic handling in `post`.
    #[serde(default)]
    pub panic_policy: PanicPolicy,

    /// Order used by `register` and `flow` when none is given.
    #[serde(default)]
    pub default_order: Order,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "eventflow_core=trace,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `EVENTFLOW_PANIC_POLICY` overrides `dispatch.panic_policy` ("log" or "propagate")
/// - `EVENTFLOW_DEFAULT_ORDER` overrides `dispatch.default_order` (e.g. "LATE")
/// - `EVENTFLOW_LOG_LEVEL` overrides `logging.level`
/// - `EVENTFLOW_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// Unparseable override values are ignored with a warning.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    if let Ok(policy) = std::env::var("EVENTFLOW_PANIC_POLICY") {
        match policy.parse::<PanicPolicy>() {
            Ok(parsed) => config.dispatch.panic_policy = parsed,
            Err(e) => tracing::warn!(error = %e, "ignoring EVENTFLOW_PANIC_POLICY"),
        }
    }
    if let Ok(order) = std::env::var("EVENTFLOW_DEFAULT_ORDER") {
        match order.parse::<Order>() {
            Ok(parsed) => config.dispatch.default_order = parsed,
            Err(e) => tracing::warn!(error = %e, "ignoring EVENTFLOW_DEFAULT_ORDER"),
        }
    }
    if let Ok(level) = std::env::var("EVENTFLOW_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("EVENTFLOW_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok(config)
}
