//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::TelemetryError;

/// Installs the global tracing subscriber described by `config`.
///
/// An invalid filter falls back to `info` and is reported once the
/// subscriber is running.
///
/// # Errors
///
/// Returns [`TelemetryError::AlreadyInitialized`] if a global subscriber is
/// already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let (filter, invalid) = match EnvFilter::try_new(&config.level) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new("info"), Some(e)),
    };

    let installed = if config.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };
    installed.map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    if let Some(e) = invalid {
        tracing::warn!(level = %config.level, error = %e, "invalid log filter, using info");
    }
    tracing::debug!(json = config.json, "tracing initialised");
    Ok(())
}
