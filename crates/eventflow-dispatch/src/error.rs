//! Error types for dispatching, configuration loading, and tracing setup.

use thiserror::Error;

/// Errors returned by [`EventDispatcher::post`](crate::EventDispatcher::post).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// One or more listeners panicked while an event was being delivered.
    ///
    /// Only produced under [`PanicPolicy::Propagate`](crate::config::PanicPolicy).
    /// Every node registered for the event was still notified.
    #[error("{failed} listener(s) panicked while handling {event}: {first_panic}")]
    ListenerPanicked {
        /// Type name of the posted event.
        event: &'static str,
        /// Number of listener invocations that panicked, across all nodes.
        ///
        /// An [`EventFlow`](crate::EventFlow) counts once per post, however
        /// many of its subscribers panicked.
        failed: usize,
        /// Message of the first panic observed.
        first_panic: String,
    },
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors from [`init_tracing`](crate::telemetry::init_tracing).
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed.
    #[error("tracing subscriber already initialised: {0}")]
    AlreadyInitialized(String),
}
