//! Event values and the identifiers attached to registrations.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::order::Order;

/// A value that can be posted through an
/// [`EventDispatcher`](crate::EventDispatcher).
///
/// Every delivery hands a listener its own clone of the posted event. State
/// that listeners are expected to change, cancellation in particular, must
/// therefore live behind shared ownership (for example an
/// `Arc<AtomicBool>`) so that the poster observes it after `post` returns.
pub trait Event: Clone + Send + 'static {
    /// Returns `true` once a listener has cancelled this event.
    ///
    /// Events that cannot be cancelled keep the default.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// The component on whose behalf listeners are registered.
///
/// All registrations of one owner can be dropped together with
/// [`EventDispatcher::unregister_owner`](crate::EventDispatcher::unregister_owner).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Creates an owner identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for OwnerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&OwnerId> for OwnerId {
    fn from(id: &OwnerId) -> Self {
        id.clone()
    }
}

/// Handle to one listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The key selecting one dispatcher node for an event type.
///
/// `before_modifications` listeners observe the event before any
/// regular-phase listener has had a chance to change it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Position within the phase.
    #[serde(default)]
    pub order: Order,

    /// Whether the node belongs to the before-modifications phase.
    #[serde(default)]
    pub before_modifications: bool,
}

impl FlowConfig {
    /// Creates a config for the given order and phase.
    pub fn new(order: Order, before_modifications: bool) -> Self {
        Self {
            order,
            before_modifications,
        }
    }

    /// Returns a copy with `order` replaced.
    pub fn with_order(self, order: Order) -> Self {
        Self { order, ..self }
    }

    /// Returns a copy with the phase replaced.
    pub fn with_before_modifications(self, before_modifications: bool) -> Self {
        Self {
            before_modifications,
            ..self
        }
    }
}
