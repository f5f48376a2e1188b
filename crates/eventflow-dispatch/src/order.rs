//! Listener priority within a dispatch phase.

use serde::{Deserialize, Serialize};

/// Position of a listener in the delivery sequence of one phase.
///
/// Variants are declared in delivery order, so the derived `Ord` is the order
/// in which [`EventDispatcher::post`](crate::EventDispatcher::post) visits
/// nodes. `Pre` listeners run first and are meant for observing or
/// cancelling early; `Post` listeners run last and should only observe the
/// final outcome.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Order {
    /// Runs before everything else.
    Pre,
    /// Runs right after `Pre`.
    AfterPre,
    /// First of the regular slots.
    First,
    /// Before the default slot.
    Early,
    /// The default slot.
    #[default]
    Default,
    /// After the default slot.
    Late,
    /// Last of the regular slots.
    Last,
    /// Runs right before `Post`.
    BeforePost,
    /// Runs after everything else.
    Post,
}

impl Order {
    /// Every order, in delivery sequence.
    pub const ALL: [Order; 9] = [
        Self::Pre,
        Self::AfterPre,
        Self::First,
        Self::Early,
        Self::Default,
        Self::Late,
        Self::Last,
        Self::BeforePost,
        Self::Post,
    ];

    /// Returns the canonical string label for this order.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pre => "PRE",
            Self::AfterPre => "AFTER_PRE",
            Self::First => "FIRST",
            Self::Early => "EARLY",
            Self::Default => "DEFAULT",
            Self::Late => "LATE",
            Self::Last => "LAST",
            Self::BeforePost => "BEFORE_POST",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Order {
    type Err = ParseOrderError;

    /// Parses a label case-insensitively, so `late` and `LATE` are equal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|order| order.as_str() == label)
            .ok_or_else(|| ParseOrderError(s.to_string()))
    }
}

/// Error returned when parsing an unknown order label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOrderError(pub String);

impl std::fmt::Display for ParseOrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown order: {}", self.0)
    }
}

impl std::error::Error for ParseOrderError {}
