//! Value types shared by the event-flow crates.
//!
//! This crate holds the two data-model leaves produced by the flow algebra:
//!
//! - [`Either`]: a disjoint union tagging which of two sources a value came
//!   from. Emitted by `Flow::choose`.
//! - [`Tuple`]: an ordered pair whose slots are always populated. Emitted by
//!   `Flow::zip`.
//!
//! Neither type knows anything about flows; `eventflow-core` depends on this
//! crate, never the other way round.

mod either;
mod error;
mod tuple;

pub use either::Either;
pub use error::EitherError;
pub use tuple::Tuple;
