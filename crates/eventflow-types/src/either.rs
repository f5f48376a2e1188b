//! Disjoint union of two values.

use serde::{Deserialize, Serialize};

use crate::error::EitherError;

/// A value that is exactly one of a left `A` or a right `B`.
///
/// The two variants are the only construction paths, so an `Either` holding
/// both sides or neither cannot exist. Code that receives the halves as
/// optionals (decoded payloads, legacy call sites) goes through
/// [`Either::from_options`], which rejects the invalid shapes.
///
/// Combinators are right-biased: [`map`](Either::map),
/// [`flat_map`](Either::flat_map) and [`to_option`](Either::to_option) act on
/// the right side and pass a left value through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Either<A, B> {
    /// The value came from the left source.
    Left(A),
    /// The value came from the right source.
    Right(B),
}

impl<A, B> Either<A, B> {
    /// Wraps a left value.
    pub fn left(value: A) -> Self {
        Self::Left(value)
    }

    /// Wraps a right value.
    pub fn right(value: B) -> Self {
        Self::Right(value)
    }

    /// Builds an `Either` from two optional halves.
    ///
    /// # Errors
    ///
    /// Returns [`EitherError::BothPresent`] when both halves are `Some` and
    /// [`EitherError::NeitherPresent`] when both are `None`.
    pub fn from_options(left: Option<A>, right: Option<B>) -> Result<Self, EitherError> {
        match (left, right) {
            (Some(a), None) => Ok(Self::Left(a)),
            (None, Some(b)) => Ok(Self::Right(b)),
            (Some(_), Some(_)) => Err(EitherError::BothPresent),
            (None, None) => Err(EitherError::NeitherPresent),
        }
    }

    /// Returns `true` if this is a left value.
    pub fn is_left(&self) -> bool {
        matches!(self, Self::Left(_))
    }

    /// Returns `true` if this is a right value.
    pub fn is_right(&self) -> bool {
        matches!(self, Self::Right(_))
    }

    /// Borrows the left value, if any.
    pub fn get_left(&self) -> Option<&A> {
        match self {
            Self::Left(a) => Some(a),
            Self::Right(_) => None,
        }
    }

    /// Borrows the right value, if any.
    pub fn get_right(&self) -> Option<&B> {
        match self {
            Self::Left(_) => None,
            Self::Right(b) => Some(b),
        }
    }

    /// Consumes the `Either`, returning the left value if present.
    pub fn into_left(self) -> Option<A> {
        match self {
            Self::Left(a) => Some(a),
            Self::Right(_) => None,
        }
    }

    /// Consumes the `Either`, returning the right value if present.
    pub fn into_right(self) -> Option<B> {
        match self {
            Self::Left(_) => None,
            Self::Right(b) => Some(b),
        }
    }

    /// Right-biased conversion to `Option`.
    pub fn to_option(self) -> Option<B> {
        self.into_right()
    }

    /// Maps the right value, passing a left value through.
    pub fn map<C, F>(self, f: F) -> Either<A, C>
    where
        F: FnOnce(B) -> C,
    {
        match self {
            Self::Left(a) => Either::Left(a),
            Self::Right(b) => Either::Right(f(b)),
        }
    }

    /// Maps the left value, passing a right value through.
    pub fn map_left<C, F>(self, f: F) -> Either<C, B>
    where
        F: FnOnce(A) -> C,
    {
        match self {
            Self::Left(a) => Either::Left(f(a)),
            Self::Right(b) => Either::Right(b),
        }
    }

    /// Chains a right value into another `Either` sharing the same left type.
    pub fn flat_map<C, F>(self, f: F) -> Either<A, C>
    where
        F: FnOnce(B) -> Either<A, C>,
    {
        match self {
            Self::Left(a) => Either::Left(a),
            Self::Right(b) => f(b),
        }
    }

    /// Exchanges the two sides.
    pub fn swap(self) -> Either<B, A> {
        match self {
            Self::Left(a) => Either::Right(a),
            Self::Right(b) => Either::Left(b),
        }
    }

    /// Collapses both sides into a single value.
    pub fn either<C>(self, on_left: impl FnOnce(A) -> C, on_right: impl FnOnce(B) -> C) -> C {
        match self {
            Self::Left(a) => on_left(a),
            Self::Right(b) => on_right(b),
        }
    }
}
