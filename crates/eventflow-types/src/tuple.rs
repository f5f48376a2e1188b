//! Ordered pair of values.

use serde::{Deserialize, Serialize};

/// An ordered pair with both slots always populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tuple<A, B> {
    first: A,
    second: B,
}

impl<A, B> Tuple<A, B> {
    /// Creates a pair from its two components.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Borrows the first component.
    pub fn first(&self) -> &A {
        &self.first
    }

    /// Borrows the second component.
    pub fn second(&self) -> &B {
        &self.second
    }

    /// Consumes the pair, returning a native tuple.
    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }

    /// Exchanges the two components.
    pub fn swap(self) -> Tuple<B, A> {
        Tuple::new(self.second, self.first)
    }
}

impl<A, B> From<(A, B)> for Tuple<A, B> {
    fn from((first, second): (A, B)) -> Self {
        Self::new(first, second)
    }
}

impl<A, B> From<Tuple<A, B>> for (A, B) {
    fn from(tuple: Tuple<A, B>) -> Self {
        tuple.into_inner()
    }
}
