//! Error types for value construction.

/// Errors raised when an [`Either`](crate::Either) is built from two optional
/// halves that do not describe exactly one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EitherError {
    /// Both the left and the right side were populated.
    #[error("either requires exactly one side, but both left and right were present")]
    BothPresent,

    /// Neither side was populated.
    #[error("either requires exactly one side, but neither left nor right was present")]
    NeitherPresent,
}
