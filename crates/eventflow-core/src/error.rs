//! Error types for flow delivery and executor setup.

/// Errors reported by flow nodes and executors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    /// One or more subscribers panicked while a value was delivered.
    ///
    /// Every subscriber was still invoked; `failed` of the `notified`
    /// subscribers panicked. `first_panic` carries the first panic message.
    #[error("{failed} of {notified} subscribers panicked during push: {first_panic}")]
    SubscriberPanicked {
        /// Number of subscribers that panicked.
        failed: usize,
        /// Number of subscribers the value was handed to.
        notified: usize,
        /// Message of the first panic observed.
        first_panic: String,
    },

    /// An executor that needs a tokio runtime was created outside of one.
    #[error("no tokio runtime available: {0}")]
    NoRuntime(String),
}
