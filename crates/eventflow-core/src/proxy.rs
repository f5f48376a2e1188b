//! Flows that delegate to a resolved underlying node.

use std::sync::Arc;

use crate::callback_flow::CallbackFlow;
use crate::flow::Flow;

/// A flow handle that forwards every contract operation to an underlying
/// [`CallbackFlow`].
///
/// Implementors provide [`resolve`](ProxyFlow::resolve) and receive the full
/// [`Flow`] contract: subscriptions land on the resolved node, the last value
/// is read from it, and every operator is wired to it. This lets a long-lived
/// handle keep a stable identity while the node it stands for is built
/// lazily.
///
/// `resolve` must return the same node on every call for a given instance
/// state, otherwise subscriptions scatter across throwaway nodes.
/// [`CallbackFlow`] itself resolves to `self`.
pub trait ProxyFlow<A: Clone + Send + 'static>: Send + Sync {
    /// Returns the node this handle currently stands for.
    fn resolve(&self) -> &CallbackFlow<A>;
}

impl<A, P> Flow<A> for P
where
    A: Clone + Send + 'static,
    P: ProxyFlow<A>,
{
    fn subscribe_with<F>(&self, callback: F, replay_last: bool)
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        self.resolve().attach(Arc::new(callback), replay_last);
    }

    fn last_value(&self) -> Option<A> {
        self.resolve().cached()
    }
}
