//! The concrete multicast flow node.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};

use crate::error::FlowError;
use crate::proxy::ProxyFlow;

/// A registered subscriber callback.
pub(crate) type Subscriber<A> = Arc<dyn Fn(A) + Send + Sync>;

/// Shared state of one node.
///
/// `delivery` is held for the whole of a push or an attach, which makes
/// replay atomic with respect to pushes. `subscribers` and `last` are only
/// ever locked briefly and never while a callback runs, so reads do not
/// wait on an in-flight delivery.
struct Node<A> {
    delivery: ReentrantMutex<()>,
    /// Subscribers in registration order, which is also delivery order.
    subscribers: Mutex<Vec<Subscriber<A>>>,
    /// Most recently pushed value. Overwritten on every push.
    last: Mutex<Option<A>>,
}

/// A push-based multicast flow node.
///
/// `CallbackFlow` is a cheap handle: clones share the same node, so a clone
/// can be moved into a callback that pushes into it. The node stays alive for
/// as long as any handle or upstream subscription refers to it.
///
/// Values are delivered synchronously: [`push`](Self::push) returns once
/// every subscriber has been invoked on the calling thread. Subscribers that
/// panic are isolated from each other and from the node state.
pub struct CallbackFlow<A> {
    node: Arc<Node<A>>,
}

impl<A> CallbackFlow<A>
where
    A: Clone + Send + 'static,
{
    /// Creates an empty node with no subscribers and no last value.
    pub fn new() -> Self {
        Self::from_state(None)
    }

    /// Creates a node whose last value is already `initial`.
    ///
    /// Nothing is delivered; the value is only visible through
    /// [`Flow::last_value`](crate::Flow::last_value) and replay.
    pub fn with_initial(initial: A) -> Self {
        Self::from_state(Some(initial))
    }

    fn from_state(last: Option<A>) -> Self {
        Self {
            node: Arc::new(Node {
                delivery: ReentrantMutex::new(()),
                subscribers: Mutex::new(Vec::new()),
                last: Mutex::new(last),
            }),
        }
    }

    /// Pushes a value into the node.
    ///
    /// The value becomes the node's last value before any subscriber runs and
    /// is then handed to every subscriber in registration order. A value
    /// pushed before anything has subscribed is kept for replay.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::SubscriberPanicked`] if any subscriber panicked.
    /// All subscribers were still invoked and the last value was updated.
    pub fn push(&self, value: A) -> Result<(), FlowError> {
        let guard = self.node.delivery.lock();
        *self.node.last.lock() = Some(value.clone());
        let subscribers = self.node.subscribers.lock().clone();

        tracing::trace!(subscribers = subscribers.len(), "delivering pushed value");

        let mut failed = 0;
        let mut first_panic = None;
        for subscriber in &subscribers {
            let item = value.clone();
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| subscriber(item))) {
                let message = panic_message(payload.as_ref());
                tracing::warn!(panic = %message, "flow subscriber panicked during push");
                failed += 1;
                first_panic.get_or_insert(message);
            }
        }
        drop(guard);

        match first_panic {
            None => Ok(()),
            Some(first_panic) => Err(FlowError::SubscriberPanicked {
                failed,
                notified: subscribers.len(),
                first_panic,
            }),
        }
    }

    /// Pushes a value, discarding the failure report.
    ///
    /// Used for internal wiring between nodes: subscriber panics have already
    /// been logged by the node that caught them.
    pub fn emit(&self, value: A) {
        let _ = self.push(value);
    }

    /// Returns the number of registered subscribers, internal wiring included.
    pub fn subscriber_count(&self) -> usize {
        self.node.subscribers.lock().len()
    }

    /// Returns `true` if both handles refer to the same node.
    pub fn same_node(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Registers a subscriber and optionally replays the cached value to it.
    ///
    /// Registration and replay happen under the delivery lock, so a push from
    /// another thread is delivered to the new subscriber either after the
    /// replay or in place of it, never before it.
    pub(crate) fn attach(&self, subscriber: Subscriber<A>, replay_last: bool) {
        let guard = self.node.delivery.lock();
        self.node.subscribers.lock().push(Arc::clone(&subscriber));
        let replay = if replay_last { self.cached() } else { None };

        if let Some(value) = replay {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| subscriber(value))) {
                tracing::warn!(
                    panic = %panic_message(payload.as_ref()),
                    "flow subscriber panicked during replay"
                );
            }
        }
        drop(guard);
    }

    /// Returns a copy of the cached last value without waiting on delivery.
    pub(crate) fn cached(&self) -> Option<A> {
        self.node.last.lock().clone()
    }
}

impl<A> ProxyFlow<A> for CallbackFlow<A>
where
    A: Clone + Send + 'static,
{
    /// A node is its own target.
    fn resolve(&self) -> &CallbackFlow<A> {
        self
    }
}

impl<A> Clone for CallbackFlow<A> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
        }
    }
}

impl<A> Default for CallbackFlow<A>
where
    A: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for CallbackFlow<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers = self.node.subscribers.lock().len();
        let has_last = self.node.last.lock().is_some();
        f.debug_struct("CallbackFlow")
            .field("subscribers", &subscribers)
            .field("has_last", &has_last)
            .finish()
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "subscriber panicked".to_string()
    }
}
