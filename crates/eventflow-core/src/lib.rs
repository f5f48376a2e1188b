//! Push-based, multicast event flows.
//!
//! A flow is a node that holds an ordered list of subscriber callbacks and a
//! single cached last value. Pushing a value into a node records it as the
//! last value and hands it to every subscriber, in subscription order, on the
//! pushing thread. Operators (`map`, `fold`, `zip`, ...) build new nodes that
//! are permanently wired to their sources by one internal subscription.
//!
//! # Core types
//!
//! - [`Flow`]: the operator contract every flow exposes
//! - [`CallbackFlow`]: the concrete node: subscribers, last value, `push`
//! - [`ProxyFlow`]: a stable handle that resolves to an underlying node
//! - [`Executor`]: the hand-off capability used by [`Flow::async_on`]
//!
//! # Concurrency
//!
//! `subscribe` and `push` on the same node are serialised by a per-node
//! reentrant lock, which is held while subscribers run. A subscriber attached
//! with replay sees the cached value and any concurrent push in a consistent
//! order. Callbacks may push into or subscribe to the node that is currently
//! delivering to them from the same thread. Wiring two nodes into each other
//! from different threads can deadlock and is not supported.
//!
//! `last_value` and `subscriber_count` never wait for a delivery in progress:
//! the last value is recorded before the first subscriber runs.
//!
//! # Failure isolation
//!
//! A panicking subscriber is caught, logged, and reported in the
//! [`FlowError`] returned by [`CallbackFlow::push`]; the remaining
//! subscribers still receive the value.
//!
//! There is no unsubscribe. Callers that need to stop receiving values gate
//! their callback on a flag of their own.

mod callback_flow;
mod error;
mod executor;
mod flow;
mod proxy;

pub use callback_flow::CallbackFlow;
pub use error::FlowError;
pub use executor::{Executor, InlineExecutor, SerialExecutor, Task, TokioExecutor};
pub use flow::{flatten, Flow};
pub use proxy::ProxyFlow;

pub use eventflow_types::{Either, Tuple};
