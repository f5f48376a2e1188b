//! Flows of dispatched events.

use std::fmt;
use std::sync::OnceLock;

use eventflow_core::{CallbackFlow, ProxyFlow};

use crate::dispatcher::EventDispatcher;
use crate::event::{Event, FlowConfig, OwnerId};
use crate::order::Order;

/// A [`Flow`](eventflow_core::Flow) of the events of type `E` that the
/// dispatcher delivers at one `(order, before_modifications)` key.
///
/// The underlying node is built the first time the flow is used and cached
/// for the lifetime of this value. It is fed by the dispatcher's shared node
/// for the key through a gate registered to the flow's owner, so
/// [`EventDispatcher::unregister_owner`] silences everything subscribed
/// through it.
///
/// [`order`](Self::order) and [`before_modifications`](Self::before_modifications)
/// return new flows and leave the receiver (and its cached node) untouched.
#[derive(Clone)]
pub struct EventFlow<E: Event> {
    dispatcher: EventDispatcher,
    owner: OwnerId,
    config: FlowConfig,
    built: OnceLock<CallbackFlow<E>>,
}

impl<E: Event> EventFlow<E> {
    pub(crate) fn new(dispatcher: EventDispatcher, owner: OwnerId, config: FlowConfig) -> Self {
        Self {
            dispatcher,
            owner,
            config,
            built: OnceLock::new(),
        }
    }

    /// Returns a flow for the same events at `order`.
    pub fn order(&self, order: Order) -> Self {
        Self::new(
            self.dispatcher.clone(),
            self.owner.clone(),
            self.config.with_order(order),
        )
    }

    /// Returns a flow for the same events in the given phase.
    pub fn before_modifications(&self, before_modifications: bool) -> Self {
        Self::new(
            self.dispatcher.clone(),
            self.owner.clone(),
            self.config.with_before_modifications(before_modifications),
        )
    }

    /// The key this flow reads from.
    pub fn config(&self) -> FlowConfig {
        self.config
    }

    /// The owner the flow's subscriptions are registered to.
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Returns the underlying node, building it on first call.
    pub fn flow(&self) -> &CallbackFlow<E> {
        self.built
            .get_or_init(|| self.dispatcher.gated_node(&self.owner, self.config))
    }
}

impl<E: Event> ProxyFlow<E> for EventFlow<E> {
    fn resolve(&self) -> &CallbackFlow<E> {
        self.flow()
    }
}

impl<E: Event> fmt::Debug for EventFlow<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFlow")
            .field("event", &std::any::type_name::<E>())
            .field("owner", &self.owner)
            .field("config", &self.config)
            .field("resolved", &self.built.get().is_some())
            .finish()
    }
}
