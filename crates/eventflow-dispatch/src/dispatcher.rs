//! The event dispatcher: one flow node per event key, plus registrations.

use std::any::{type_name, Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use eventflow_core::{CallbackFlow, Flow, FlowError};
use parking_lot::{Mutex, RwLock};

use crate::config::{DispatchConfig, PanicPolicy};
use crate::error::DispatchError;
use crate::event::{Event, FlowConfig, OwnerId, RegistrationId};
use crate::event_flow::EventFlow;
use crate::order::Order;

/// Delivery phase. Before-modifications listeners always run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    BeforeModifications,
    AfterModifications,
}

/// Sort key of a node within one event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct DispatchSlot {
    phase: Phase,
    order: Order,
}

impl From<FlowConfig> for DispatchSlot {
    fn from(config: FlowConfig) -> Self {
        let phase = if config.before_modifications {
            Phase::BeforeModifications
        } else {
            Phase::AfterModifications
        };
        Self {
            phase,
            order: config.order,
        }
    }
}

/// All nodes of one event type, iterated in delivery order.
type EventNodes<E> = BTreeMap<DispatchSlot, CallbackFlow<E>>;

/// Type-erased node tables keyed by the event's `TypeId`.
type NodeTables = HashMap<TypeId, Box<dyn Any + Send + Sync>>;

struct Registration {
    owner: OwnerId,
    event: &'static str,
    active: Arc<AtomicBool>,
}

struct DispatcherInner {
    nodes: RwLock<NodeTables>,
    registrations: Mutex<HashMap<RegistrationId, Registration>>,
    config: DispatchConfig,
}

/// Routes posted events into flow nodes.
///
/// The dispatcher owns exactly one [`CallbackFlow`] per
/// `(event type, order, before_modifications)` key and pushes each posted
/// event into every node of its type. Handles are cheap to clone and share
/// the same node tables.
///
/// Flow nodes have no unsubscribe, so registrations are switched off rather
/// than removed: every listener attached through the dispatcher checks its
/// registration's flag before running.
#[derive(Clone)]
pub struct EventDispatcher {
    inner: Arc<DispatcherInner>,
}

impl EventDispatcher {
    /// Creates a dispatcher with the default configuration.
    pub fn new() -> Self {
        Self::with_config(DispatchConfig::default())
    }

    /// Creates a dispatcher with the given configuration.
    pub fn with_config(config: DispatchConfig) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                nodes: RwLock::new(HashMap::new()),
                registrations: Mutex::new(HashMap::new()),
                config,
            }),
        }
    }

    /// Returns the configuration this dispatcher was built with.
    pub fn config(&self) -> DispatchConfig {
        self.inner.config
    }

    /// Returns the node for `E` at `config`, creating it on first use.
    ///
    /// Pushing into the returned node directly bypasses cancellation and
    /// panic-policy handling; use [`post`](Self::post) for that.
    pub fn node<E: Event>(&self, config: FlowConfig) -> CallbackFlow<E> {
        let slot = DispatchSlot::from(config);

        if let Some(node) = self
            .inner
            .nodes
            .read()
            .get(&TypeId::of::<E>())
            .and_then(|table| table.downcast_ref::<EventNodes<E>>())
            .and_then(|nodes| nodes.get(&slot))
        {
            return node.clone();
        }

        let mut tables = self.inner.nodes.write();
        let table = tables
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(EventNodes::<E>::new()));
        if let Some(nodes) = table.downcast_mut::<EventNodes<E>>() {
            return nodes
                .entry(slot)
                .or_insert_with(|| {
                    tracing::debug!(
                        event = type_name::<E>(),
                        order = %config.order,
                        before_modifications = config.before_modifications,
                        "created dispatcher node"
                    );
                    CallbackFlow::new()
                })
                .clone();
        }

        tracing::error!(
            event = type_name::<E>(),
            "node table has unexpected type, replacing it"
        );
        let node = CallbackFlow::new();
        let mut nodes = EventNodes::<E>::new();
        nodes.insert(slot, node.clone());
        *table = Box::new(nodes);
        node
    }

    /// Returns an [`EventFlow`] for `E` at the configured default order in
    /// the regular phase.
    pub fn flow<E: Event>(&self, owner: impl Into<OwnerId>) -> EventFlow<E> {
        let config = FlowConfig::new(self.inner.config.default_order, false);
        EventFlow::new(self.clone(), owner.into(), config)
    }

    /// Registers `handler` for `E` at the default order in the regular phase.
    ///
    /// The handler only sees events posted after registration.
    pub fn register<E, F>(&self, owner: impl Into<OwnerId>, handler: F) -> RegistrationId
    where
        E: Event,
        F: Fn(E) + Send + Sync + 'static,
    {
        let config = FlowConfig::new(self.inner.config.default_order, false);
        self.register_with(owner, config, handler)
    }

    /// Registers `handler` for `E` on the node selected by `config`.
    pub fn register_with<E, F>(
        &self,
        owner: impl Into<OwnerId>,
        config: FlowConfig,
        handler: F,
    ) -> RegistrationId
    where
        E: Event,
        F: Fn(E) + Send + Sync + 'static,
    {
        let owner = owner.into();
        let (id, active) = self.track(owner.clone(), type_name::<E>());
        self.node::<E>(config).subscribe_with(
            move |event| {
                if active.load(Ordering::Acquire) {
                    handler(event);
                }
            },
            false,
        );
        tracing::debug!(
            registration = %id,
            owner = %owner,
            event = type_name::<E>(),
            order = %config.order,
            before_modifications = config.before_modifications,
            "registered listener"
        );
        id
    }

    /// Stops delivery to one registration.
    ///
    /// Returns `false` if `id` is unknown or was already unregistered.
    pub fn unregister(&self, id: RegistrationId) -> bool {
        let removed = self.inner.registrations.lock().remove(&id);
        match removed {
            Some(registration) => {
                registration.active.store(false, Ordering::Release);
                tracing::debug!(
                    registration = %id,
                    owner = %registration.owner,
                    event = registration.event,
                    "unregistered listener"
                );
                true
            }
            None => false,
        }
    }

    /// Stops delivery to every registration of `owner`, including
    /// subscriptions made through its [`EventFlow`]s.
    ///
    /// Returns the number of registrations switched off.
    pub fn unregister_owner(&self, owner: &OwnerId) -> usize {
        let mut count = 0;
        self.inner.registrations.lock().retain(|_, registration| {
            if registration.owner == *owner {
                registration.active.store(false, Ordering::Release);
                count += 1;
                false
            } else {
                true
            }
        });
        tracing::debug!(owner = %owner, count, "unregistered owner");
        count
    }

    /// Returns the number of registrations still delivering.
    pub fn active_registrations(&self) -> usize {
        self.inner.registrations.lock().len()
    }

    /// Delivers `event` to every node registered for its type.
    ///
    /// Before-modifications nodes are visited first, then the regular phase;
    /// within a phase nodes run by ascending [`Order`]. Returns whether the
    /// event is cancelled once every node has been notified.
    ///
    /// # Errors
    ///
    /// Under [`PanicPolicy::Propagate`], returns
    /// [`DispatchError::ListenerPanicked`] if any listener panicked. Delivery
    /// to the remaining listeners and nodes is never cut short.
    pub fn post<E: Event>(&self, event: E) -> Result<bool, DispatchError> {
        let event_name = type_name::<E>();
        let targets: Vec<CallbackFlow<E>> = self
            .inner
            .nodes
            .read()
            .get(&TypeId::of::<E>())
            .and_then(|table| table.downcast_ref::<EventNodes<E>>())
            .map(|nodes| nodes.values().cloned().collect())
            .unwrap_or_default();

        tracing::trace!(event = event_name, nodes = targets.len(), "posting event");

        let mut failed = 0;
        let mut first_panic = None;
        for node in &targets {
            match node.push(event.clone()) {
                Ok(()) => {}
                Err(FlowError::SubscriberPanicked {
                    failed: count,
                    first_panic: message,
                    ..
                }) => {
                    failed += count;
                    first_panic.get_or_insert(message);
                }
                Err(other) => {
                    tracing::warn!(event = event_name, error = %other, "unexpected push failure");
                }
            }
        }

        let cancelled = event.is_cancelled();
        match (first_panic, self.inner.config.panic_policy) {
            (None, _) => Ok(cancelled),
            (Some(first_panic), PanicPolicy::Log) => {
                tracing::warn!(
                    event = event_name,
                    failed,
                    panic = %first_panic,
                    "listeners panicked during post"
                );
                Ok(cancelled)
            }
            (Some(first_panic), PanicPolicy::Propagate) => Err(DispatchError::ListenerPanicked {
                event: event_name,
                failed,
                first_panic,
            }),
        }
    }

    /// Builds an owner-gated node fed by the shared node at `config`.
    ///
    /// The gate replays the shared node's last value, like any derived flow,
    /// and is recorded as a registration of `owner`. A panic in a subscriber
    /// of the gated node is re-raised inside the shared node's delivery, so
    /// `post` applies its panic policy to it.
    pub(crate) fn gated_node<E: Event>(
        &self,
        owner: &OwnerId,
        config: FlowConfig,
    ) -> CallbackFlow<E> {
        let gated = CallbackFlow::new();
        let downstream = gated.clone();
        let (id, active) = self.track(owner.clone(), type_name::<E>());
        self.node::<E>(config).subscribe(move |event| {
            if !active.load(Ordering::Acquire) {
                return;
            }
            if let Err(FlowError::SubscriberPanicked { first_panic, .. }) =
                downstream.push(event)
            {
                panic::resume_unwind(Box::new(first_panic));
            }
        });
        tracing::debug!(
            registration = %id,
            owner = %owner,
            event = type_name::<E>(),
            order = %config.order,
            before_modifications = config.before_modifications,
            "resolved event flow"
        );
        gated
    }

    fn track(&self, owner: OwnerId, event: &'static str) -> (RegistrationId, Arc<AtomicBool>) {
        let id = RegistrationId::generate();
        let active = Arc::new(AtomicBool::new(true));
        self.inner.registrations.lock().insert(
            id,
            Registration {
                owner,
                event,
                active: Arc::clone(&active),
            },
        );
        (id, active)
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("event_types", &self.inner.nodes.read().len())
            .field("registrations", &self.active_registrations())
            .field("config", &self.inner.config)
            .finish()
    }
}
