//! Dispatcher integration for event flows.
//!
//! An [`EventDispatcher`] owns one [`CallbackFlow`] per
//! `(event type, order, before_modifications)` key and pushes every posted
//! [`Event`] into the nodes of its type, before-modifications phase first and
//! then by ascending [`Order`]. Consumers either register plain handlers or
//! build derived streams from an [`EventFlow`]:
//!
//! ```no_run
//! use eventflow_dispatch::{Event, EventDispatcher, Flow, Order};
//!
//! #[derive(Clone)]
//! struct Joined(String);
//! impl Event for Joined {}
//!
//! let dispatcher = EventDispatcher::new();
//! let names = dispatcher
//!     .flow::<Joined>("greeter")
//!     .order(Order::Late)
//!     .map(|Joined(name)| name);
//! names.subscribe(|name| println!("welcome, {name}"));
//!
//! dispatcher.post(Joined("ada".into())).ok();
//! ```
//!
//! Unsubscribing is done here, not in the flow core: every listener checks a
//! per-registration flag before running, and [`EventDispatcher::unregister`]
//! or [`EventDispatcher::unregister_owner`] clear it.

pub mod config;
pub mod telemetry;

mod dispatcher;
mod error;
mod event;
mod event_flow;
mod order;

pub use dispatcher::EventDispatcher;
pub use error::{ConfigError, DispatchError, TelemetryError};
pub use event::{Event, FlowConfig, OwnerId, RegistrationId};
pub use event_flow::EventFlow;
pub use order::{Order, ParseOrderError};

pub use eventflow_core::{CallbackFlow, Either, Flow, ProxyFlow, Tuple};
