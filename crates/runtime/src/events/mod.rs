//! Synchronous event bus shared by the host shell and game modules.
//!
//! Event values live in `party-core` ([`GameEvent`]); this module provides
//! the process-scoped [`EventBus`] that delivers them and the
//! [`EventHandler`] contract subscribers implement.

mod bus;
mod handler;

pub use bus::{BusConfig, EventBus, PublishReport, SubscriberFailure, Subscription};
pub use handler::{EventHandler, HandlerError};

pub use party_core::{ErrorSource, EventKind, GameEvent};
