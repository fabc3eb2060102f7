//! Shared data model for League of Fun game modules.
//!
//! This crate defines the values that flow between a host shell, the game
//! modules it drives, and anything observing the event bus:
//!
//! - [`ids`]: string newtypes for modules, phases, and screens
//! - [`action`]: dispatched actions and the transition results controllers return
//! - [`event`]: the closed [`GameEvent`] union published on the bus
//! - [`meta`]: the bounded key-value map events may carry
//!
//! Nothing here performs I/O or spawns tasks; the `runtime` crate owns those
//! concerns.
pub mod action;
pub mod error;
pub mod event;
pub mod ids;
pub mod meta;

pub use action::{Action, Payload, PhaseTransitionResult, StorePatch, merge_patch};
pub use error::MetaError;
pub use event::{ErrorSource, EventKind, GameEvent};
pub use ids::{ModuleId, PhaseId, ScreenId};
pub use meta::EventMeta;
