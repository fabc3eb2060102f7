//! The blame game: players take turns blaming each other for made-up
//! mishaps, one round per prompt.
//!
//! The crate is the reference implementation of the [`runtime::GameModule`]
//! contract:
//! - [`phase`] names the four phases
//! - [`state`] is the typed view of the module store
//! - [`controllers`] holds one controller per phase
//! - [`screens`] and [`assets`] provide the presentation layer
mod assets;
pub mod controllers;
mod module;
pub mod phase;
mod screens;
pub mod state;

pub use module::{BlameGame, MODULE_ID};
pub use phase::{Action, Phase};
pub use state::BlameState;
