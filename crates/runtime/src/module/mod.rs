//! The game module contract.
//!
//! A [`GameModule`] is the registration descriptor of one self-contained
//! game: its screens, its phase state machine, and its initialization hook.
//! Translations, theme extensions, and a module-local store are optional
//! capabilities, expressed as `Option` return values so a host can tell
//! exactly which ones are present.

mod assets;
mod context;
mod screen;

pub use assets::{ThemeExtensions, Translations, Translator};
pub(crate) use context::Outbox;
pub use context::{DispatchQueue, ModuleConfig, ModuleContext, QueuedAction, StoreMap};
pub use screen::{Screen, ScreenMap, ScreenView};

use async_trait::async_trait;
use party_core::{ModuleId, PhaseId, StorePatch};

use crate::phases::{HookError, PhaseControllerMap};

/// Which optional capabilities a module provides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleCapabilities {
    pub translations: bool,
    pub theme: bool,
    pub store: bool,
}

/// A registrable game.
///
/// Modules are created once, registered at startup, and never mutated
/// afterwards: every capability takes `&self`.
#[async_trait]
pub trait GameModule: Send + Sync {
    /// Unique id; the registry rejects a second module with the same id.
    fn id(&self) -> &ModuleId;

    /// Phase the host enters when activating the module without an explicit
    /// starting phase.
    fn entry_phase(&self) -> PhaseId;

    /// Called once per activation, before the entry phase is entered.
    async fn init(&self, ctx: &ModuleContext<'_>) -> Result<(), HookError>;

    fn register_screens(&self) -> ScreenMap;

    fn phase_controllers(&self) -> PhaseControllerMap;

    fn translations(&self) -> Option<Translations> {
        None
    }

    fn theme_extensions(&self) -> Option<ThemeExtensions> {
        None
    }

    /// Seed of the module-local store.
    fn initial_store(&self) -> Option<StorePatch> {
        None
    }

    fn capabilities(&self) -> ModuleCapabilities {
        ModuleCapabilities {
            translations: self.translations().is_some(),
            theme: self.theme_extensions().is_some(),
            store: self.initial_store().is_some(),
        }
    }
}
