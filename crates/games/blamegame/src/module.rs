//! The [`GameModule`] descriptor.

use async_trait::async_trait;
use party_core::{ModuleId, PhaseId, StorePatch};
use runtime::{
    GameModule, HookError, ModuleContext, PhaseControllerMap, ScreenMap, ThemeExtensions,
    Translations,
};
use tracing::info;

use crate::assets;
use crate::controllers::{
    IntroController, PlayingController, SetupController, SummaryController, rounds,
};
use crate::phase::Phase;
use crate::screens;
use crate::state::BlameState;

pub const MODULE_ID: &str = "blamegame";

pub struct BlameGame {
    id: ModuleId,
}

impl BlameGame {
    pub fn new() -> Self {
        Self {
            id: ModuleId::from(MODULE_ID),
        }
    }
}

impl Default for BlameGame {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GameModule for BlameGame {
    fn id(&self) -> &ModuleId {
        &self.id
    }

    fn entry_phase(&self) -> PhaseId {
        Phase::Intro.id()
    }

    /// Rejects a `rounds` setting that is not a positive number.
    async fn init(&self, ctx: &ModuleContext<'_>) -> Result<(), HookError> {
        if ctx.config().setting("rounds").is_some()
            && !matches!(ctx.config().setting_u64("rounds"), Some(n) if n > 0)
        {
            return Err(HookError::new("setting 'rounds' must be a positive integer"));
        }

        info!(
            target: "blamegame",
            rounds = rounds(ctx),
            player = ?ctx.player_id(),
            room = ?ctx.room_id(),
            "blame game initialized"
        );
        Ok(())
    }

    fn register_screens(&self) -> ScreenMap {
        screens::screens()
    }

    fn phase_controllers(&self) -> PhaseControllerMap {
        PhaseControllerMap::new()
            .with(Phase::Intro, IntroController)
            .with(Phase::Setup, SetupController)
            .with(Phase::Playing, PlayingController)
            .with(Phase::Summary, SummaryController)
    }

    fn translations(&self) -> Option<Translations> {
        Some(assets::translations())
    }

    fn theme_extensions(&self) -> Option<ThemeExtensions> {
        Some(assets::theme())
    }

    fn initial_store(&self) -> Option<StorePatch> {
        Some(BlameState::default().to_patch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtime::ModuleCapabilities;

    #[test]
    fn every_phase_has_a_controller_and_a_screen() {
        let module = BlameGame::new();
        let controllers = module.phase_controllers();
        let screens = module.register_screens();

        for phase in ["intro", "setup", "playing", "summary"] {
            assert!(controllers.contains(&PhaseId::from(phase)), "{phase}");
            assert!(screens.contains_key(phase), "{phase}");
        }
    }

    #[test]
    fn all_optional_capabilities_are_present() {
        assert_eq!(
            BlameGame::new().capabilities(),
            ModuleCapabilities {
                translations: true,
                theme: true,
                store: true,
            }
        );
    }
}
