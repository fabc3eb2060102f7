//! One controller per phase.

use async_trait::async_trait;
use party_core::{EventMeta, GameEvent, PhaseTransitionResult};
use runtime::{HookError, ModuleContext, PhaseController};
use serde_json::Value;
use tracing::debug;

use crate::phase::{Action, Phase};
use crate::state::{BlameState, DEFAULT_ROUNDS};

/// Rounds to play, from the `rounds` setting.
pub fn rounds(ctx: &ModuleContext<'_>) -> u64 {
    ctx.config().setting_u64("rounds").unwrap_or(DEFAULT_ROUNDS)
}

fn stay(ctx: &ModuleContext<'_>) -> PhaseTransitionResult {
    PhaseTransitionResult::stay(ctx.phase())
}

fn meta_error(e: party_core::MetaError) -> HookError {
    HookError::with_source("event metadata rejected", e)
}

pub struct IntroController;

#[async_trait]
impl PhaseController for IntroController {
    fn transition(
        &self,
        action: &party_core::Action,
        _payload: Option<&Value>,
        ctx: &ModuleContext<'_>,
    ) -> Result<PhaseTransitionResult, HookError> {
        Ok(match Action::parse(action) {
            Some(Action::Start) => PhaseTransitionResult::to(Phase::Setup),
            _ => stay(ctx),
        })
    }
}

pub struct SetupController;

impl SetupController {
    fn player_name(payload: Option<&Value>) -> Result<&str, HookError> {
        payload
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| HookError::new(r#"add_player expects a payload like {"name": "Ana"}"#))
    }
}

#[async_trait]
impl PhaseController for SetupController {
    fn transition(
        &self,
        action: &party_core::Action,
        payload: Option<&Value>,
        ctx: &ModuleContext<'_>,
    ) -> Result<PhaseTransitionResult, HookError> {
        let mut state = BlameState::from_store(ctx.store())?;

        match Action::parse(action) {
            Some(Action::AddPlayer) => {
                let name = Self::player_name(payload)?;
                if state.players.iter().any(|p| p == name) {
                    debug!(target: "blamegame", player = name, "player already joined");
                    return Ok(stay(ctx));
                }
                state.players.push(name.to_owned());
                Ok(stay(ctx).with_effect(state.to_patch()))
            }
            Some(Action::Begin) if state.can_begin() => {
                Ok(PhaseTransitionResult::to(Phase::Playing)
                    .with_value("round", 1)
                    .with_value("rounds", rounds(ctx)))
            }
            Some(Action::Begin) => {
                debug!(
                    target: "blamegame",
                    players = state.players.len(),
                    "not enough players to begin"
                );
                Ok(stay(ctx))
            }
            _ => Ok(stay(ctx)),
        }
    }
}

pub struct PlayingController;

impl PlayingController {
    fn announce(ctx: &ModuleContext<'_>, state: &BlameState) -> Result<(), HookError> {
        let mut meta = EventMeta::new()
            .with("round", state.round)
            .and_then(|meta| meta.with("rounds", state.rounds))
            .map_err(meta_error)?;
        if let Some(reader) = state.reader() {
            meta.insert("reader", reader).map_err(meta_error)?;
        }

        ctx.publish(&GameEvent::ContentNext {
            module_id: ctx.module_id().clone(),
            index: u32::try_from(state.round.saturating_sub(1)).unwrap_or(u32::MAX),
            meta,
        });
        Ok(())
    }
}

#[async_trait]
impl PhaseController for PlayingController {
    fn transition(
        &self,
        action: &party_core::Action,
        _payload: Option<&Value>,
        ctx: &ModuleContext<'_>,
    ) -> Result<PhaseTransitionResult, HookError> {
        if Action::parse(action) != Some(Action::Next) {
            return Ok(stay(ctx));
        }

        let mut state = BlameState::from_store(ctx.store())?;
        if state.is_last_round() {
            return Ok(PhaseTransitionResult::to(Phase::Summary));
        }

        state.round += 1;
        Self::announce(ctx, &state)?;
        Ok(stay(ctx).with_value("round", state.round))
    }

    async fn on_enter(&self, ctx: &ModuleContext<'_>) -> Result<(), HookError> {
        let state = BlameState::from_store(ctx.store())?;
        Self::announce(ctx, &state)
    }
}

pub struct SummaryController;

#[async_trait]
impl PhaseController for SummaryController {
    fn transition(
        &self,
        action: &party_core::Action,
        _payload: Option<&Value>,
        ctx: &ModuleContext<'_>,
    ) -> Result<PhaseTransitionResult, HookError> {
        Ok(match Action::parse(action) {
            Some(Action::Restart) => {
                PhaseTransitionResult::to(Phase::Intro)
                    .with_effect(BlameState::default().to_patch())
            }
            _ => stay(ctx),
        })
    }

    async fn on_enter(&self, ctx: &ModuleContext<'_>) -> Result<(), HookError> {
        let state = BlameState::from_store(ctx.store())?;
        let meta = EventMeta::new()
            .with("rounds", state.round)
            .and_then(|meta| meta.with("players", state.players.len()))
            .map_err(meta_error)?;

        ctx.publish(&GameEvent::GameComplete {
            module_id: ctx.module_id().clone(),
            meta,
        });
        Ok(())
    }
}
