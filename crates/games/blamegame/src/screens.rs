//! Text screens, one per phase.

use std::sync::Arc;

use party_core::ScreenId;
use runtime::{ScreenMap, ScreenView};

use crate::phase::Phase;
use crate::state::BlameState;

fn state(view: &ScreenView<'_>) -> BlameState {
    BlameState::from_store(view.store).unwrap_or_default()
}

fn intro(view: &ScreenView<'_>) -> String {
    format!("{}\n{}", view.t("intro.title"), view.t("intro.hint"))
}

fn setup(view: &ScreenView<'_>) -> String {
    let state = state(view);
    let players = if state.players.is_empty() {
        "-".to_owned()
    } else {
        state.players.join(", ")
    };
    let hint = if state.can_begin() {
        view.t("setup.ready")
    } else {
        view.t("setup.need_more")
    };
    format!(
        "{}\n{}: {players}\n{hint}",
        view.t("setup.title"),
        view.t("setup.players")
    )
}

fn playing(view: &ScreenView<'_>) -> String {
    let state = state(view);
    let title = view
        .t("playing.title")
        .replace("{round}", &state.round.to_string())
        .replace("{rounds}", &state.rounds.to_string());
    let reader = view
        .t("playing.reader")
        .replace("{reader}", state.reader().unwrap_or("?"));
    format!("{title}\n{reader}\n{}", view.t("playing.hint"))
}

fn summary(view: &ScreenView<'_>) -> String {
    let state = state(view);
    let rounds = view
        .t("summary.rounds")
        .replace("{rounds}", &state.round.to_string());
    format!(
        "{}\n{rounds}\n{}",
        view.t("summary.title"),
        view.t("summary.hint")
    )
}

pub fn screens() -> ScreenMap {
    let mut screens = ScreenMap::new();
    screens.insert(ScreenId::from(Phase::Intro.as_ref()), Arc::new(intro));
    screens.insert(ScreenId::from(Phase::Setup.as_ref()), Arc::new(setup));
    screens.insert(ScreenId::from(Phase::Playing.as_ref()), Arc::new(playing));
    screens.insert(ScreenId::from(Phase::Summary.as_ref()), Arc::new(summary));
    screens
}
