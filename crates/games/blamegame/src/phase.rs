//! Phase and action names of the blame game.

use party_core::PhaseId;

/// The four phases, in play order.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Intro,
    Setup,
    Playing,
    Summary,
}

impl Phase {
    pub fn id(self) -> PhaseId {
        PhaseId::from(self.as_ref())
    }
}

impl From<Phase> for PhaseId {
    fn from(phase: Phase) -> Self {
        phase.id()
    }
}

/// Actions the controllers react to. Anything else is a self-loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Start,
    AddPlayer,
    Begin,
    Next,
    Restart,
}

impl Action {
    /// Parses a dispatched action; unknown names yield `None`.
    pub fn parse(action: &party_core::Action) -> Option<Self> {
        action.name().parse().ok()
    }
}

impl From<Action> for party_core::Action {
    fn from(action: Action) -> Self {
        party_core::Action::new(action.as_ref())
    }
}
