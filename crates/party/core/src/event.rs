//! Events published on the host's event bus.
//!
//! [`GameEvent`] is the contract between the framework and anything that
//! observes it (debug overlays, analytics, the terminal host). Each variant
//! carries exactly the fields its kind needs; free-form data is limited to
//! the bounded [`EventMeta`] on content and completion events.

use serde::{Deserialize, Serialize};

use crate::action::{Action, Payload};
use crate::ids::{ModuleId, PhaseId};
use crate::meta::EventMeta;

/// Event kinds with their wire tags.
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
pub enum EventKind {
    #[strum(serialize = "LIFECYCLE/INIT")]
    LifecycleInit,
    #[strum(serialize = "LIFECYCLE/READY")]
    LifecycleReady,
    #[strum(serialize = "PHASE/ENTER")]
    PhaseEnter,
    #[strum(serialize = "PHASE/EXIT")]
    PhaseExit,
    #[strum(serialize = "ACTION/DISPATCH")]
    ActionDispatch,
    #[strum(serialize = "CONTENT/NEXT")]
    ContentNext,
    #[strum(serialize = "GAME/COMPLETE")]
    GameComplete,
    #[strum(serialize = "ERROR")]
    Error,
}

/// Where a reported failure originated.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorSource {
    /// Module activation was rejected before any hook ran.
    Activation,
    /// The module's `init` hook failed.
    Init,
    /// A phase's `on_enter` hook failed.
    Enter,
    /// A phase's `on_exit` hook failed.
    Exit,
    /// Routing or computing a transition failed.
    Transition,
    /// A bus subscriber failed while handling an event.
    Subscriber,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A module is being initialized by the host.
    #[serde(rename = "LIFECYCLE/INIT")]
    LifecycleInit { module_id: ModuleId },

    /// A module finished initialization and entered its first phase.
    #[serde(rename = "LIFECYCLE/READY")]
    LifecycleReady { module_id: ModuleId, phase: PhaseId },

    /// The host committed entry into `phase`.
    #[serde(rename = "PHASE/ENTER")]
    PhaseEnter {
        module_id: ModuleId,
        phase: PhaseId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<PhaseId>,
    },

    /// The host committed exit from `phase`. `to` is `None` on deactivation.
    #[serde(rename = "PHASE/EXIT")]
    PhaseExit {
        module_id: ModuleId,
        phase: PhaseId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<PhaseId>,
    },

    /// An action was submitted while `phase` was current.
    #[serde(rename = "ACTION/DISPATCH")]
    ActionDispatch {
        module_id: ModuleId,
        phase: PhaseId,
        action: Action,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Payload,
    },

    /// A module advanced to its next piece of content.
    #[serde(rename = "CONTENT/NEXT")]
    ContentNext {
        module_id: ModuleId,
        index: u32,
        #[serde(default, skip_serializing_if = "EventMeta::is_empty")]
        meta: EventMeta,
    },

    /// A module finished a full game.
    #[serde(rename = "GAME/COMPLETE")]
    GameComplete {
        module_id: ModuleId,
        #[serde(default, skip_serializing_if = "EventMeta::is_empty")]
        meta: EventMeta,
    },

    /// A developer-facing failure report.
    #[serde(rename = "ERROR")]
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        module_id: Option<ModuleId>,
        source: ErrorSource,
        message: String,
    },
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::LifecycleInit { .. } => EventKind::LifecycleInit,
            GameEvent::LifecycleReady { .. } => EventKind::LifecycleReady,
            GameEvent::PhaseEnter { .. } => EventKind::PhaseEnter,
            GameEvent::PhaseExit { .. } => EventKind::PhaseExit,
            GameEvent::ActionDispatch { .. } => EventKind::ActionDispatch,
            GameEvent::ContentNext { .. } => EventKind::ContentNext,
            GameEvent::GameComplete { .. } => EventKind::GameComplete,
            GameEvent::Error { .. } => EventKind::Error,
        }
    }

    /// Module this event concerns. Only `Error` may be unscoped.
    pub fn module_id(&self) -> Option<&ModuleId> {
        match self {
            GameEvent::LifecycleInit { module_id }
            | GameEvent::LifecycleReady { module_id, .. }
            | GameEvent::PhaseEnter { module_id, .. }
            | GameEvent::PhaseExit { module_id, .. }
            | GameEvent::ActionDispatch { module_id, .. }
            | GameEvent::ContentNext { module_id, .. }
            | GameEvent::GameComplete { module_id, .. } => Some(module_id),
            GameEvent::Error { module_id, .. } => module_id.as_ref(),
        }
    }

    pub fn error(
        module_id: Option<ModuleId>,
        source: ErrorSource,
        message: impl Into<String>,
    ) -> Self {
        GameEvent::Error {
            module_id,
            source,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, GameEvent::Error { .. })
    }
}
