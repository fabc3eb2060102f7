//! State of the module currently hosted by the shell.

use party_core::{Action, ModuleId, PhaseId};
use serde::Serialize;

use crate::module::{DispatchQueue, ScreenMap, StoreMap, Translations};
use crate::phases::PhaseControllerMap;

/// Everything the shell holds while a module is active.
///
/// Screens, controllers, and translations are collected once at activation,
/// so a module's descriptor methods run exactly once per session.
pub(crate) struct ActiveSession {
    pub module_id: ModuleId,
    pub controllers: PhaseControllerMap,
    pub screens: ScreenMap,
    pub translations: Option<Translations>,
    pub phase: PhaseId,
    pub store: StoreMap,
    pub queue: DispatchQueue,
}

impl ActiveSession {
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            module_id: self.module_id.clone(),
            phase: self.phase.clone(),
            store: self.store.clone(),
        }
    }
}

/// Point-in-time copy of the active session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub module_id: ModuleId,
    pub phase: PhaseId,
    pub store: StoreMap,
}

/// One processed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub action: Action,
    pub from: PhaseId,
    pub to: PhaseId,
}

impl Transition {
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Result of [`HostShell::dispatch`](super::HostShell::dispatch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    /// The dispatched action itself.
    pub transition: Transition,
    /// Actions queued through the module context, in processing order.
    pub chained: Vec<Transition>,
    /// Queued actions that failed; each one was reported on the bus.
    pub chained_failures: usize,
    /// Queued actions discarded after the chain limit was reached.
    pub dropped: usize,
}

impl DispatchOutcome {
    pub(crate) fn new(transition: Transition) -> Self {
        Self {
            transition,
            chained: Vec::new(),
            chained_failures: 0,
            dropped: 0,
        }
    }

    /// Phase the module ended up in after the whole chain.
    pub fn phase(&self) -> &PhaseId {
        self.chained
            .last()
            .map_or(&self.transition.to, |last| &last.to)
    }
}
