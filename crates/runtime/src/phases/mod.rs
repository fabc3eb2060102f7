//! Phase controllers: the per-module state machine contract.
//!
//! A module describes its state machine as a [`PhaseControllerMap`]: each key
//! is a phase, each value the controller handling that phase. The host shell
//! picks the initial phase, routes actions through the [`Dispatcher`], and
//! runs the exit/enter hooks around every committed change of phase.
//!
//! # Hook ordering
//!
//! `transition` is synchronous, so the current phase is always well-defined.
//! `on_exit` of the outgoing phase completes before `on_enter` of the
//! incoming one starts, and the host accepts no other action until both have
//! finished.

mod dispatcher;
mod error;

pub use dispatcher::Dispatcher;
pub use error::{DispatchError, HookError};

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use party_core::{Action, PhaseId, PhaseTransitionResult, ScreenId};
use serde_json::Value;

use crate::module::ModuleContext;

/// Logic bound to one phase of one module.
#[async_trait]
pub trait PhaseController: Send + Sync {
    /// Computes the next phase for `action`.
    ///
    /// Unrecognized actions should return [`PhaseTransitionResult::stay`]
    /// instead of an error. Return `Err` only when the action violates the
    /// controller's contract (e.g. a malformed payload).
    fn transition(
        &self,
        action: &Action,
        payload: Option<&Value>,
        ctx: &ModuleContext<'_>,
    ) -> Result<PhaseTransitionResult, HookError>;

    async fn on_enter(&self, _ctx: &ModuleContext<'_>) -> Result<(), HookError> {
        Ok(())
    }

    async fn on_exit(&self, _ctx: &ModuleContext<'_>) -> Result<(), HookError> {
        Ok(())
    }

    /// Screen shown while this phase is current. `None` renders the screen
    /// named after the phase.
    fn screen(&self) -> Option<ScreenId> {
        None
    }
}

/// The state machine of one module: phase id to controller.
#[derive(Clone, Default)]
pub struct PhaseControllerMap {
    controllers: BTreeMap<PhaseId, Arc<dyn PhaseController>>,
}

impl PhaseControllerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(
        mut self,
        phase: impl Into<PhaseId>,
        controller: impl PhaseController + 'static,
    ) -> Self {
        self.insert(phase, Arc::new(controller));
        self
    }

    /// Inserts a controller, returning the one it replaced.
    pub fn insert(
        &mut self,
        phase: impl Into<PhaseId>,
        controller: Arc<dyn PhaseController>,
    ) -> Option<Arc<dyn PhaseController>> {
        self.controllers.insert(phase.into(), controller)
    }

    pub fn get(&self, phase: &PhaseId) -> Option<&Arc<dyn PhaseController>> {
        self.controllers.get(phase)
    }

    pub fn contains(&self, phase: &PhaseId) -> bool {
        self.controllers.contains_key(phase)
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

impl std::fmt::Debug for PhaseControllerMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.controllers.keys()).finish()
    }
}

/// Controller built from a transition closure, with no hooks.
pub struct TransitionFn<F> {
    f: F,
}

/// Wraps `f` as a [`PhaseController`].
///
/// ```ignore
/// let map = PhaseControllerMap::new()
///     .with("intro", transition_fn(|_, _, _| Ok(PhaseTransitionResult::to("setup"))))
///     .with("setup", transition_fn(|_, _, ctx| Ok(PhaseTransitionResult::stay(ctx.phase()))));
/// ```
pub fn transition_fn<F>(f: F) -> TransitionFn<F>
where
    F: Fn(&Action, Option<&Value>, &ModuleContext<'_>) -> Result<PhaseTransitionResult, HookError>
        + Send
        + Sync,
{
    TransitionFn { f }
}

#[async_trait]
impl<F> PhaseController for TransitionFn<F>
where
    F: Fn(&Action, Option<&Value>, &ModuleContext<'_>) -> Result<PhaseTransitionResult, HookError>
        + Send
        + Sync,
{
    fn transition(
        &self,
        action: &Action,
        payload: Option<&Value>,
        ctx: &ModuleContext<'_>,
    ) -> Result<PhaseTransitionResult, HookError> {
        (self.f)(action, payload, ctx)
    }
}
