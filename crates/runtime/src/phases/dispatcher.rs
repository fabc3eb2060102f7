//! Routes an action to the controller of the current phase.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use party_core::{Action, ModuleId, PhaseId, PhaseTransitionResult};
use serde_json::Value;
use tracing::{debug, trace};

use super::{DispatchError, PhaseController, PhaseControllerMap};
use crate::module::ModuleContext;
use crate::unwind;

/// Validates and routes actions against one module's controllers.
///
/// The dispatcher only computes a [`PhaseTransitionResult`]; applying it
/// (hooks, events, store updates) is the host shell's job.
pub struct Dispatcher<'a> {
    controllers: &'a PhaseControllerMap,
}

impl<'a> Dispatcher<'a> {
    pub fn new(controllers: &'a PhaseControllerMap) -> Self {
        Self { controllers }
    }

    /// Resolves the controller for `phase`.
    ///
    /// A missing controller is a configuration error of the module, not an
    /// action to ignore.
    pub fn controller(
        &self,
        module_id: &ModuleId,
        phase: &PhaseId,
    ) -> Result<&'a Arc<dyn PhaseController>, DispatchError> {
        self.controllers
            .get(phase)
            .ok_or_else(|| DispatchError::MissingController {
                module_id: module_id.clone(),
                phase: phase.clone(),
            })
    }

    /// Routes `action` to the controller of `ctx.phase()`.
    pub fn route(
        &self,
        action: &Action,
        payload: Option<&Value>,
        ctx: &ModuleContext<'_>,
    ) -> Result<PhaseTransitionResult, DispatchError> {
        if action.is_empty() {
            return Err(DispatchError::EmptyAction);
        }

        let module_id = ctx.module_id();
        let phase = ctx.phase();
        let controller = self.controller(module_id, phase)?;

        trace!(
            target: "runtime::dispatch",
            module = %module_id,
            phase = %phase,
            action = %action,
            "routing action"
        );

        let outcome =
            panic::catch_unwind(AssertUnwindSafe(|| controller.transition(action, payload, ctx)));

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(source)) => {
                return Err(DispatchError::Rejected {
                    module_id: module_id.clone(),
                    phase: phase.clone(),
                    action: action.clone(),
                    source,
                });
            }
            Err(payload) => {
                let message = unwind::message(payload.as_ref())
                    .unwrap_or_else(|| "transition panicked".to_owned());
                return Err(DispatchError::TransitionPanicked {
                    module_id: module_id.clone(),
                    phase: phase.clone(),
                    action: action.clone(),
                    message,
                });
            }
        };

        if !self.controllers.contains(&result.next) {
            return Err(DispatchError::UnknownTargetPhase {
                module_id: module_id.clone(),
                from: phase.clone(),
                to: result.next,
            });
        }

        debug!(
            target: "runtime::dispatch",
            module = %module_id,
            from = %phase,
            to = %result.next,
            action = %action,
            "transition computed"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::module::{DispatchQueue, ModuleConfig, StoreMap};
    use crate::phases::{HookError, transition_fn};

    struct Fixture {
        module_id: ModuleId,
        config: ModuleConfig,
        bus: EventBus,
        queue: DispatchQueue,
        store: StoreMap,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                module_id: ModuleId::from("blamegame"),
                config: ModuleConfig::default(),
                bus: EventBus::new(),
                queue: DispatchQueue::default(),
                store: StoreMap::new(),
            }
        }

        fn ctx<'a>(&'a self, phase: &'a PhaseId) -> ModuleContext<'a> {
            ModuleContext::new(
                &self.module_id,
                phase,
                &self.config,
                &self.bus,
                &self.queue,
                &self.store,
            )
        }
    }

    fn intro_setup_map() -> PhaseControllerMap {
        PhaseControllerMap::new()
            .with("intro", transition_fn(|_, _, _| Ok(PhaseTransitionResult::to("setup"))))
            .with("setup", transition_fn(|_, _, _| Ok(PhaseTransitionResult::to("setup"))))
    }

    #[test]
    fn intro_moves_to_setup_and_setup_loops() {
        let fixture = Fixture::new();
        let map = intro_setup_map();
        let dispatcher = Dispatcher::new(&map);
        let unknown = Action::new("anything");

        let mut phase = PhaseId::from("intro");
        let result = dispatcher
            .route(&unknown, None, &fixture.ctx(&phase))
            .unwrap();
        assert_eq!(result.next, "setup");

        phase = result.next;
        for _ in 0..3 {
            let result = dispatcher
                .route(&unknown, None, &fixture.ctx(&phase))
                .unwrap();
            assert!(result.is_self_loop(&phase));
        }
    }

    #[test]
    fn missing_controller_is_a_configuration_error() {
        let fixture = Fixture::new();
        let map = intro_setup_map();
        let phase = PhaseId::from("playing");

        let err = Dispatcher::new(&map)
            .route(&Action::new("next"), None, &fixture.ctx(&phase))
            .unwrap_err();

        assert!(matches!(err, DispatchError::MissingController { .. }));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn transitions_to_undeclared_phases_are_rejected() {
        let fixture = Fixture::new();
        let map = PhaseControllerMap::new()
            .with("intro", transition_fn(|_, _, _| Ok(PhaseTransitionResult::to("nowhere"))));
        let phase = PhaseId::from("intro");

        let err = Dispatcher::new(&map)
            .route(&Action::new("go"), None, &fixture.ctx(&phase))
            .unwrap_err();

        match err {
            DispatchError::UnknownTargetPhase { from, to, .. } => {
                assert_eq!(from, "intro");
                assert_eq!(to, "nowhere");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn empty_actions_never_reach_controllers() {
        let fixture = Fixture::new();
        let map = PhaseControllerMap::new()
            .with("intro", transition_fn(|_, _, _| panic!("controller must not run")));
        let phase = PhaseId::from("intro");

        let err = Dispatcher::new(&map)
            .route(&Action::new(""), None, &fixture.ctx(&phase))
            .unwrap_err();
        assert!(matches!(err, DispatchError::EmptyAction));
    }

    #[test]
    fn rejections_and_panics_are_contained() {
        let fixture = Fixture::new();
        let map = PhaseControllerMap::new()
            .with(
                "strict",
                transition_fn(|_, payload, _| match payload {
                    Some(_) => Ok(PhaseTransitionResult::to("strict")),
                    None => Err(HookError::new("payload required")),
                }),
            )
            .with("broken", transition_fn(|_, _, _| panic!("bad state")));
        let dispatcher = Dispatcher::new(&map);

        let strict = PhaseId::from("strict");
        let err = dispatcher
            .route(&Action::new("add"), None, &fixture.ctx(&strict))
            .unwrap_err();
        assert!(matches!(err, DispatchError::Rejected { .. }));

        let broken = PhaseId::from("broken");
        let err = dispatcher
            .route(&Action::new("add"), None, &fixture.ctx(&broken))
            .unwrap_err();
        match err {
            DispatchError::TransitionPanicked { message, .. } => assert_eq!(message, "bad state"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
