//! Error types for phase hooks and action routing.

use party_core::{Action, ModuleId, PhaseId};
use thiserror::Error;

/// Failure raised by a module hook (`init`, `on_enter`, `on_exit`) or by a
/// controller rejecting an action that violates its contract.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HookError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced while routing an action to a phase controller.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("action name must not be empty")]
    EmptyAction,

    #[error("module '{module_id}' has no controller for phase '{phase}'")]
    MissingController { module_id: ModuleId, phase: PhaseId },

    #[error("module '{module_id}' transitioned from '{from}' to unknown phase '{to}'")]
    UnknownTargetPhase {
        module_id: ModuleId,
        from: PhaseId,
        to: PhaseId,
    },

    #[error("phase '{phase}' of module '{module_id}' rejected action '{action}'")]
    Rejected {
        module_id: ModuleId,
        phase: PhaseId,
        action: Action,
        #[source]
        source: HookError,
    },

    #[error("phase '{phase}' of module '{module_id}' panicked on action '{action}': {message}")]
    TransitionPanicked {
        module_id: ModuleId,
        phase: PhaseId,
        action: Action,
        message: String,
    },
}

impl DispatchError {
    /// Whether the error means the module itself is malformed.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            DispatchError::MissingController { .. } | DispatchError::UnknownTargetPhase { .. }
        )
    }
}
