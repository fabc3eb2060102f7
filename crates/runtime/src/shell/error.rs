//! Errors surfaced by the host shell.

use party_core::{ErrorSource, ModuleId, PhaseId, ScreenId};
use thiserror::Error;

use crate::phases::{DispatchError, HookError};
use crate::repository::RepositoryError;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("module '{0}' is not registered")]
    ModuleNotFound(ModuleId),

    #[error("no module is active")]
    NoActiveModule,

    #[error("module '{module_id}' has no screen '{screen}'")]
    MissingScreen {
        module_id: ModuleId,
        screen: ScreenId,
    },

    #[error("{stage} hook of module '{module_id}' failed in phase '{phase}'")]
    Hook {
        module_id: ModuleId,
        phase: PhaseId,
        stage: ErrorSource,
        #[source]
        source: HookError,
    },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("failed to load module state")]
    Repository(#[from] RepositoryError),
}
