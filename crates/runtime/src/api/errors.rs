//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the shell, the registry, repositories, and worker
//! coordination so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

pub use super::registry::RegistryError;
pub use crate::repository::RepositoryError;
pub use crate::shell::ShellError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Shell(#[from] ShellError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("host worker command channel closed")]
    CommandChannelClosed,

    #[error("host worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("host worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}
