//! Cloneable façade for issuing commands to the host.
//!
//! [`HostHandle`] hides channel plumbing and offers async helpers for
//! activating modules and dispatching actions.
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use party_core::{Action, ModuleId, Payload, PhaseId};

use super::errors::{Result, RuntimeError};
use super::registry::ModuleRegistry;
use crate::events::EventBus;
use crate::shell::{DispatchOutcome, SessionSnapshot};
use crate::workers::Command;

/// Client-facing handle to interact with the host.
#[derive(Clone)]
pub struct HostHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
    registry: Arc<ModuleRegistry>,
}

impl HostHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
        registry: Arc<ModuleRegistry>,
    ) -> Self {
        Self {
            command_tx,
            event_bus,
            registry,
        }
    }

    /// Activate a registered module, optionally at a specific phase.
    pub async fn activate(
        &self,
        module_id: impl Into<ModuleId>,
        entry: Option<PhaseId>,
    ) -> Result<SessionSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.send(Command::Activate {
            module_id: module_id.into(),
            entry,
            reply: reply_tx,
        })
        .await?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Dispatch an action to the active module.
    ///
    /// Calls from concurrent tasks are applied one at a time, in the order
    /// the worker receives them.
    pub async fn dispatch(
        &self,
        action: impl Into<Action>,
        payload: Payload,
    ) -> Result<DispatchOutcome> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.send(Command::Dispatch {
            action: action.into(),
            payload,
            reply: reply_tx,
        })
        .await?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    pub async fn deactivate(&self) -> Result<SessionSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.send(Command::Deactivate { reply: reply_tx }).await?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Current module, phase, and store, or `None` when nothing is active.
    pub async fn snapshot(&self) -> Result<Option<SessionSnapshot>> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.send(Command::Snapshot { reply: reply_tx }).await?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Render the screen of the current phase.
    pub async fn render(&self) -> Result<String> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.send(Command::Render { reply: reply_tx }).await?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    pub async fn translate(&self, key: impl Into<String>) -> Result<String> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.send(Command::Translate {
            key: key.into(),
            reply: reply_tx,
        })
        .await?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    pub(crate) async fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }
}
