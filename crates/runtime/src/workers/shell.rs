//! Shell worker that owns the authoritative [`HostShell`].
//!
//! Receives commands from [`HostHandle`](crate::api::HostHandle), applies
//! them to the shell, and replies over oneshot channels. Commands queue in
//! the mpsc channel while a transition is running.

use tokio::sync::{mpsc, oneshot};

use party_core::{Action, ModuleId, Payload, PhaseId};
use tracing::{debug, info, warn};

use crate::api::Result;
use crate::shell::{DispatchOutcome, HostShell, SessionSnapshot};

/// Commands that can be sent to the shell worker
pub enum Command {
    /// Activate a registered module, replacing any active one.
    Activate {
        module_id: ModuleId,
        entry: Option<PhaseId>,
        reply: oneshot::Sender<Result<SessionSnapshot>>,
    },
    /// Dispatch an action to the active module.
    Dispatch {
        action: Action,
        payload: Payload,
        reply: oneshot::Sender<Result<DispatchOutcome>>,
    },
    Deactivate {
        reply: oneshot::Sender<Result<SessionSnapshot>>,
    },
    Snapshot {
        reply: oneshot::Sender<Option<SessionSnapshot>>,
    },
    Render {
        reply: oneshot::Sender<Result<String>>,
    },
    Translate {
        key: String,
        reply: oneshot::Sender<Result<String>>,
    },
    /// Deactivate the active module and stop the worker loop.
    Shutdown { reply: oneshot::Sender<()> },
}

/// Background task that processes host commands.
pub struct ShellWorker {
    shell: HostShell,
    command_rx: mpsc::Receiver<Command>,
}

impl ShellWorker {
    pub fn new(shell: HostShell, command_rx: mpsc::Receiver<Command>) -> Self {
        Self { shell, command_rx }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    if !self.handle_command(cmd).await {
                        break;
                    }
                }
                else => break,
            }
        }

        self.stop().await;
        info!(target: "runtime::shell", "ShellWorker stopped");
    }

    /// Returns `false` once the worker should stop.
    async fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Activate {
                module_id,
                entry,
                reply,
            } => {
                let result = self
                    .shell
                    .activate(&module_id, entry)
                    .await
                    .map_err(Into::into);
                if reply.send(result).is_err() {
                    debug!("Activate reply channel closed (caller dropped)");
                }
            }
            Command::Dispatch {
                action,
                payload,
                reply,
            } => {
                let result = self
                    .shell
                    .dispatch(action, payload)
                    .await
                    .map_err(Into::into);
                if reply.send(result).is_err() {
                    debug!("Dispatch reply channel closed (caller dropped)");
                }
            }
            Command::Deactivate { reply } => {
                let result = self.shell.deactivate().await.map_err(Into::into);
                if reply.send(result).is_err() {
                    debug!("Deactivate reply channel closed (caller dropped)");
                }
            }
            Command::Snapshot { reply } => {
                if reply.send(self.shell.snapshot()).is_err() {
                    debug!("Snapshot reply channel closed (caller dropped)");
                }
            }
            Command::Render { reply } => {
                if reply.send(self.shell.render().map_err(Into::into)).is_err() {
                    debug!("Render reply channel closed (caller dropped)");
                }
            }
            Command::Translate { key, reply } => {
                if reply
                    .send(self.shell.translate(&key).map_err(Into::into))
                    .is_err()
                {
                    debug!("Translate reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown { reply } => {
                self.stop().await;
                if reply.send(()).is_err() {
                    debug!("Shutdown reply channel closed (caller dropped)");
                }
                return false;
            }
        }
        true
    }

    async fn stop(&mut self) {
        if self.shell.is_active()
            && let Err(e) = self.shell.deactivate().await
        {
            warn!(target: "runtime::shell", error = %e, "Module failed to exit during shutdown");
        }
    }
}
