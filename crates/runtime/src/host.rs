//! Host orchestrator.
//!
//! The host owns the shell worker, wires up the command channel, and exposes
//! a builder-based API for clients to drive game modules.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::{HostHandle, ModuleRegistry, Result, RuntimeError};
use crate::events::{BusConfig, EventBus};
use crate::module::ModuleConfig;
use crate::repository::{InMemoryStore, KeyValueStore};
use crate::shell::HostShell;
use crate::workers::{Command, ShellWorker};

/// Host configuration shared by the shell and its worker.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Passed to every module through its context.
    pub module: ModuleConfig,
    pub player_id: Option<String>,
    pub room_id: Option<String>,
    /// Save each module's store after every change and restore it on
    /// activation.
    pub persist_module_state: bool,
    /// Capacity of the command channel; `0` is treated as `1`.
    pub command_buffer_size: usize,
    /// Upper bound of queued actions processed after one outer call.
    pub max_chained_dispatches: usize,
    pub bus: BusConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            module: ModuleConfig::default(),
            player_id: None,
            room_id: None,
            persist_module_state: false,
            command_buffer_size: 32,
            max_chained_dispatches: 16,
            bus: BusConfig::default(),
        }
    }
}

/// Runs a [`HostShell`] on a background task.
///
/// [`HostHandle`] provides a cloneable façade for clients.
pub struct Host {
    handle: HostHandle,
    worker_handle: JoinHandle<()>,
}

impl Host {
    pub fn builder() -> HostBuilder {
        HostBuilder::new()
    }

    /// Cloneable handle to this host.
    pub fn handle(&self) -> HostHandle {
        self.handle.clone()
    }

    pub fn event_bus(&self) -> &EventBus {
        self.handle.event_bus()
    }

    /// Deactivates the active module and stops the worker.
    pub async fn shutdown(self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .handle
            .send(Command::Shutdown { reply: reply_tx })
            .await
            .is_ok()
            && reply_rx.await.is_err()
        {
            debug!(target: "runtime::shell", "worker stopped before acknowledging shutdown");
        }

        drop(self.handle);
        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`Host`].
pub struct HostBuilder {
    config: HostConfig,
    registry: Option<Arc<ModuleRegistry>>,
    event_bus: Option<EventBus>,
    storage: Option<Arc<dyn KeyValueStore>>,
}

impl HostBuilder {
    fn new() -> Self {
        Self {
            config: HostConfig::default(),
            registry: None,
            event_bus: None,
            storage: None,
        }
    }

    pub fn config(mut self, config: HostConfig) -> Self {
        self.config = config;
        self
    }

    /// Modules the host may activate. Defaults to an empty registry.
    pub fn registry(mut self, registry: Arc<ModuleRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Bus to publish on. Defaults to a new bus built from
    /// [`HostConfig::bus`].
    pub fn event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Backing store for persisted module state. Defaults to memory.
    pub fn storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Spawns the shell worker. Must be called within a Tokio runtime.
    pub fn build(self) -> Host {
        let registry = self.registry.unwrap_or_default();
        let event_bus = self
            .event_bus
            .unwrap_or_else(|| EventBus::with_config(self.config.bus.clone()));
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(InMemoryStore::new()));

        // tokio rejects a zero-capacity channel.
        let buffer = self.config.command_buffer_size.max(1);
        let (command_tx, command_rx) = mpsc::channel::<Command>(buffer);
        let handle = HostHandle::new(command_tx, event_bus.clone(), Arc::clone(&registry));

        let shell = HostShell::new(self.config, registry, event_bus, storage);
        let worker = ShellWorker::new(shell, command_rx);
        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Host {
            handle,
            worker_handle,
        }
    }
}
