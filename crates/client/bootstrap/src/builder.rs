//! Builds the host, registry, and storage used by front-ends.
use std::sync::Arc;

use anyhow::{Context, Result};
use runtime::{FileStore, Host, InMemoryStore, KeyValueStore, ModuleRegistry};
use tracing::info;

use crate::catalog::builtin_registry;
use crate::config::ClientConfig;

/// Builder that assembles the registry, storage, and host for clients.
pub struct ClientBuilder {
    config: ClientConfig,
    registry: Option<Arc<ModuleRegistry>>,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            registry: None,
        }
    }

    /// Provide a custom registry instead of the built-in catalog.
    pub fn registry(mut self, registry: Arc<ModuleRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub async fn build(self) -> Result<HostSetup> {
        let registry = match self.registry {
            Some(registry) => registry,
            None => builtin_registry().context("failed to register built-in modules")?,
        };

        let storage: Arc<dyn KeyValueStore> = if self.config.host.persist_module_state {
            let dir = self.config.storage_dir();
            let store = FileStore::new(&dir)
                .with_context(|| format!("failed to open data directory {}", dir.display()))?;
            info!(
                target: "bootstrap",
                dir = %store.base_dir().display(),
                "Persisting module state"
            );
            Arc::new(store)
        } else {
            Arc::new(InMemoryStore::new())
        };

        let host = Host::builder()
            .config(self.config.host.clone())
            .registry(registry)
            .storage(storage)
            .build();

        if let Some(module) = &self.config.start_module {
            host.handle()
                .activate(module.as_str(), None)
                .await
                .with_context(|| format!("failed to activate module '{module}'"))?;
        }

        Ok(HostSetup {
            config: self.config,
            host,
        })
    }
}

pub struct HostSetup {
    pub config: ClientConfig,
    pub host: Host,
}
