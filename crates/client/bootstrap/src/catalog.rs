//! Modules compiled into the client.

use std::sync::Arc;

use blamegame::BlameGame;
use runtime::{ModuleRegistry, RegistryError};
use tracing::info;

/// Registers every built-in module.
///
/// A duplicate id is a build defect; callers propagate the error and abort
/// startup.
pub fn register_builtin_modules(registry: &ModuleRegistry) -> Result<(), RegistryError> {
    registry.register_module(BlameGame::new())?;

    info!(target: "bootstrap", modules = registry.len(), "Registered built-in modules");
    Ok(())
}

/// A fresh registry holding the built-in modules.
pub fn builtin_registry() -> Result<Arc<ModuleRegistry>, RegistryError> {
    let registry = ModuleRegistry::new();
    register_builtin_modules(&registry)?;
    Ok(Arc::new(registry))
}
