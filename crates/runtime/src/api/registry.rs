//! Module registry shared by bootstrap code and the host shell.
//!
//! The [`ModuleRegistry`] maps module ids to their descriptors. It is an
//! explicit object handed to whoever needs it (usually as
//! `Arc<ModuleRegistry>`), so tests can run any number of isolated registries
//! side by side.
//!
//! # Invariants
//!
//! - Module ids are unique. Registering an id twice fails and leaves the
//!   registry untouched; there is no replace or update operation.
//! - Modules are never removed once registered.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use party_core::ModuleId;
use thiserror::Error;
use tracing::{debug, error};

use crate::module::GameModule;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("module '{0}' is already registered")]
    DuplicateModule(ModuleId),

    #[error("module registry lock was poisoned")]
    LockPoisoned,
}

#[derive(Default)]
struct Modules {
    by_id: HashMap<ModuleId, Arc<dyn GameModule>>,
    /// Registration order, for deterministic listing.
    order: Vec<ModuleId>,
}

/// Process-wide map from module id to [`GameModule`].
///
/// ```text
/// ModuleRegistry
/// ├── by_id: HashMap<ModuleId, Arc<dyn GameModule>>
/// └── order: Vec<ModuleId>  (insertion order)
/// ```
#[derive(Default)]
pub struct ModuleRegistry {
    modules: RwLock<Modules>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `module` under its id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateModule`] if the id is taken. The
    /// error signals a build or configuration defect; startup code should
    /// propagate it rather than continue.
    pub fn register(&self, module: Arc<dyn GameModule>) -> Result<(), RegistryError> {
        let id = module.id().clone();
        let mut modules = self
            .modules
            .write()
            .map_err(|_| RegistryError::LockPoisoned)?;

        if modules.by_id.contains_key(&id) {
            error!(
                target: "runtime::registry",
                module = %id,
                "Rejected duplicate module registration"
            );
            return Err(RegistryError::DuplicateModule(id));
        }

        modules.order.push(id.clone());
        modules.by_id.insert(id.clone(), module);
        debug!(target: "runtime::registry", module = %id, "Registered module");

        Ok(())
    }

    /// Convenience for registering a concrete module value.
    pub fn register_module(
        &self,
        module: impl GameModule + 'static,
    ) -> Result<(), RegistryError> {
        self.register(Arc::new(module))
    }

    /// Looks a module up. `None` means it was never registered.
    pub fn get(&self, id: &ModuleId) -> Option<Arc<dyn GameModule>> {
        self.modules
            .read()
            .ok()
            .and_then(|modules| modules.by_id.get(id).cloned())
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.modules
            .read()
            .map(|modules| modules.by_id.contains_key(id))
            .unwrap_or(false)
    }

    /// Snapshot of all modules in registration order.
    pub fn list(&self) -> Vec<Arc<dyn GameModule>> {
        self.modules
            .read()
            .map(|modules| {
                modules
                    .order
                    .iter()
                    .filter_map(|id| modules.by_id.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> Vec<ModuleId> {
        self.modules
            .read()
            .map(|modules| modules.order.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.modules
            .read()
            .map(|modules| modules.order.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{ModuleContext, ScreenMap};
    use crate::phases::{HookError, PhaseControllerMap};
    use async_trait::async_trait;
    use party_core::PhaseId;

    struct StubModule {
        id: ModuleId,
        label: &'static str,
    }

    impl StubModule {
        fn new(id: &str, label: &'static str) -> Self {
            Self {
                id: ModuleId::from(id),
                label,
            }
        }
    }

    #[async_trait]
    impl GameModule for StubModule {
        fn id(&self) -> &ModuleId {
            &self.id
        }

        fn entry_phase(&self) -> PhaseId {
            PhaseId::from(self.label)
        }

        async fn init(&self, _ctx: &ModuleContext<'_>) -> Result<(), HookError> {
            Ok(())
        }

        fn register_screens(&self) -> ScreenMap {
            ScreenMap::new()
        }

        fn phase_controllers(&self) -> PhaseControllerMap {
            PhaseControllerMap::new()
        }
    }

    #[test]
    fn duplicate_ids_are_rejected_and_first_module_kept() {
        let registry = ModuleRegistry::new();
        registry
            .register_module(StubModule::new("blamegame", "first"))
            .unwrap();

        let err = registry
            .register_module(StubModule::new("blamegame", "second"))
            .unwrap_err();

        assert_eq!(err, RegistryError::DuplicateModule("blamegame".into()));
        assert_eq!(registry.list().len(), 1);
        let kept = registry.get(&"blamegame".into()).unwrap();
        assert_eq!(kept.entry_phase(), "first");
    }

    #[test]
    fn list_returns_every_distinct_module() {
        let registry = ModuleRegistry::new();
        let ids = ["blamegame", "quiz", "charades", "hot_takes"];
        for id in ids {
            registry.register_module(StubModule::new(id, "intro")).unwrap();
        }

        let listed = registry.list();
        assert_eq!(listed.len(), ids.len());
        for id in ids {
            let module = registry.get(&id.into()).unwrap();
            assert_eq!(module.id(), &ModuleId::from(id));
        }
        assert_eq!(
            registry.ids(),
            ids.iter().map(|id| ModuleId::from(*id)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn absent_modules_are_none() {
        let registry = ModuleRegistry::new();
        assert!(registry.get(&"missing".into()).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn registries_are_isolated() {
        let a = ModuleRegistry::new();
        let b = ModuleRegistry::new();
        a.register_module(StubModule::new("blamegame", "intro")).unwrap();

        assert!(b.register_module(StubModule::new("blamegame", "intro")).is_ok());
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
    }
}
