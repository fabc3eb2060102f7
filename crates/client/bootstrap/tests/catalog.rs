use std::sync::Arc;

use blamegame::MODULE_ID;
use client_bootstrap::{ClientBuilder, ClientConfig, builtin_registry, register_builtin_modules};
use party_core::ModuleId;
use runtime::{FileStore, JsonStoreExt, KeyValueStore, ModuleRegistry, RegistryError};
use tempfile::TempDir;

#[test]
fn builtin_catalog_contains_blamegame() {
    let registry = builtin_registry().unwrap();
    assert_eq!(registry.ids(), vec![ModuleId::from(MODULE_ID)]);
}

#[test]
fn registering_the_catalog_twice_is_rejected() {
    let registry = ModuleRegistry::new();
    register_builtin_modules(&registry).unwrap();

    let err = register_builtin_modules(&registry).unwrap_err();

    assert_eq!(err, RegistryError::DuplicateModule(ModuleId::from(MODULE_ID)));
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn builder_activates_the_start_module() {
    let config = ClientConfig::from_vars([("LOF_MODULE", MODULE_ID)]);

    let setup = ClientBuilder::new(config).build().await.unwrap();
    let snapshot = setup.host.handle().snapshot().await.unwrap().unwrap();

    assert_eq!(snapshot.module_id, MODULE_ID);
    assert_eq!(snapshot.phase, "intro");

    setup.host.shutdown().await.unwrap();
}

#[tokio::test]
async fn unknown_start_module_fails_the_build() {
    let config = ClientConfig::from_vars([("LOF_MODULE", "charades")]);
    assert!(ClientBuilder::new(config).build().await.is_err());
}

#[tokio::test]
async fn persisted_state_lands_in_the_data_dir() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().to_string_lossy().into_owned();
    let config = ClientConfig::from_vars([
        ("LOF_PERSIST", "true".to_owned()),
        ("LOF_DATA_DIR", data_dir),
        ("LOF_MODULE", MODULE_ID.to_owned()),
    ]);

    let setup = ClientBuilder::new(config).build().await.unwrap();
    let handle = setup.host.handle();
    handle.dispatch("start", None).await.unwrap();
    setup.host.shutdown().await.unwrap();

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()).unwrap());
    assert!(store.contains("lof:blamegame:state").unwrap());
    let saved: serde_json::Value = store.get_json("lof:blamegame:state").unwrap().unwrap();
    assert_eq!(saved["round"], 0);
}
