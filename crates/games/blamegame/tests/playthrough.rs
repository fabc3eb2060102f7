//! A full game of blame, from intro to restart.

use std::sync::{Arc, Mutex};

use blamegame::{BlameGame, MODULE_ID};
use party_core::{ErrorSource, GameEvent};
use runtime::{Host, HostConfig, HostHandle, ModuleConfig, ModuleRegistry, RuntimeError, ShellError};
use serde_json::json;

fn host(config: HostConfig) -> (Host, HostHandle, Arc<Mutex<Vec<GameEvent>>>) {
    let registry = Arc::new(ModuleRegistry::new());
    registry.register_module(BlameGame::new()).unwrap();

    let host = Host::builder().config(config).registry(registry).build();
    let handle = host.handle();

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let _subscription = handle.event_bus().subscribe_fn("recorder", move |event| {
        sink.lock().unwrap().push(event.clone());
    });

    (host, handle, events)
}

fn rounds(n: u64) -> HostConfig {
    HostConfig {
        module: ModuleConfig::default().with_setting("rounds", n),
        ..HostConfig::default()
    }
}

#[tokio::test]
async fn full_game_reaches_summary_and_restarts() {
    let (host, handle, events) = host(rounds(2));

    handle.activate(MODULE_ID, None).await.unwrap();
    assert!(handle.render().await.unwrap().starts_with("The Blame Game"));

    assert_eq!(handle.dispatch("start", None).await.unwrap().phase(), "setup");

    // begin is refused until two players joined
    assert_eq!(handle.dispatch("begin", None).await.unwrap().phase(), "setup");
    handle
        .dispatch("add_player", Some(json!({ "name": "Ana" })))
        .await
        .unwrap();
    handle
        .dispatch("add_player", Some(json!({ "name": "Ben" })))
        .await
        .unwrap();
    handle
        .dispatch("add_player", Some(json!({ "name": "Ana" })))
        .await
        .unwrap();

    let snapshot = handle.snapshot().await.unwrap().unwrap();
    assert_eq!(snapshot.store["players"], json!(["Ana", "Ben"]));

    assert_eq!(handle.dispatch("begin", None).await.unwrap().phase(), "playing");
    let screen = handle.render().await.unwrap();
    assert!(screen.contains("Round 1 of 2"), "{screen}");
    assert!(screen.contains("Ana reads"), "{screen}");

    assert_eq!(handle.dispatch("next", None).await.unwrap().phase(), "playing");
    assert!(handle.render().await.unwrap().contains("Ben reads"));
    assert_eq!(handle.dispatch("next", None).await.unwrap().phase(), "summary");

    let content: Vec<u32> = events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            GameEvent::ContentNext { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(content, vec![0, 1]);

    let completed = events
        .lock()
        .unwrap()
        .iter()
        .find_map(|event| match event {
            GameEvent::GameComplete { meta, .. } => Some(meta.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(completed.get("rounds"), Some(&json!(2)));
    assert_eq!(completed.get("players"), Some(&json!(2)));

    assert_eq!(handle.dispatch("restart", None).await.unwrap().phase(), "intro");
    let snapshot = handle.snapshot().await.unwrap().unwrap();
    assert_eq!(snapshot.store["players"], json!([]));
    assert_eq!(snapshot.store["round"], json!(0));

    host.shutdown().await.unwrap();
}

#[tokio::test]
async fn add_player_without_name_is_rejected() {
    let (host, handle, events) = host(HostConfig::default());
    handle.activate(MODULE_ID, None).await.unwrap();
    handle.dispatch("start", None).await.unwrap();

    let err = handle
        .dispatch("add_player", Some(json!({ "name": "  " })))
        .await
        .unwrap_err();

    assert!(matches!(err, RuntimeError::Shell(ShellError::Dispatch(_))));
    assert!(matches!(
        events.lock().unwrap().last(),
        Some(GameEvent::Error { source: ErrorSource::Transition, .. })
    ));
    let snapshot = handle.snapshot().await.unwrap().unwrap();
    assert_eq!(snapshot.phase, "setup");

    host.shutdown().await.unwrap();
}

#[tokio::test]
async fn invalid_rounds_setting_fails_init() {
    let config = HostConfig {
        module: ModuleConfig::default().with_setting("rounds", "zero"),
        ..HostConfig::default()
    };
    let (host, handle, _events) = host(config);

    let err = handle.activate(MODULE_ID, None).await.unwrap_err();

    assert!(matches!(
        err,
        RuntimeError::Shell(ShellError::Hook { stage: ErrorSource::Init, .. })
    ));
    assert!(handle.snapshot().await.unwrap().is_none());

    host.shutdown().await.unwrap();
}

#[tokio::test]
async fn german_locale_renders_german_text() {
    let config = HostConfig {
        module: ModuleConfig {
            locale: "de".to_owned(),
            ..ModuleConfig::default()
        },
        ..HostConfig::default()
    };
    let (host, handle, _events) = host(config);
    handle.activate(MODULE_ID, None).await.unwrap();

    assert!(handle.render().await.unwrap().starts_with("Das Schuldspiel"));
    assert_eq!(handle.translate("summary.title").await.unwrap(), "Alle sind schuld!");

    host.shutdown().await.unwrap();
}
