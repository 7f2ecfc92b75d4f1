use std::sync::Arc;
use std::time::Duration;

use hoverlex_config::Config;
use hoverlex_config::dictionary::DictionaryConfig;
use hoverlex_core::AppState;
use hoverlex_types::AppEvent;
use tokio::time::timeout;

use super::scratch_dir;
use crate::controller::{AppController, load_dictionary};
use crate::platform::Platform;

async fn drain(tasks: &mut tokio::task::JoinSet<anyhow::Result<()>>) {
    timeout(Duration::from_secs(2), async {
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }
    })
    .await
    .expect("tasks did not stop");
}

#[tokio::test]
async fn test_trigger_without_pointer_dispatches_nothing() {
    let state = Arc::new(AppState::new(Config::default()));
    let controller = AppController::new(state.clone());
    let mut tasks = controller.spawn_tasks(Platform::inert(), None).await.unwrap();

    // The inert pointer is unknown, so a trigger cannot dispatch
    controller.events().send(AppEvent::Trigger).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(state.stats.counts().dispatched, 0);

    controller.shutdown();
    drain(&mut tasks).await;
}

#[tokio::test]
async fn test_shutdown_event_stops_the_coordinator() {
    let state = Arc::new(AppState::new(Config::default()));
    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks(Platform::inert(), None).await.unwrap();

    controller.events().send(AppEvent::Shutdown).await.unwrap();
    let first = timeout(Duration::from_secs(2), tasks.join_next())
        .await
        .unwrap()
        .unwrap();
    assert!(first.unwrap().is_ok());

    controller.shutdown();
    drain(&mut tasks).await;
}

#[test]
fn test_dictionary_is_loaded_only_when_enabled() {
    let path = scratch_dir().join("words.json");
    std::fs::write(&path, r#"[{ "word": "apple", "phonetic": "/ˈæpl/" }]"#).unwrap();

    let mut config = DictionaryConfig {
        path: Some(path),
        ..Default::default()
    };
    let dictionary = load_dictionary(&config).unwrap();
    assert!(dictionary.lookup("Apple").is_some());

    config.enabled = false;
    assert!(load_dictionary(&config).is_none());

    config.enabled = true;
    config.path = Some(scratch_dir().join("missing.json"));
    assert!(load_dictionary(&config).is_none());
}
