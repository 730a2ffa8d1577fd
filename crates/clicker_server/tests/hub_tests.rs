//! Session registry behaviour through the hub: duplicate logins, refusals,
//! and the async run loop.

use std::sync::Arc;
use std::time::Duration;

use clicker_core::identity::Identity;
use clicker_core::persistence::{MemoryStore, StoreEvent};
use clicker_game::terminal::MemorySink;
use clicker_server::hub::{Hub, HubConfig};
use clicker_server::store::FileStore;
use clicker_server::ServerConfig;
use clicker_test_utils::fixtures::player;
use tokio::sync::oneshot;

fn server_hub(store: Arc<MemoryStore>) -> Hub {
    Hub::new(HubConfig::server(&ServerConfig::default()), store)
}

#[test]
fn test_duplicate_login_evicts_before_new_lock() {
    let store = Arc::new(MemoryStore::new());
    let mut hub = server_hub(store.clone());
    let key = player("alice").storage_key().to_string();

    let old_sink = MemorySink::new();
    let old = hub.connect(player("alice"), Box::new(old_sink.clone()), (100, 30)).unwrap();
    let new_sink = MemorySink::new();
    let new = hub.connect(player("alice"), Box::new(new_sink.clone()), (100, 30)).unwrap();
    assert_ne!(old, new);

    assert_eq!(
        store.journal(),
        vec![
            StoreEvent::Acquired(key.clone()),
            StoreEvent::Loaded(key.clone()),
            StoreEvent::Saved(key.clone()),
            StoreEvent::Released(key.clone()),
            StoreEvent::Acquired(key.clone()),
            StoreEvent::Loaded(key.clone()),
        ]
    );

    assert!(old_sink.is_closed());
    assert!(old_sink.take_string().contains("another location"));
    assert!(!new_sink.is_closed());

    assert_eq!(hub.registry().len(), 1);
    assert_eq!(hub.registry().live_for(&player("alice")), Some(new));
    assert!(!hub.scheduler().is_registered(old));

    // A late disconnect for the evicted connection leaves the new one alone.
    hub.disconnect(old);
    assert!(hub.registry().contains(new));
}

#[test]
fn test_evicted_progress_carries_over() {
    let store = Arc::new(MemoryStore::new());
    let mut hub = server_hub(store.clone());

    hub.connect(player("bob"), Box::new(MemorySink::new()), (100, 30)).unwrap();
    hub.tick();
    hub.tick();
    hub.connect(player("bob"), Box::new(MemorySink::new()), (100, 30)).unwrap();

    let saved = store.document(player("bob").storage_key()).unwrap();
    assert!(saved.contains("\"ticks_played\": 2"));
}

#[test]
fn test_different_identities_coexist() {
    let store = Arc::new(MemoryStore::new());
    let mut hub = server_hub(store.clone());
    hub.connect(player("carol"), Box::new(MemorySink::new()), (100, 30)).unwrap();
    hub.connect(player("dave"), Box::new(MemorySink::new()), (100, 30)).unwrap();
    assert_eq!(hub.registry().len(), 2);
    assert!(!store.journal().iter().any(|e| matches!(e, StoreEvent::Released(_))));
}

#[test]
fn test_anonymous_second_session_refused_with_notice() {
    let store = Arc::new(MemoryStore::new());
    let mut hub = Hub::new(HubConfig::local(&ServerConfig::default(), false), store.clone());
    hub.connect(Identity::Anonymous, Box::new(MemorySink::new()), (80, 24)).unwrap();

    let sink = MemorySink::new();
    let err = hub.connect(Identity::Anonymous, Box::new(sink.clone()), (80, 24)).unwrap_err();
    assert!(err.is_save_locked());
    assert!(sink.is_closed());
    assert!(sink.take_string().contains("in use by another session"));
    assert_eq!(hub.registry().len(), 1);
}

#[test]
fn test_file_store_eviction_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()));
    let mut hub = Hub::new(HubConfig::server(&ServerConfig::default()), store.clone());

    let first = hub.connect(player("erin"), Box::new(MemorySink::new()), (100, 30)).unwrap();
    hub.connect(player("erin"), Box::new(MemorySink::new()), (100, 30)).unwrap();
    assert!(!hub.registry().contains(first));
    assert!(store.path_for(&player("erin")).exists());
}

#[tokio::test]
async fn test_run_loop_serves_and_shuts_down() {
    let store = Arc::new(MemoryStore::new());
    let mut config = ServerConfig::default();
    config.tick_rate = 100;
    config.frame_rate = 50;
    let hub = Hub::new(HubConfig::server(&config), store.clone());
    let (handle, events) = Hub::channel();
    let (stop, stopped) = oneshot::channel::<()>();

    let running = tokio::spawn(hub.run(events, async {
        let _ = stopped.await;
    }));

    let sink = MemorySink::new();
    let id = handle
        .connect(player("frank"), Box::new(sink.clone()), (100, 30))
        .await
        .unwrap();
    handle.input(id, b"b".to_vec()).unwrap();
    handle.resize(id, 60, 20).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    stop.send(()).unwrap();
    running.await.unwrap();

    assert!(sink.is_closed());
    assert!(sink.take_string().contains("shutting down"));
    let key = player("frank").storage_key().to_string();
    assert!(store.journal().contains(&StoreEvent::Released(key)));
}

#[tokio::test]
async fn test_local_run_loop_ends_with_session() {
    let store = Arc::new(MemoryStore::new());
    let hub = Hub::new(HubConfig::local(&ServerConfig::default(), false), store.clone());
    let (handle, events) = Hub::channel();
    let running = tokio::spawn(hub.run(events, std::future::pending()));

    let sink = MemorySink::new();
    let id = handle
        .connect(Identity::Anonymous, Box::new(sink.clone()), (80, 24))
        .await
        .unwrap();
    handle.input(id, vec![0x03]).unwrap();

    tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("hub did not stop")
        .unwrap();
    assert!(sink.take_string().contains("Thanks for playing"));
}
