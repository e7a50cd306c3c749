//! File-backed persistence and write ordering

use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use todo_store::{
    FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, TodoList, TodoStore,
    DEFAULT_STORAGE_KEY,
};

#[tokio::test]
async fn test_file_store_survives_restart() {
    let dir = tempdir().unwrap();

    let expected = {
        let store = TodoStore::new(FileKeyValueStore::new(dir.path()));
        store.load().await;
        let list = store.add("Water plants").await.unwrap();
        let id = list.items()[0].id.clone();
        store.add("Call mum").await.unwrap();
        store.toggle_complete(&id).await
    };

    let store = TodoStore::new(FileKeyValueStore::new(dir.path()));
    let loaded = store.load().await;

    assert_eq!(loaded, expected);
    assert!(loaded.items()[0].completed);
    assert!(!loaded.items()[1].completed);
}

#[tokio::test]
async fn test_loads_list_written_without_completed_flags() {
    let dir = tempdir().unwrap();
    let backend = FileKeyValueStore::new(dir.path());
    backend
        .set(
            DEFAULT_STORAGE_KEY,
            r#"[{"id":"5f0c","text":"Buy milk"},{"id":"9a1b","text":"Walk dog","completed":true}]"#,
        )
        .await
        .unwrap();

    let store = TodoStore::new(backend);
    let list = store.load().await;

    assert_eq!(list.len(), 2);
    assert!(!list.get("5f0c").unwrap().completed);
    assert!(list.get("9a1b").unwrap().completed);
}

#[tokio::test]
async fn test_empty_directory_loads_empty_list() {
    let dir = tempdir().unwrap();
    let store = TodoStore::new(FileKeyValueStore::new(dir.path().join("fresh")));

    assert!(store.load().await.is_empty());
}

#[tokio::test]
async fn test_concurrent_mutations_end_consistent() {
    let storage = MemoryKeyValueStore::new().with_write_delay(Duration::from_millis(5));
    let store = Arc::new(TodoStore::new(storage.clone()));

    let handles: Vec<_> = (0..10)
        .map(|n| {
            let store = store.clone();
            tokio::spawn(async move { store.add(&format!("task {}", n)).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let raw = storage.raw(DEFAULT_STORAGE_KEY).await.unwrap();
    let persisted: TodoList = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted, store.items().await);
    assert_eq!(persisted.len(), 10);
    assert!(storage.write_count() <= 10);
}

#[tokio::test]
async fn test_queued_writes_are_superseded() {
    let storage = MemoryKeyValueStore::new().with_write_delay(Duration::from_millis(50));
    let store = Arc::new(TodoStore::new(storage.clone()));

    let first = {
        let store = store.clone();
        tokio::spawn(async move { store.add("first").await })
    };
    // Let the first write get in flight
    tokio::time::sleep(Duration::from_millis(10)).await;

    let queued: Vec<_> = ["second", "third", "fourth"]
        .into_iter()
        .map(|text| {
            let store = store.clone();
            tokio::spawn(async move { store.add(text).await })
        })
        .collect();

    first.await.unwrap().unwrap();
    for handle in queued {
        handle.await.unwrap().unwrap();
    }

    // One write for "first", one covering the three queued adds
    assert_eq!(storage.write_count(), 2);
    let raw = storage.raw(DEFAULT_STORAGE_KEY).await.unwrap();
    let persisted: TodoList = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted.len(), 4);
    assert_eq!(persisted, store.items().await);
}
