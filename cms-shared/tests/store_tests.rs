/// Integration tests for the collection store
///
/// Run with: cargo test -p cms-shared --test store_tests

use cms_shared::auth::password::{verify_password, PasswordParams};
use cms_shared::models::user::{Role, User};
use cms_shared::store::{
    BootstrapAdmin, Collection, CollectionBackend, CollectionStore, MemoryBackend, StoreError,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn fast_admin() -> BootstrapAdmin {
    BootstrapAdmin {
        params: PasswordParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn test_write_then_read_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = CollectionStore::json_files(dir.path());

    let value = json!([
        { "id": "1", "type": "hero", "content": { "title": "Olá", "n": 1.5 } },
        { "id": "2", "type": "text", "content": {} }
    ]);

    assert!(store.write(Collection::Blocks, &value).await);
    assert_eq!(store.read(Collection::Blocks).await, value);

    // A second handle on the same directory sees the same data
    let reopened = CollectionStore::json_files(dir.path());
    assert_eq!(reopened.read(Collection::Blocks).await, value);
}

#[tokio::test]
async fn test_first_read_persists_default_once() {
    let backend = Arc::new(MemoryBackend::new());
    let store = CollectionStore::new(backend.clone());

    let first = store.read(Collection::Settings).await;
    assert_eq!(first["title"], "My Site");
    assert_eq!(backend.save_count(), 1);
    assert_eq!(backend.load("settings").await.unwrap(), Some(first.clone()));

    let second = store.read(Collection::Settings).await;
    assert_eq!(second, first);
    assert_eq!(backend.save_count(), 1);
}

#[tokio::test]
async fn test_default_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = CollectionStore::json_files(dir.path());

    assert_eq!(store.read(Collection::Logo).await, json!({}));

    let raw = std::fs::read_to_string(dir.path().join("logo.json")).unwrap();
    assert_eq!(raw, "{}");
}

#[tokio::test]
async fn test_corrupt_file_reads_as_default() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("users.json"), "{ this is not json").unwrap();
    let store = CollectionStore::json_files(dir.path());

    assert_eq!(store.read(Collection::Users).await, json!([]));

    // The corrupt file is left for inspection
    let raw = std::fs::read_to_string(dir.path().join("users.json")).unwrap();
    assert_eq!(raw, "{ this is not json");
}

#[tokio::test]
async fn test_write_failure_returns_false() {
    let dir = tempfile::tempdir().unwrap();
    let not_a_dir = dir.path().join("occupied");
    std::fs::write(&not_a_dir, "file").unwrap();

    let store = CollectionStore::json_files(&not_a_dir);

    assert!(!store.write(Collection::Forms, &json!([])).await);
    assert_eq!(store.read(Collection::Forms).await, json!([]));

    let result = store.write_as(Collection::Forms, &Vec::<Value>::new()).await;
    assert!(matches!(result, Err(StoreError::WriteFailed(_))));
}

#[tokio::test]
async fn test_initialize_fresh_store() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("nested").join("data");
    let store = CollectionStore::json_files(&data_dir);

    let report = store.initialize(&fast_admin()).await.unwrap();
    assert!(report.admin_created);
    assert_eq!(report.sizes.len(), Collection::COUNT);

    for collection in Collection::ALL {
        assert!(
            data_dir.join(format!("{}.json", collection.key())).exists(),
            "{collection} should exist"
        );
    }

    let users: Vec<User> = store.read_as(Collection::Users).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, "1");
    assert_eq!(users[0].username, "admin");
    assert_eq!(users[0].role, Role::Admin);
    assert_ne!(users[0].password, "admin123");
    assert!(verify_password("admin123", &users[0].password).unwrap());
}

#[tokio::test]
async fn test_initialize_is_idempotent() {
    let store = CollectionStore::in_memory();

    store.initialize(&fast_admin()).await.unwrap();
    let before: Vec<User> = store.read_as(Collection::Users).await.unwrap();

    let report = store.initialize(&fast_admin()).await.unwrap();
    let after: Vec<User> = store.read_as(Collection::Users).await.unwrap();

    assert!(!report.admin_created);
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_initialize_keeps_existing_users() {
    let store = CollectionStore::in_memory();
    let editor = User::new(
        "5".into(),
        "editor".into(),
        "editor@site.com".into(),
        "hash".into(),
        Role::Editor,
        Default::default(),
    );
    store.write_as(Collection::Users, &vec![editor]).await.unwrap();

    let report = store.initialize(&fast_admin()).await.unwrap();

    assert!(!report.admin_created);
    let users: Vec<User> = store.read_as(Collection::Users).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "editor");
}

#[tokio::test]
async fn test_initialize_recovers_from_wrong_shape_users() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("users.json"), "{}").unwrap();
    let store = CollectionStore::json_files(dir.path());

    let report = store.initialize(&fast_admin()).await.unwrap();
    assert!(report.admin_created);

    let users: Vec<User> = store.read_as(Collection::Users).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "admin");
}

#[tokio::test]
async fn test_initialize_accepts_records_without_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = json!([{
        "id": "9",
        "username": "legacy",
        "email": "legacy@site.com",
        "password": "hash",
        "role": "admin"
    }]);
    std::fs::write(dir.path().join("users.json"), legacy.to_string()).unwrap();
    let store = CollectionStore::json_files(dir.path());

    let report = store.initialize(&fast_admin()).await.unwrap();
    assert!(!report.admin_created);

    let users: Vec<User> = store.read_as(Collection::Users).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "legacy");
    assert_eq!(users[0].role, Role::Admin);
}

#[tokio::test]
async fn test_initialize_fails_when_directory_cannot_be_created() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "file").unwrap();

    let store = CollectionStore::json_files(blocker.join("data"));
    let result = store.initialize(&fast_admin()).await;

    assert!(matches!(result, Err(StoreError::Io { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_do_not_lose_writes() {
    let dir = tempfile::tempdir().unwrap();
    let store = CollectionStore::json_files(dir.path());

    let mut handles = Vec::new();
    for i in 0..32 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .update(Collection::Submissions, |items: &mut Vec<Value>| {
                    items.push(json!({ "id": i.to_string() }));
                    Ok::<_, StoreError>(())
                })
                .await
        }));
    }

    for result in futures::future::join_all(handles).await {
        result.unwrap().unwrap();
    }

    let items: Vec<Value> = store.read_as(Collection::Submissions).await.unwrap();
    assert_eq!(items.len(), 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_first_read_races_update_on_fresh_directory() {
    for _ in 0..20 {
        let dir = tempfile::tempdir().unwrap();
        let store = CollectionStore::json_files(dir.path());

        let reader = {
            let store = store.clone();
            tokio::spawn(async move { store.read(Collection::Forms).await })
        };
        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .update(Collection::Forms, |forms: &mut Vec<Value>| {
                        forms.push(json!({ "id": "contact" }));
                        Ok::<_, StoreError>(())
                    })
                    .await
            })
        };

        reader.await.unwrap();
        writer.await.unwrap().unwrap();

        assert_eq!(store.read(Collection::Forms).await, json!([{ "id": "contact" }]));
    }
}

#[tokio::test]
async fn test_backup_contains_every_collection() {
    let dir = tempfile::tempdir().unwrap();
    let store = CollectionStore::json_files(dir.path());
    store.write(Collection::Blocks, &json!([{ "id": "hero" }])).await;

    let path = store.backup(&dir.path().join("backups")).await.unwrap();

    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("backup-") && name.ends_with(".json"));

    let backup: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    for collection in Collection::ALL {
        assert!(backup.get(collection.key()).is_some(), "{collection} missing");
    }
    assert_eq!(backup["blocks"], json!([{ "id": "hero" }]));
}
