//! Record store round trips through an on-disk SQLite file.

use std::path::PathBuf;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use practice_core::clock::SystemClock;
use practice_core::{NewCustomer, RecordStore};
use practice_db_sqlite::SqliteSnapshotStore;

/// A fresh database path under the system temp dir.
fn temp_db(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{name}-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

async fn open(path: &PathBuf) -> RecordStore {
    let storage = SqliteSnapshotStore::new(path.to_str().unwrap()).await.unwrap();
    storage.run_migrations().await.unwrap();
    RecordStore::open(Box::new(storage), "shiatsu_db", Arc::new(SystemClock))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_snapshot_survives_reopen() {
    let path = temp_db("practice-persist");

    let mut store = open(&path).await;
    store.load_demo().await.unwrap();
    store
        .add_customer(NewCustomer::named("Maria Schmidt"))
        .await
        .unwrap();
    let expected = store.database().clone();
    drop(store);

    let reopened = open(&path).await;
    assert_eq!(reopened.database(), &expected);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_new_file_opens_empty() {
    let path = temp_db("practice-empty");

    let store = open(&path).await;
    assert!(store.database().is_empty());

    let _ = std::fs::remove_file(&path);
}
