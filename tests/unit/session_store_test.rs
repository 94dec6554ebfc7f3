//! Unit tests for snapshot persistence: the SQLite store and the in-memory store.

use rstest::rstest;
use tempfile::TempDir;

use tabspaces::managers::session_manager::{
    MemorySessionStore, SessionStore, SqliteSessionStore, SNAPSHOT_KEY,
};
use tabspaces::types::errors::StoreError;
use tabspaces::types::session::{GroupSnapshot, WorkspaceSnapshot};
use tabspaces::types::tab::Oid;

fn sample() -> WorkspaceSnapshot {
    WorkspaceSnapshot {
        active_group_oid: Oid::from("g2"),
        groups: vec![
            GroupSnapshot {
                oid: Oid::from("g1"),
                name: "Work".to_string(),
                active_tab_oid: Some(Oid::from("t2")),
                tabs: vec![Oid::from("t1"), Oid::from("t2")],
            },
            GroupSnapshot {
                oid: Oid::from("g2"),
                name: "Empty".to_string(),
                active_tab_oid: None,
                tabs: vec![],
            },
        ],
    }
}

#[rstest]
#[case::sqlite(Box::new(SqliteSessionStore::open_in_memory().unwrap()) as Box<dyn SessionStore>)]
#[case::memory(Box::new(MemorySessionStore::new()) as Box<dyn SessionStore>)]
fn test_store_save_load_clear(#[case] store: Box<dyn SessionStore>) {
    assert_eq!(store.load().unwrap(), None);

    store.save(&sample()).unwrap();
    assert_eq!(store.load().unwrap(), Some(sample()));

    // A second save replaces the blob.
    let mut changed = sample();
    changed.groups.pop();
    changed.active_group_oid = Oid::from("g1");
    store.save(&changed).unwrap();
    assert_eq!(store.load().unwrap(), Some(changed));

    store.clear().unwrap();
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn test_sqlite_store_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("tabspaces.db");
    let path = path.to_str().unwrap();

    SqliteSessionStore::open(path).unwrap().save(&sample()).unwrap();

    let reopened = SqliteSessionStore::open(path).unwrap();
    assert_eq!(reopened.load().unwrap(), Some(sample()));
}

#[test]
fn test_sqlite_store_keeps_one_row() {
    let store = SqliteSessionStore::open_in_memory().unwrap();
    store.save(&sample()).unwrap();
    store.save(&sample()).unwrap();

    let rows: i64 = store
        .database()
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM kv_store WHERE key = ?1",
            [SNAPSHOT_KEY],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn test_corrupt_blob_is_a_serialization_error() {
    let store = SqliteSessionStore::open_in_memory().unwrap();
    store
        .database()
        .connection()
        .execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, 'not json', 0)",
            [SNAPSHOT_KEY],
        )
        .unwrap();

    assert!(matches!(store.load(), Err(StoreError::SerializationError(_))));
}

#[test]
fn test_snapshot_wire_format() {
    let store = MemorySessionStore::new();
    store.save(&sample()).unwrap();

    let value: serde_json::Value = serde_json::from_str(&store.raw().unwrap()).unwrap();
    assert_eq!(value["activeGroupOid"], "g2");
    assert_eq!(value["groups"][0]["oid"], "g1");
    assert_eq!(value["groups"][0]["activeTabOid"], "t2");
    assert_eq!(value["groups"][0]["tabs"], serde_json::json!(["t1", "t2"]));
    assert!(value["groups"][1]["activeTabOid"].is_null());
}

#[test]
fn test_legacy_field_names_are_accepted() {
    let legacy = r#"{
        "active": "g1",
        "groups": [{"yuki": "g1", "name": "Old", "active": "t1", "tabs": ["t1"]}]
    }"#;
    let snapshot: WorkspaceSnapshot = serde_json::from_str(legacy).unwrap();

    assert_eq!(snapshot.active_group_oid, Oid::from("g1"));
    assert_eq!(snapshot.groups[0].oid, Oid::from("g1"));
    assert_eq!(snapshot.groups[0].active_tab_oid, Some(Oid::from("t1")));
}

#[test]
fn test_memory_store_clones_share_state() {
    let store = MemorySessionStore::new();
    let other = store.clone();

    store.save(&sample()).unwrap();

    assert_eq!(other.load().unwrap(), Some(sample()));
    assert_eq!(other.save_count(), 1);
    let seeded = MemorySessionStore::with_snapshot(&sample()).unwrap();
    assert_eq!(seeded.load().unwrap(), Some(sample()));
    assert_eq!(seeded.save_count(), 0);
}
