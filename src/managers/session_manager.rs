//! Snapshot persistence for Tabspaces.
//!
//! The whole workspace tree is stored as one JSON blob under a fixed key.
//! There is no incremental persistence: every save replaces the blob.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, OptionalExtension};
use tracing::trace;

use crate::database::connection::Database;
use crate::types::errors::StoreError;
use crate::types::session::WorkspaceSnapshot;

/// Key under which the snapshot blob is stored.
pub const SNAPSHOT_KEY: &str = "workspaces";

/// Durable storage for the workspace snapshot.
pub trait SessionStore: Send {
    /// Returns the last saved snapshot, or `None` on first run.
    fn load(&self) -> Result<Option<WorkspaceSnapshot>, StoreError>;
    fn save(&self, snapshot: &WorkspaceSnapshot) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

fn encode(snapshot: &WorkspaceSnapshot) -> Result<String, StoreError> {
    serde_json::to_string(snapshot).map_err(|e| StoreError::SerializationError(e.to_string()))
}

fn decode(blob: &str) -> Result<WorkspaceSnapshot, StoreError> {
    serde_json::from_str(blob).map_err(|e| StoreError::SerializationError(e.to_string()))
}

/// Snapshot store backed by the SQLite `kv_store` table.
pub struct SqliteSessionStore {
    db: Database,
}

impl SqliteSessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = Database::open(path).map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        Ok(Self::new(db))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let db = Database::open_in_memory().map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        Ok(Self::new(db))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl SessionStore for SqliteSessionStore {
    fn load(&self) -> Result<Option<WorkspaceSnapshot>, StoreError> {
        let blob: Option<String> = self
            .db
            .connection()
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![SNAPSHOT_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        blob.as_deref().map(decode).transpose()
    }

    fn save(&self, snapshot: &WorkspaceSnapshot) -> Result<(), StoreError> {
        let blob = encode(snapshot)?;
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;

        self.db
            .connection()
            .execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![SNAPSHOT_KEY, blob, timestamp],
            )
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        trace!(bytes = blob.len(), "snapshot saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.db
            .connection()
            .execute("DELETE FROM kv_store WHERE key = ?1", params![SNAPSHOT_KEY])
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

/// In-memory snapshot store. Clones share the same blob, so a test can keep
/// one handle while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    blob: Arc<Mutex<Option<String>>>,
    saves: Arc<AtomicUsize>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `snapshot`.
    pub fn with_snapshot(snapshot: &WorkspaceSnapshot) -> Result<Self, StoreError> {
        let store = Self::new();
        *store.lock()? = Some(encode(snapshot)?);
        Ok(store)
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The raw JSON blob, as the host would hold it.
    pub fn raw(&self) -> Option<String> {
        self.lock().ok().and_then(|blob| blob.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, StoreError> {
        self.blob
            .lock()
            .map_err(|e| StoreError::DatabaseError(format!("store poisoned: {}", e)))
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<WorkspaceSnapshot>, StoreError> {
        self.lock()?.as_deref().map(decode).transpose()
    }

    fn save(&self, snapshot: &WorkspaceSnapshot) -> Result<(), StoreError> {
        let blob = encode(snapshot)?;
        *self.lock()? = Some(blob);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.lock()? = None;
        Ok(())
    }
}
