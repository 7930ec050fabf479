// ABOUTME: Durable key-value storage for conversation and presence state using SQLite.
// ABOUTME: Fixed string keys map to opaque byte blobs; an in-memory store backs tests.
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::BotError;

/// Store key for the shared conversation transcript (JSON array)
pub const TRANSCRIPT_KEY: &str = "global_conversation";
/// Store key for the personality/system prompt (raw UTF-8)
pub const PERSONALITY_KEY: &str = "bot_personality";
/// Store key for the presence configuration draft (JSON object)
pub const DRAFT_KEY: &str = "bot_status_data";

/// Process-wide blob storage addressed by fixed string keys
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the blob stored under `key`, `None` if absent
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BotError>;

    /// Store `value` under `key`, replacing any previous blob
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), BotError>;
}

fn persistence(e: impl std::fmt::Display) -> BotError {
    BotError::Persistence(e.to_string())
}

#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file at `db_path`
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, BotError> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(persistence)?;
            }
        }

        let conn = Connection::open(db_path).map_err(persistence)?;
        let store = Self::with_connection(conn)?;

        tracing::info!(db = %db_path.display(), "SqliteStore initialized");
        Ok(store)
    }

    /// In-memory SQLite database, gone when the store is dropped
    pub fn open_in_memory() -> Result<Self, BotError> {
        let conn = Connection::open_in_memory().map_err(persistence)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, BotError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(persistence)?;

        Ok(SqliteStore {
            db: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BotError> {
        let db = self
            .db
            .lock()
            .map_err(|e| BotError::Persistence(format!("Database mutex poisoned: {}", e)))?;
        let mut stmt = db
            .prepare("SELECT value FROM kv WHERE key = ?1")
            .map_err(persistence)?;
        let value = stmt.query_row(params![key], |row| row.get::<_, Vec<u8>>(0));

        match value {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(persistence(e)),
        }
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), BotError> {
        let db = self
            .db
            .lock()
            .map_err(|e| BotError::Persistence(format!("Database mutex poisoned: {}", e)))?;
        let now = chrono::Utc::now().to_rfc3339();
        db.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value, now],
        )
        .map_err(persistence)?;
        tracing::debug!(key = %key, bytes = value.len(), "Stored value");
        Ok(())
    }
}

/// Volatile store for tests and throwaway runs
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BotError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| BotError::Persistence(format!("Store mutex poisoned: {}", e)))?;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), BotError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| BotError::Persistence(format!("Store mutex poisoned: {}", e)))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
