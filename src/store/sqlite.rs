//! `SQLite`-backed key-value store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;

use super::error::StoreError;
use super::kv::{KeyValueStore, StorageKey, StoredRecord};
use super::schema::SCHEMA;

/// Returns the default path for the state database.
///
/// This is `~/.local/share/paperboy/state.db` on Linux.
#[must_use]
pub fn default_state_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("paperboy")
        .join("state.db")
}

/// Key-value store persisting JSON values in `SQLite`.
///
/// Queries run on the blocking pool via `spawn_blocking`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open a store at the specified path.
    ///
    /// Creates parent directories if they don't exist and initializes the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema cannot be applied.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent).await.map_err(|source| {
                    StoreError::CreateDir {
                        path: parent.to_path_buf(),
                        source,
                    }
                })?;
            }
        }

        let path_clone = path.clone();
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, StoreError> {
            let conn =
                Connection::open(&path_clone).map_err(|source| StoreError::DatabaseOpen {
                    path: path_clone,
                    source,
                })?;
            conn.execute_batch(SCHEMA)?;
            Ok(conn)
        })
        .await
        .map_err(|_| StoreError::TaskCancelled)??;

        tracing::debug!(path = %path.display(), "Opened state store");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path),
        })
    }

    /// Open an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or the schema cannot be applied.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let conn = tokio::task::spawn_blocking(|| -> Result<Connection, StoreError> {
            let conn = Connection::open_in_memory()?;
            conn.execute_batch(SCHEMA)?;
            Ok(conn)
        })
        .await
        .map_err(|_| StoreError::TaskCancelled)??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Returns the path to the database, if opened from a file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, keys: &[StorageKey]) -> Result<StoredRecord, StoreError> {
        let keys = keys.to_vec();
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<StoredRecord, StoreError> {
            let conn = conn.blocking_lock();
            let mut record = StoredRecord::default();
            for key in keys {
                let value: Option<String> = conn
                    .query_row(
                        "SELECT value FROM kv WHERE key = ?1",
                        params![key.as_str()],
                        |row| row.get(0),
                    )
                    .optional()?;
                if let Some(json) = value {
                    record.set_entry(key, &json)?;
                }
            }
            Ok(record)
        })
        .await
        .map_err(|_| StoreError::TaskCancelled)?
    }

    async fn set(&self, record: StoredRecord) -> Result<(), StoreError> {
        let entries = record.to_entries()?;
        if entries.is_empty() {
            return Ok(());
        }

        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let mut conn = conn.blocking_lock();
            let tx = conn.transaction()?;
            for (key, json) in entries {
                tx.execute(
                    "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                    params![key.as_str(), json],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(|_| StoreError::TaskCancelled)?
    }
}
