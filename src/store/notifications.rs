//! Serialized read-modify-write access to the notification state.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::fetcher::ReplyBatch;

use super::error::StoreError;
use super::kv::{KeyValueStore, StorageKey, StoredRecord};
use super::memory::MemoryStore;
use super::sqlite::SqliteStore;
use super::state::NotificationState;

/// Notification state on top of a [`KeyValueStore`].
///
/// Every mutation re-reads the stored state and writes it back while holding
/// one lock, so a refresh merge and a user clear never overwrite each other.
#[derive(Clone)]
pub struct NotificationStore {
    kv: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for NotificationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationStore").finish_non_exhaustive()
    }
}

impl NotificationStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Open a store persisted in the `SQLite` database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let kv = SqliteStore::open(path).await?;
        Ok(Self::new(Arc::new(kv)))
    }

    /// Create a store that lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Read the full notification state.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    pub async fn load(&self) -> Result<NotificationState, StoreError> {
        Ok(self.kv.get(&StorageKey::ALL).await?.into())
    }

    /// Change the tracked user. Data stored for other users is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    pub async fn set_username(&self, username: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.kv
            .set(StoredRecord {
                username: Some(username.to_string()),
                ..StoredRecord::default()
            })
            .await?;
        tracing::info!(username, "Tracked user changed");
        Ok(())
    }

    /// Merge a fetched batch for `username` and persist it.
    ///
    /// Returns the badge count after the merge.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    pub async fn apply_refresh(
        &self,
        username: &str,
        batch: &ReplyBatch,
        now: i64,
    ) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().await;
        let state = self.load().await?;
        let merged = state.merged(username, batch, now);

        self.kv
            .set(StoredRecord {
                username: None,
                replies: Some(merged.replies.clone()),
                last_refresh: Some(merged.last_refresh.clone()),
                highest_seen: batch.watermark.map(|_| merged.highest_seen.clone()),
            })
            .await?;

        tracing::debug!(
            username,
            new_replies = batch.len(),
            watermark = ?batch.watermark,
            "Stored refresh"
        );
        Ok(merged.badge_count())
    }

    /// Remove one reply from the tracked user's list.
    ///
    /// Returns the badge count afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    pub async fn clear_reply(&self, post_id: u64) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().await;
        let state = self.load().await?;
        let Some(username) = state.username.clone() else {
            return Ok(0);
        };

        let updated = state.without_reply(&username, post_id);
        self.kv
            .set(StoredRecord {
                replies: Some(updated.replies.clone()),
                ..StoredRecord::default()
            })
            .await?;
        Ok(updated.badge_count())
    }

    /// Remove every reply from the tracked user's list.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    pub async fn clear_all(&self) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().await;
        let state = self.load().await?;
        let Some(username) = state.username.clone() else {
            return Ok(0);
        };

        let updated = state.cleared(&username);
        self.kv
            .set(StoredRecord {
                replies: Some(updated.replies),
                ..StoredRecord::default()
            })
            .await?;
        Ok(0)
    }
}
