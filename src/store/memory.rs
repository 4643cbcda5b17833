//! In-memory key-value store.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::error::StoreError;
use super::kv::{KeyValueStore, StorageKey, StoredRecord};

/// Volatile [`KeyValueStore`], used for one-shot runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<StoredRecord>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `record`.
    #[must_use]
    pub fn with_record(record: StoredRecord) -> Self {
        Self {
            record: Mutex::new(record),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: &[StorageKey]) -> Result<StoredRecord, StoreError> {
        Ok(self.record.lock().await.select(keys))
    }

    async fn set(&self, record: StoredRecord) -> Result<(), StoreError> {
        self.record.lock().await.update(record);
        Ok(())
    }
}
