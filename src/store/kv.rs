//! Key-value storage boundary.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::fetcher::Reply;

use super::StoreError;

/// Keys of the notifier's persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Username,
    Replies,
    LastRefresh,
    HighestSeen,
}

impl StorageKey {
    pub const ALL: [Self; 4] = [
        Self::Username,
        Self::Replies,
        Self::LastRefresh,
        Self::HighestSeen,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Replies => "replies",
            Self::LastRefresh => "lastRefresh",
            Self::HighestSeen => "highestSeen",
        }
    }
}

/// A partial view of the persisted record.
///
/// `None` fields were either not requested or not stored yet; on `set`,
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Username -> replies, newest first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replies: Option<HashMap<String, Vec<Reply>>>,
    /// Username -> unix seconds of the last successful refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<HashMap<String, i64>>,
    /// Username -> largest reply id delivered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest_seen: Option<HashMap<String, u64>>,
}

impl StoredRecord {
    /// Encode the present fields as `(key, json)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be serialized.
    pub fn to_entries(&self) -> Result<Vec<(StorageKey, String)>, serde_json::Error> {
        let mut entries = Vec::new();
        if let Some(username) = &self.username {
            entries.push((StorageKey::Username, serde_json::to_string(username)?));
        }
        if let Some(replies) = &self.replies {
            entries.push((StorageKey::Replies, serde_json::to_string(replies)?));
        }
        if let Some(last_refresh) = &self.last_refresh {
            entries.push((StorageKey::LastRefresh, serde_json::to_string(last_refresh)?));
        }
        if let Some(highest_seen) = &self.highest_seen {
            entries.push((StorageKey::HighestSeen, serde_json::to_string(highest_seen)?));
        }
        Ok(entries)
    }

    /// Decode `json` into the field for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` does not match the field's type.
    pub fn set_entry(&mut self, key: StorageKey, json: &str) -> Result<(), serde_json::Error> {
        match key {
            StorageKey::Username => self.username = Some(serde_json::from_str(json)?),
            StorageKey::Replies => self.replies = Some(serde_json::from_str(json)?),
            StorageKey::LastRefresh => self.last_refresh = Some(serde_json::from_str(json)?),
            StorageKey::HighestSeen => self.highest_seen = Some(serde_json::from_str(json)?),
        }
        Ok(())
    }

    /// Overwrite fields with the ones present in `other`.
    pub fn update(&mut self, other: Self) {
        if other.username.is_some() {
            self.username = other.username;
        }
        if other.replies.is_some() {
            self.replies = other.replies;
        }
        if other.last_refresh.is_some() {
            self.last_refresh = other.last_refresh;
        }
        if other.highest_seen.is_some() {
            self.highest_seen = other.highest_seen;
        }
    }

    /// Copy of this record with only `keys` kept.
    #[must_use]
    pub fn select(&self, keys: &[StorageKey]) -> Self {
        let mut selected = Self::default();
        for key in keys {
            match key {
                StorageKey::Username => selected.username.clone_from(&self.username),
                StorageKey::Replies => selected.replies.clone_from(&self.replies),
                StorageKey::LastRefresh => selected.last_refresh.clone_from(&self.last_refresh),
                StorageKey::HighestSeen => selected.highest_seen.clone_from(&self.highest_seen),
            }
        }
        selected
    }
}

/// Local key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the requested keys. Missing keys stay `None`.
    async fn get(&self, keys: &[StorageKey]) -> Result<StoredRecord, StoreError>;

    /// Write every field present in `record`.
    async fn set(&self, record: StoredRecord) -> Result<(), StoreError>;
}
