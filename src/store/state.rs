//! Typed notification state and its update rules.

use std::collections::HashMap;
use std::hash::BuildHasher;

use crate::fetcher::{Reply, ReplyBatch};

use super::kv::StoredRecord;

/// Copy of `map` with `key` set to `value`.
#[must_use]
pub fn with_entry<V: Clone, S: BuildHasher + Clone>(
    map: &HashMap<String, V, S>,
    key: &str,
    value: V,
) -> HashMap<String, V, S> {
    let mut updated = map.clone();
    updated.insert(key.to_string(), value);
    updated
}

/// Everything the notifier persists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationState {
    /// The tracked user, if one has been configured.
    pub username: Option<String>,
    pub replies: HashMap<String, Vec<Reply>>,
    pub last_refresh: HashMap<String, i64>,
    pub highest_seen: HashMap<String, u64>,
}

impl From<StoredRecord> for NotificationState {
    fn from(record: StoredRecord) -> Self {
        Self {
            username: record.username,
            replies: record.replies.unwrap_or_default(),
            last_refresh: record.last_refresh.unwrap_or_default(),
            highest_seen: record.highest_seen.unwrap_or_default(),
        }
    }
}

impl NotificationState {
    /// Stored replies for `username`, newest first.
    #[must_use]
    pub fn replies_for(&self, username: &str) -> &[Reply] {
        self.replies
            .get(username)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Stored replies for the tracked user.
    #[must_use]
    pub fn active_replies(&self) -> &[Reply] {
        self.username
            .as_deref()
            .map(|username| self.replies_for(username))
            .unwrap_or_default()
    }

    /// Watermark for `username`; 0 before the first successful refresh.
    #[must_use]
    pub fn since_id(&self, username: &str) -> u64 {
        self.highest_seen.get(username).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn last_refresh_for(&self, username: &str) -> Option<i64> {
        self.last_refresh.get(username).copied()
    }

    /// Badge count: number of stored replies for the tracked user.
    #[must_use]
    pub fn badge_count(&self) -> usize {
        self.active_replies().len()
    }

    /// State after a successful refresh of `username` at `now`.
    ///
    /// New replies go in front of the stored ones. The watermark only moves
    /// when the batch carries one; the refresh time is always recorded.
    #[must_use]
    pub fn merged(&self, username: &str, batch: &ReplyBatch, now: i64) -> Self {
        let mut replies = batch.replies.clone();
        replies.extend_from_slice(self.replies_for(username));

        let highest_seen = match batch.watermark {
            Some(watermark) => with_entry(
                &self.highest_seen,
                username,
                watermark.max(self.since_id(username)),
            ),
            None => self.highest_seen.clone(),
        };

        Self {
            username: self.username.clone(),
            replies: with_entry(&self.replies, username, replies),
            last_refresh: with_entry(&self.last_refresh, username, now),
            highest_seen,
        }
    }

    /// State with reply `post_id` removed from `username`'s list.
    #[must_use]
    pub fn without_reply(&self, username: &str, post_id: u64) -> Self {
        let remaining: Vec<Reply> = self
            .replies_for(username)
            .iter()
            .filter(|reply| reply.post_id != post_id)
            .cloned()
            .collect();

        Self {
            replies: with_entry(&self.replies, username, remaining),
            ..self.clone()
        }
    }

    /// State with `username`'s list emptied.
    #[must_use]
    pub fn cleared(&self, username: &str) -> Self {
        Self {
            replies: with_entry(&self.replies, username, Vec::new()),
            ..self.clone()
        }
    }
}
