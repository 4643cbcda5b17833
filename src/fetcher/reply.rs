//! Reply records.

use serde::{Deserialize, Serialize};

use crate::api::Item;

use super::to_plaintext;

/// A comment posted directly under one of the tracked user's posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub post_id: u64,
    pub author: String,
    /// Creation time in unix seconds.
    pub timestamp: i64,
    /// Comment body as plain text.
    pub content: String,
}

impl Reply {
    /// Link to the reply on the Hacker News website.
    #[must_use]
    pub fn url(&self) -> String {
        format!("https://news.ycombinator.com/item?id={}", self.post_id)
    }
}

impl From<Item> for Reply {
    fn from(item: Item) -> Self {
        Self {
            post_id: item.id,
            author: item.by.unwrap_or_default(),
            timestamp: item.time,
            content: item.text.as_deref().map(to_plaintext).unwrap_or_default(),
        }
    }
}

/// Result of one incremental fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyBatch {
    /// New replies, newest (largest id) first.
    pub replies: Vec<Reply>,
    /// Id of the newest reply, if any were found.
    pub watermark: Option<u64>,
}

impl ReplyBatch {
    /// Build a batch from replies already sorted newest first.
    #[must_use]
    pub fn new(replies: Vec<Reply>) -> Self {
        let watermark = replies.first().map(|r| r.post_id);
        Self { replies, watermark }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.replies.len()
    }
}
