//! Incremental reply fetching.
//!
//! Only children of the user's recent root posts with ids above the stored
//! watermark are fetched, so each refresh costs one request per recent post
//! plus one per new reply.

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::try_join_all;

use crate::api::{ApiError, Item, ItemSource, User};

use super::{Reply, ReplyBatch};

/// Default recent-post window (7 days).
pub const DEFAULT_WINDOW_SECS: i64 = 7 * 24 * 60 * 60;

/// Errors that abort a fetch.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// The username lookup returned no data.
    #[error("No such user: {0}")]
    UserNotFound(String),

    /// Any transport or API failure.
    #[error("Network error: {0}")]
    Network(#[from] ApiError),
}

/// Fetches replies newer than a watermark.
#[derive(Clone)]
pub struct ReplyFetcher {
    source: Arc<dyn ItemSource>,
    window_secs: i64,
}

impl std::fmt::Debug for ReplyFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyFetcher")
            .field("window_secs", &self.window_secs)
            .finish_non_exhaustive()
    }
}

impl ReplyFetcher {
    #[must_use]
    pub fn new(source: Arc<dyn ItemSource>) -> Self {
        Self {
            source,
            window_secs: DEFAULT_WINDOW_SECS,
        }
    }

    /// Set the recent-post window in seconds.
    #[must_use]
    pub fn with_window(mut self, window_secs: i64) -> Self {
        self.window_secs = window_secs;
        self
    }

    #[must_use]
    pub fn window_secs(&self) -> i64 {
        self.window_secs
    }

    /// Fetch replies to `username`'s recent posts with ids above `since_id`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::UserNotFound` if the user does not exist and
    /// `FetchError::Network` if any request fails.
    pub async fn fetch_new_replies(
        &self,
        username: &str,
        since_id: u64,
    ) -> Result<ReplyBatch, FetchError> {
        self.fetch_new_replies_at(username, since_id, Utc::now().timestamp())
            .await
    }

    /// Same as [`Self::fetch_new_replies`] with an explicit "now".
    ///
    /// # Errors
    ///
    /// See [`Self::fetch_new_replies`].
    pub async fn fetch_new_replies_at(
        &self,
        username: &str,
        since_id: u64,
        now: i64,
    ) -> Result<ReplyBatch, FetchError> {
        let user = self
            .source
            .user(username)
            .await?
            .ok_or_else(|| FetchError::UserNotFound(username.to_string()))?;

        let posts = self.recent_posts(&user, now).await?;
        let children = self.new_children(&posts, since_id).await?;

        let replies: Vec<Reply> = children
            .into_iter()
            .filter(|item| !item.is_removed())
            .map(Reply::from)
            .collect();

        tracing::debug!(
            username,
            since_id,
            recent_posts = posts.len(),
            new_replies = replies.len(),
            "Fetched replies"
        );

        Ok(ReplyBatch::new(replies))
    }

    /// Root posts newer than the window, scanning newest first.
    ///
    /// Posts are fetched one at a time so the scan can stop at the first post
    /// outside the window.
    async fn recent_posts(&self, user: &User, now: i64) -> Result<Vec<Item>, FetchError> {
        let cutoff = now.saturating_sub(self.window_secs);
        let mut recent = Vec::new();

        for &post_id in &user.submitted {
            let Some(post) = self.source.item(post_id).await? else {
                tracing::debug!(post_id, "Submitted item missing, skipping");
                continue;
            };

            if post.time > cutoff {
                recent.push(post);
            } else {
                break;
            }
        }

        Ok(recent)
    }

    /// Children of `posts` with ids above `since_id`, largest id first.
    async fn new_children(&self, posts: &[Item], since_id: u64) -> Result<Vec<Item>, FetchError> {
        let mut child_ids: Vec<u64> = posts
            .iter()
            .flat_map(|post| post.kids.iter().copied())
            .filter(|&id| id > since_id)
            .collect();
        child_ids.sort_unstable_by(|a, b| b.cmp(a));

        let fetched = try_join_all(child_ids.iter().map(|&id| self.source.item(id))).await?;

        Ok(fetched.into_iter().flatten().collect())
    }
}
