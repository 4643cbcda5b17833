//! In-memory item source for offline use and tests.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ApiError, Item, ItemSource, User};

/// An [`ItemSource`] backed by fixed users and items.
///
/// Unknown users and items resolve to `None`, matching the API's `null`.
/// Every item lookup is recorded so callers can check what was fetched.
#[derive(Debug, Default)]
pub struct MemorySource {
    users: HashMap<String, User>,
    items: HashMap<u64, Item>,
    failing: HashSet<u64>,
    user_fails: bool,
    latency: Option<Duration>,
    requested: Mutex<Vec<u64>>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user with the given submissions (newest first).
    #[must_use]
    pub fn with_user(mut self, username: &str, submitted: Vec<u64>) -> Self {
        self.users.insert(
            username.to_string(),
            User {
                id: username.to_string(),
                submitted,
            },
        );
        self
    }

    #[must_use]
    pub fn with_item(mut self, item: Item) -> Self {
        self.items.insert(item.id, item);
        self
    }

    /// Make lookups of `id` fail with a transport error.
    #[must_use]
    pub fn failing_item(mut self, id: u64) -> Self {
        self.failing.insert(id);
        self
    }

    /// Make every user lookup fail with a transport error.
    #[must_use]
    pub fn failing_users(mut self) -> Self {
        self.user_fails = true;
        self
    }

    /// Delay every item lookup by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Item ids looked up so far, in request order.
    pub async fn requested_items(&self) -> Vec<u64> {
        self.requested.lock().await.clone()
    }
}

#[async_trait]
impl ItemSource for MemorySource {
    async fn user(&self, username: &str) -> Result<Option<User>, ApiError> {
        if self.user_fails {
            return Err(ApiError::RequestFailed("connection refused".to_string()));
        }
        Ok(self.users.get(username).cloned())
    }

    async fn item(&self, id: u64) -> Result<Option<Item>, ApiError> {
        self.requested.lock().await.push(id);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.contains(&id) {
            return Err(ApiError::RequestFailed("connection reset".to_string()));
        }
        Ok(self.items.get(&id).cloned())
    }
}
