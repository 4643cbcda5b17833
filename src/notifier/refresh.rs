//! One refresh cycle: fetch, filter, merge, persist, notify.

use chrono::Utc;

use crate::fetcher::{FetchError, ReplyFetcher};
use crate::store::{NotificationStore, StoreError};

use super::{Badge, Event};

/// Errors that abort a refresh cycle.
#[derive(thiserror::Error, Debug)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Failed to store refresh: {0}")]
    Store(#[from] StoreError),
}

impl RefreshError {
    /// Event reported to front-ends for this failure.
    #[must_use]
    pub fn event(&self) -> Event {
        match self {
            Self::Fetch(FetchError::UserNotFound(_)) => Event::NoSuchUser,
            Self::Fetch(FetchError::Network(_)) | Self::Store(_) => Event::NetworkError,
        }
    }
}

/// Summary of a successful cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub username: String,
    pub new_replies: usize,
    pub watermark: Option<u64>,
    /// Badge count after the merge.
    pub badge_count: usize,
}

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No username is configured, nothing was fetched.
    Skipped,
    Refreshed(RefreshReport),
    Failed { event: Event, reason: String },
}

impl CycleOutcome {
    /// Event reported to front-ends, if any.
    #[must_use]
    pub fn event(&self) -> Option<Event> {
        match self {
            Self::Skipped => None,
            Self::Refreshed(_) => Some(Event::Refreshed),
            Self::Failed { event, .. } => Some(event.clone()),
        }
    }
}

/// Runs refresh cycles against a fetcher and a store.
#[derive(Debug, Clone)]
pub struct Refresher {
    fetcher: ReplyFetcher,
    store: NotificationStore,
    badge: Badge,
}

impl Refresher {
    #[must_use]
    pub fn new(fetcher: ReplyFetcher, store: NotificationStore, badge: Badge) -> Self {
        Self {
            fetcher,
            store,
            badge,
        }
    }

    #[must_use]
    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    #[must_use]
    pub fn badge(&self) -> &Badge {
        &self.badge
    }

    /// Run one cycle, converting failures into their front-end event.
    pub async fn run_cycle(&self) -> CycleOutcome {
        match self.try_cycle().await {
            Ok(None) => {
                tracing::debug!("No username set, skipping refresh");
                CycleOutcome::Skipped
            }
            Ok(Some(report)) => {
                tracing::info!(
                    username = %report.username,
                    new_replies = report.new_replies,
                    badge = report.badge_count,
                    "Refresh complete"
                );
                CycleOutcome::Refreshed(report)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Refresh failed");
                let event = e.event();
                if event == Event::NoSuchUser {
                    self.badge.set(0);
                }
                CycleOutcome::Failed {
                    event,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Run one cycle.
    ///
    /// Returns `Ok(None)` when no username is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if fetching or storing fails. Writes that completed
    /// before the failure are kept.
    pub async fn try_cycle(&self) -> Result<Option<RefreshReport>, RefreshError> {
        let state = self.store.load().await?;
        let Some(username) = state.username.clone() else {
            return Ok(None);
        };

        self.badge.set(state.badge_count());

        let since_id = state.since_id(&username);
        tracing::info!(username = %username, since_id, "Refreshing");

        let batch = self.fetcher.fetch_new_replies(&username, since_id).await?;
        let badge_count = self
            .store
            .apply_refresh(&username, &batch, Utc::now().timestamp())
            .await?;
        self.badge.set(badge_count);

        Ok(Some(RefreshReport {
            username,
            new_replies: batch.len(),
            watermark: batch.watermark,
            badge_count,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::{ApiError, Item, MemorySource};

    fn source() -> MemorySource {
        let now = Utc::now().timestamp();
        MemorySource::new()
            .with_user("pg", vec![100])
            .with_item(Item {
                id: 100,
                by: Some("pg".to_string()),
                time: now - 3600,
                kids: vec![101, 102],
                ..Item::default()
            })
            .with_item(Item {
                id: 101,
                by: Some("a".to_string()),
                time: now - 60,
                text: Some("first".to_string()),
                ..Item::default()
            })
            .with_item(Item {
                id: 102,
                by: Some("b".to_string()),
                time: now - 30,
                text: Some("second".to_string()),
                ..Item::default()
            })
    }

    fn refresher(source: MemorySource) -> Refresher {
        Refresher::new(
            ReplyFetcher::new(Arc::new(source)),
            NotificationStore::in_memory(),
            Badge::new(),
        )
    }

    #[tokio::test]
    async fn test_skipped_without_username() {
        let refresher = refresher(source());
        assert_eq!(refresher.run_cycle().await, CycleOutcome::Skipped);
        assert_eq!(CycleOutcome::Skipped.event(), None);
    }

    #[tokio::test]
    async fn test_refresh_stores_and_updates_badge() {
        let refresher = refresher(source());
        refresher.store().set_username("pg").await.unwrap();

        let outcome = refresher.run_cycle().await;
        let CycleOutcome::Refreshed(report) = outcome else {
            panic!("expected refresh, got {outcome:?}");
        };
        assert_eq!(report.new_replies, 2);
        assert_eq!(report.watermark, Some(102));
        assert_eq!(report.badge_count, 2);
        assert_eq!(refresher.badge().count(), 2);

        let state = refresher.store().load().await.unwrap();
        assert_eq!(state.since_id("pg"), 102);
        assert!(state.last_refresh_for("pg").is_some());
    }

    #[tokio::test]
    async fn test_second_cycle_finds_nothing_new() {
        let refresher = refresher(source());
        refresher.store().set_username("pg").await.unwrap();
        refresher.run_cycle().await;

        let report = refresher.try_cycle().await.unwrap().unwrap();
        assert_eq!(report.new_replies, 0);
        assert_eq!(report.watermark, None);
        assert_eq!(report.badge_count, 2);
    }

    #[tokio::test]
    async fn test_unknown_user_resets_badge() {
        let refresher = refresher(source());
        refresher.store().set_username("ghost").await.unwrap();
        refresher.badge().set(4);

        let outcome = refresher.run_cycle().await;
        assert_eq!(outcome.event(), Some(Event::NoSuchUser));
        assert_eq!(refresher.badge().count(), 0);
    }

    #[tokio::test]
    async fn test_network_failure_leaves_state() {
        let refresher = refresher(source().failing_item(101));
        refresher.store().set_username("pg").await.unwrap();

        let outcome = refresher.run_cycle().await;
        assert_eq!(outcome.event(), Some(Event::NetworkError));

        let state = refresher.store().load().await.unwrap();
        assert!(state.last_refresh_for("pg").is_none());
        assert_eq!(state.since_id("pg"), 0);
    }

    #[test]
    fn test_error_events() {
        let not_found = RefreshError::Fetch(FetchError::UserNotFound("x".to_string()));
        assert_eq!(not_found.event(), Event::NoSuchUser);

        let network = RefreshError::Fetch(FetchError::Network(ApiError::Timeout));
        assert_eq!(network.event(), Event::NetworkError);

        let store = RefreshError::Store(StoreError::TaskCancelled);
        assert_eq!(store.event(), Event::NetworkError);
    }
}
