//! Messages exchanged between the notifier and its front-ends.

use serde::{Deserialize, Serialize};

/// Notifier message vocabulary.
///
/// `Refresh` flows toward the notifier; the rest are emitted by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Request a refresh cycle.
    Refresh,
    /// A refresh cycle completed and state was stored.
    Refreshed,
    /// A refresh cycle failed on the network or API.
    NetworkError,
    /// The tracked username does not exist.
    NoSuchUser,
    /// The badge count changed.
    BadgeUpdate { count: usize },
}

impl Event {
    /// Wire name of the event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::Refreshed => "refreshed",
            Self::NetworkError => "network_error",
            Self::NoSuchUser => "no_such_user",
            Self::BadgeUpdate { .. } => "badge_update",
        }
    }
}
