//! Unread-count badge.

use std::sync::Arc;

use tokio::sync::watch;

/// Text shown on the badge: empty for zero, otherwise the count.
#[must_use]
pub fn badge_text(count: usize) -> String {
    if count == 0 {
        String::new()
    } else {
        count.to_string()
    }
}

/// Shared badge count.
///
/// Clones share the same value; observers follow it through [`Badge::subscribe`].
#[derive(Debug, Clone)]
pub struct Badge {
    tx: Arc<watch::Sender<usize>>,
}

impl Default for Badge {
    fn default() -> Self {
        Self::new()
    }
}

impl Badge {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Set the count. Returns `true` if it changed.
    pub fn set(&self, count: usize) -> bool {
        let previous = self.tx.send_replace(count);
        if previous != count {
            tracing::debug!(count, text = %badge_text(count), "Badge updated");
        }
        previous != count
    }

    #[must_use]
    pub fn count(&self) -> usize {
        *self.tx.borrow()
    }

    #[must_use]
    pub fn text(&self) -> String {
        badge_text(self.count())
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_text() {
        assert_eq!(badge_text(0), "");
        assert_eq!(badge_text(1), "1");
        assert_eq!(badge_text(42), "42");
    }

    #[test]
    fn test_set_and_read() {
        let badge = Badge::new();
        assert_eq!(badge.count(), 0);
        assert!(badge.set(3));
        assert!(!badge.set(3));
        assert_eq!(badge.count(), 3);
        assert_eq!(badge.text(), "3");
    }

    #[test]
    fn test_clones_share_count() {
        let badge = Badge::new();
        let other = badge.clone();
        other.set(7);
        assert_eq!(badge.count(), 7);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let badge = Badge::new();
        let mut rx = badge.subscribe();
        badge.set(2);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 2);
    }
}
