//! Background notifier: periodic polling plus on-demand refreshes.
//!
//! The service owns the refresh schedule. Requests arrive through a
//! [`NotifierHandle`]; cycles run on a spawned task and report back through a
//! channel, so the loop stays responsive while a fetch is in flight.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::store::{NotificationStore, StoreError};

use super::{Admission, Badge, CycleOutcome, Event, RefreshGuard, Refresher};

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 64;

/// Errors returned by [`NotifierHandle`].
#[derive(thiserror::Error, Debug)]
pub enum NotifierError {
    #[error("Notifier is not running")]
    Stopped,
    #[error(transparent)]
    Store(#[from] StoreError),
}

enum Command {
    Refresh {
        respond: Option<oneshot::Sender<CycleOutcome>>,
    },
}

/// Waiters for the running cycle and for the queued follow-up.
#[derive(Default)]
struct Flight {
    guard: RefreshGuard,
    current: Vec<oneshot::Sender<CycleOutcome>>,
    follow_up: Vec<oneshot::Sender<CycleOutcome>>,
}

/// Drives refresh cycles.
pub struct NotifierService {
    refresher: Refresher,
    interval: Duration,
    commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<Event>,
    cancel: CancellationToken,
}

/// Cloneable front door to a running [`NotifierService`].
#[derive(Clone)]
pub struct NotifierHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<Event>,
    store: NotificationStore,
    badge: Badge,
    cancel: CancellationToken,
}

impl NotifierService {
    /// Create a service polling every `interval`, and a handle to it.
    #[must_use]
    pub fn new(refresher: Refresher, interval: Duration) -> (Self, NotifierHandle) {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let cancel = CancellationToken::new();

        let handle = NotifierHandle {
            commands: cmd_tx,
            events: events.clone(),
            store: refresher.store().clone(),
            badge: refresher.badge().clone(),
            cancel: cancel.clone(),
        };
        let service = Self {
            refresher,
            interval,
            commands: cmd_rx,
            events,
            cancel,
        };
        (service, handle)
    }

    /// Run until shut down or every handle is dropped.
    ///
    /// The first poll fires immediately.
    pub async fn run(mut self) {
        let (done_tx, mut done_rx) = mpsc::channel::<CycleOutcome>(1);
        let mut flight = Flight::default();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_secs = self.interval.as_secs(), "Notifier started");

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                Some(outcome) = done_rx.recv() => {
                    self.publish(&outcome);
                    for waiter in flight.current.drain(..) {
                        let _ = waiter.send(outcome.clone());
                    }
                    if flight.guard.finish() {
                        flight.current = std::mem::take(&mut flight.follow_up);
                        self.spawn_cycle(&done_tx);
                    }
                }
                _ = ticker.tick() => {
                    tracing::debug!("Scheduled refresh");
                    self.admit(&mut flight, None, &done_tx);
                }
                command = self.commands.recv() => match command {
                    Some(Command::Refresh { respond }) => {
                        self.admit(&mut flight, respond, &done_tx);
                    }
                    None => break,
                },
            }
        }

        tracing::info!("Notifier stopped");
    }

    fn admit(
        &self,
        flight: &mut Flight,
        respond: Option<oneshot::Sender<CycleOutcome>>,
        done: &mpsc::Sender<CycleOutcome>,
    ) {
        match flight.guard.request() {
            Admission::Start => {
                flight.current.extend(respond);
                self.spawn_cycle(done);
            }
            Admission::Queued | Admission::Coalesced => flight.follow_up.extend(respond),
        }
    }

    fn spawn_cycle(&self, done: &mpsc::Sender<CycleOutcome>) {
        let refresher = self.refresher.clone();
        let done = done.clone();
        tokio::spawn(async move {
            let outcome = refresher.run_cycle().await;
            let _ = done.send(outcome).await;
        });
    }

    fn publish(&self, outcome: &CycleOutcome) {
        let Some(event) = outcome.event() else {
            return;
        };
        let badge_changed = matches!(event, Event::Refreshed | Event::NoSuchUser);
        let _ = self.events.send(event);
        if badge_changed {
            let count = self.refresher.badge().count();
            let _ = self.events.send(Event::BadgeUpdate { count });
        }
    }
}

impl NotifierHandle {
    /// Request a refresh and wait for the cycle that serves it.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::Stopped`] if the service is gone.
    pub async fn refresh(&self) -> Result<CycleOutcome, NotifierError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Refresh { respond: Some(tx) })
            .await
            .map_err(|_| NotifierError::Stopped)?;
        rx.await.map_err(|_| NotifierError::Stopped)
    }

    /// Request a refresh without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::Stopped`] if the service is gone.
    pub async fn request_refresh(&self) -> Result<(), NotifierError> {
        self.commands
            .send(Command::Refresh { respond: None })
            .await
            .map_err(|_| NotifierError::Stopped)
    }

    /// Track a new user and refresh for them.
    ///
    /// # Errors
    ///
    /// Returns an error if the username cannot be stored or the service is gone.
    pub async fn set_username(&self, username: &str) -> Result<CycleOutcome, NotifierError> {
        self.store.set_username(username).await?;
        self.refresh().await
    }

    /// Dismiss one reply. Returns the new badge count.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn clear_reply(&self, post_id: u64) -> Result<usize, NotifierError> {
        let count = self.store.clear_reply(post_id).await?;
        self.set_badge(count);
        Ok(count)
    }

    /// Dismiss every reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn clear_all(&self) -> Result<usize, NotifierError> {
        let count = self.store.clear_all().await?;
        self.set_badge(count);
        Ok(count)
    }

    /// Set the badge and tell subscribers.
    pub fn set_badge(&self, count: usize) {
        self.badge.set(count);
        let _ = self.events.send(Event::BadgeUpdate { count });
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn badge(&self) -> &Badge {
        &self.badge
    }

    #[must_use]
    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
