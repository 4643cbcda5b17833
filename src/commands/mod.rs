//! CLI subcommand implementations.
//!
//! Commands that write state go through the daemon when it is running, so its
//! single-flight refreshes and serialized clears stay authoritative. Without a
//! daemon they act on the state database directly.

mod clear;
mod daemon;
mod list;
mod refresh;
mod user;
mod watch;

use std::sync::Arc;

use crate::api::{ApiError, HackerNewsClient};
use crate::config::PaperboyConfig;
use crate::fetcher::ReplyFetcher;
use crate::ipc::{IpcClient, IpcError, IpcRequest, IpcResponse};
use crate::notifier::{Badge, NotifierError, Refresher};
use crate::store::{NotificationStore, StoreError};

pub use clear::clear;
pub use daemon::{dispatch, run_daemon};
pub use list::list;
pub use refresh::refresh;
pub use user::set_user;
pub use watch::watch;

/// Errors surfaced by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("API client error: {0}")]
    Api(#[from] ApiError),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("IPC error: {0}")]
    Ipc(#[from] IpcError),
    #[error("Notifier error: {0}")]
    Notifier(#[from] NotifierError),
    #[error("Daemon error: {0}")]
    Daemon(String),
}

/// Resources shared by the subcommands.
#[derive(Debug, Clone)]
pub struct App {
    config: PaperboyConfig,
}

impl App {
    #[must_use]
    pub fn new(config: PaperboyConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &PaperboyConfig {
        &self.config
    }

    #[must_use]
    pub fn client(&self) -> IpcClient {
        IpcClient::with_path(&self.config.ipc.socket_path)
    }

    /// Open the configured state database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub async fn open_store(&self) -> Result<NotificationStore, StoreError> {
        let path = self.config.storage.resolved_path();
        tracing::debug!(path = %path.display(), "Opening state database");
        NotificationStore::open(path).await
    }

    /// Build a refresher on top of the live content API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn refresher(&self, store: NotificationStore, badge: Badge) -> Result<Refresher, ApiError> {
        let source = HackerNewsClient::from_config(&self.config.api)?;
        let fetcher =
            ReplyFetcher::new(Arc::new(source)).with_window(self.config.poll.window_secs());
        Ok(Refresher::new(fetcher, store, badge))
    }

    /// Send `request` to the daemon. Returns `None` when no daemon is running.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon is reachable but the exchange fails.
    pub async fn via_daemon(&self, request: &IpcRequest) -> Result<Option<IpcResponse>, IpcError> {
        match self.client().send(request).await {
            Ok(response) => Ok(Some(response)),
            Err(IpcError::DaemonNotRunning) => {
                tracing::debug!("Daemon not running, acting locally");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Turn an error response into a [`CommandError`].
fn check_response(response: IpcResponse) -> Result<IpcResponse, CommandError> {
    match response {
        IpcResponse::Error { message } => Err(CommandError::Daemon(message)),
        other => Ok(other),
    }
}
