//! `paperboy refresh`: run one refresh cycle.

use crate::display;
use crate::ipc::IpcRequest;
use crate::notifier::Badge;

use super::{check_response, App, CommandError};

/// Ask the daemon for a refresh, or run one in-process without a daemon.
///
/// # Errors
///
/// Returns an error if the store or HTTP client cannot be set up, or the
/// daemon exchange fails.
pub async fn refresh(app: &App) -> Result<(), CommandError> {
    if let Some(response) = app.via_daemon(&IpcRequest::Refresh).await? {
        display::print_response(&check_response(response)?);
        return Ok(());
    }

    let store = app.open_store().await?;
    let outcome = app.refresher(store, Badge::new())?.run_cycle().await;
    display::print_outcome(&outcome);
    Ok(())
}
