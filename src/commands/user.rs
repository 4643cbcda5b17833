//! `paperboy user <NAME>`: change the tracked user.

use crate::display;
use crate::ipc::IpcRequest;
use crate::notifier::Badge;

use super::{check_response, App, CommandError};

/// Track `username` and refresh for it.
///
/// # Errors
///
/// Returns an error if the username cannot be stored or the daemon rejects it.
pub async fn set_user(app: &App, username: &str) -> Result<(), CommandError> {
    let request = IpcRequest::SetUsername {
        username: username.to_string(),
    };
    if let Some(response) = app.via_daemon(&request).await? {
        display::print_response(&check_response(response)?);
        return Ok(());
    }

    let store = app.open_store().await?;
    store.set_username(username).await?;
    let outcome = app.refresher(store, Badge::new())?.run_cycle().await;
    display::print_outcome(&outcome);
    Ok(())
}
