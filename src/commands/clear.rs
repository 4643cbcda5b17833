//! `paperboy clear`: dismiss replies.

use crate::display;
use crate::ipc::IpcRequest;
use crate::notifier::Event;

use super::{check_response, App, CommandError};

/// Dismiss `post_id`, or every reply when `post_id` is `None`.
///
/// # Errors
///
/// Returns an error if the state cannot be updated.
pub async fn clear(app: &App, post_id: Option<u64>) -> Result<(), CommandError> {
    let request = match post_id {
        Some(post_id) => IpcRequest::ClearReply { post_id },
        None => IpcRequest::ClearAll,
    };
    if let Some(response) = app.via_daemon(&request).await? {
        display::print_response(&check_response(response)?);
        return Ok(());
    }

    let store = app.open_store().await?;
    let count = match post_id {
        Some(post_id) => store.clear_reply(post_id).await?,
        None => store.clear_all().await?,
    };
    display::print_event(&Event::BadgeUpdate { count });
    Ok(())
}
