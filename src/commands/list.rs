//! `paperboy list`: show stored replies.

use chrono::Utc;

use crate::display;

use super::{App, CommandError};

/// Print the tracked user's stored replies.
///
/// # Errors
///
/// Returns an error if the state database cannot be read.
pub async fn list(app: &App) -> Result<(), CommandError> {
    let state = app.open_store().await?.load().await?;
    display::print_replies(&state, Utc::now().timestamp());
    Ok(())
}
