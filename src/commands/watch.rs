//! `paperboy watch`: follow daemon events.

use crate::display;

use super::{App, CommandError};

/// Print daemon events until the daemon goes away or Ctrl-C.
///
/// # Errors
///
/// Returns an error if the daemon is not running or the stream breaks.
pub async fn watch(app: &App) -> Result<(), CommandError> {
    let mut subscription = app.client().subscribe().await?;
    tracing::info!("Watching daemon events");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            next = subscription.next() => match next? {
                Some(event) => display::print_event(&event),
                None => {
                    tracing::info!("Daemon closed the event stream");
                    break;
                }
            },
        }
    }
    Ok(())
}
