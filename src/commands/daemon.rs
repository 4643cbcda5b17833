//! `paperboy run`: polling service plus IPC server.

use tokio::task::JoinHandle;

use crate::ipc::{IpcRequest, IpcResponse, IpcServer};
use crate::notifier::{badge_text, Badge, CycleOutcome, Event, NotifierHandle, NotifierService};

use super::{App, CommandError};

/// Run the daemon until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the store, HTTP client or socket cannot be set up.
pub async fn run_daemon(app: &App) -> Result<(), CommandError> {
    let store = app.open_store().await?;
    let badge = Badge::new();
    badge.set(store.load().await?.badge_count());

    let badge_task = log_badge_changes(&badge);
    let refresher = app.refresher(store, badge)?;
    let (service, handle) = NotifierService::new(refresher, app.config().poll.interval());
    let service_task = tokio::spawn(service.run());

    let server = IpcServer::new(&app.config().ipc.socket_path);
    let request_handle = handle.clone();
    let events_handle = handle.clone();
    let server_handle = server.start(
        move |request| {
            let handle = request_handle.clone();
            async move { dispatch(&handle, request).await }
        },
        move || events_handle.subscribe(),
    )?;

    tracing::info!(
        socket = %server_handle.socket_path().display(),
        "Daemon running, press Ctrl-C to stop"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
    }

    tracing::info!("Shutting down");
    server_handle.shutdown();
    handle.shutdown();
    if let Err(e) = service_task.await {
        tracing::warn!(error = %e, "Notifier task ended abnormally");
    }
    badge_task.abort();
    Ok(())
}

/// Log every badge change until all badge clones are dropped.
fn log_badge_changes(badge: &Badge) -> JoinHandle<()> {
    let mut rx = badge.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let count = *rx.borrow_and_update();
            tracing::info!(count, text = %badge_text(count), "Unread count changed");
        }
    })
}

/// Answer one IPC request against a running notifier.
pub async fn dispatch(handle: &NotifierHandle, request: IpcRequest) -> IpcResponse {
    let result = match request {
        IpcRequest::Refresh => handle.refresh().await.map(|outcome| outcome_response(&outcome)),
        IpcRequest::SetUsername { username } => handle
            .set_username(&username)
            .await
            .map(|outcome| outcome_response(&outcome)),
        IpcRequest::BadgeUpdate { count } => {
            handle.set_badge(count);
            Ok(IpcResponse::event(Event::BadgeUpdate { count }))
        }
        IpcRequest::ClearReply { post_id } => handle
            .clear_reply(post_id)
            .await
            .map(|count| IpcResponse::event(Event::BadgeUpdate { count })),
        IpcRequest::ClearAll => handle
            .clear_all()
            .await
            .map(|count| IpcResponse::event(Event::BadgeUpdate { count })),
        IpcRequest::Subscribe => Ok(IpcResponse::error("subscribe needs its own connection")),
    };

    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "IPC request failed");
        IpcResponse::error(e.to_string())
    })
}

fn outcome_response(outcome: &CycleOutcome) -> IpcResponse {
    match outcome.event() {
        Some(event) => IpcResponse::event(event),
        None => IpcResponse::Skipped,
    }
}
