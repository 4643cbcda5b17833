//! Integration tests for the daemon's IPC surface.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use paperboy::api::{Item, MemorySource};
use paperboy::commands::dispatch;
use paperboy::fetcher::ReplyFetcher;
use paperboy::ipc::{IpcClient, IpcError, IpcRequest, IpcResponse, IpcServer, ServerHandle};
use paperboy::notifier::{Badge, Event, NotifierHandle, NotifierService, Refresher};
use paperboy::store::NotificationStore;
use tempfile::TempDir;

fn source() -> MemorySource {
    let now = Utc::now().timestamp();
    MemorySource::new()
        .with_user("pg", vec![1])
        .with_item(Item {
            id: 1,
            by: Some("pg".to_string()),
            time: now - 60,
            kids: vec![3, 2],
            ..Item::default()
        })
        .with_item(Item {
            id: 2,
            by: Some("a".to_string()),
            time: now - 30,
            text: Some("hello".to_string()),
            ..Item::default()
        })
        .with_item(Item {
            id: 3,
            by: Some("b".to_string()),
            time: now - 10,
            text: Some("world".to_string()),
            ..Item::default()
        })
}

/// Start a notifier and expose it on a socket inside `dir`.
fn start_daemon(dir: &TempDir) -> (NotifierHandle, ServerHandle, IpcClient) {
    let refresher = Refresher::new(
        ReplyFetcher::new(Arc::new(source())),
        NotificationStore::in_memory(),
        Badge::new(),
    );
    let (service, handle) = NotifierService::new(refresher, Duration::from_hours(1));
    tokio::spawn(service.run());

    let socket_path = dir.path().join("paperboy.sock");
    let request_handle = handle.clone();
    let events_handle = handle.clone();
    let server = IpcServer::new(&socket_path)
        .start(
            move |request| {
                let handle = request_handle.clone();
                async move { dispatch(&handle, request).await }
            },
            move || events_handle.subscribe(),
        )
        .expect("Failed to start server");

    (handle, server, IpcClient::with_path(&socket_path))
}

/// Test a full session driven over the socket.
#[tokio::test]
async fn ipc_user_refresh_clear_session() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let (handle, server, client) = start_daemon(&dir);
    assert!(client.is_daemon_running());

    let response = client
        .send(&IpcRequest::SetUsername {
            username: "pg".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(response, IpcResponse::event(Event::Refreshed));
    assert_eq!(handle.badge().count(), 2);

    let response = client
        .send(&IpcRequest::ClearReply { post_id: 3 })
        .await
        .unwrap();
    assert_eq!(response, IpcResponse::event(Event::BadgeUpdate { count: 1 }));

    let response = client.send(&IpcRequest::ClearAll).await.unwrap();
    assert_eq!(response, IpcResponse::event(Event::BadgeUpdate { count: 0 }));

    server.shutdown();
    handle.shutdown();
}

/// Test that refresh without a username is reported as skipped.
#[tokio::test]
async fn ipc_refresh_without_user_is_skipped() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let (handle, _server, client) = start_daemon(&dir);

    let response = client.send(&IpcRequest::Refresh).await.unwrap();
    assert_eq!(response, IpcResponse::Skipped);

    handle.shutdown();
}

/// Test that a subscriber sees events caused by another client.
#[tokio::test]
async fn ipc_subscriber_sees_badge_updates() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let (handle, _server, client) = start_daemon(&dir);

    let mut subscription = client.subscribe().await.unwrap();
    let reader = tokio::spawn(async move { subscription.next().await });

    // The server attaches the subscriber asynchronously, so keep poking
    // until the first event gets through.
    let expected = Event::BadgeUpdate { count: 7 };
    tokio::time::timeout(Duration::from_secs(5), async {
        while !reader.is_finished() {
            client
                .send(&IpcRequest::BadgeUpdate { count: 7 })
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("subscriber never received an event");

    let received = reader.await.unwrap().unwrap().unwrap();
    assert_eq!(received, expected);
    handle.shutdown();
}

/// Test that malformed requests get an error response.
#[tokio::test]
async fn ipc_malformed_request_gets_error() {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::UnixStream;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let (handle, _server, client) = start_daemon(&dir);

    let stream = UnixStream::connect(client.socket_path()).await.unwrap();
    let (reader, mut writer) = stream.into_split();
    writer.write_all(b"{\"request\":\"explode\"}\n").await.unwrap();

    let mut line = String::new();
    BufReader::new(reader).read_line(&mut line).await.unwrap();
    let response: IpcResponse = serde_json::from_str(line.trim()).unwrap();
    assert!(matches!(response, IpcResponse::Error { .. }));

    handle.shutdown();
}

/// Test that clients report a missing daemon.
#[tokio::test]
async fn ipc_client_without_daemon() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let client = IpcClient::with_path(dir.path().join("missing.sock"));
    assert!(!client.is_daemon_running());
    assert!(matches!(
        client.send(&IpcRequest::Refresh).await,
        Err(IpcError::DaemonNotRunning)
    ));
}
