//! IPC server for the daemon.
//!
//! Each connection carries one request. A `subscribe` request keeps the
//! connection open and streams events until either side goes away.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::UnixListener;
use tokio::sync::{broadcast, watch};

use crate::ipc::{IpcError, IpcRequest, IpcResponse, DEFAULT_SOCKET_PATH};
use crate::notifier::Event;

/// IPC server for requests from CLI front-ends.
///
/// The server listens on a Unix domain socket and spawns a handler
/// for each incoming connection.
#[derive(Debug)]
pub struct IpcServer {
    socket_path: PathBuf,
}

impl IpcServer {
    #[must_use]
    pub fn new<P: AsRef<Path>>(socket_path: P) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn with_default_path() -> Self {
        Self::new(DEFAULT_SOCKET_PATH)
    }

    #[must_use]
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Starts the server.
    ///
    /// `handler` answers every request except `subscribe`; `subscribe` opens
    /// a fresh event receiver for each subscribing connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the socket.
    pub fn start<F, Fut, S>(&self, handler: F, subscribe: S) -> Result<ServerHandle, IpcError>
    where
        F: Fn(IpcRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = IpcResponse> + Send,
        S: Fn() -> broadcast::Receiver<Event> + Send + Sync + 'static,
    {
        // Remove a stale socket left by a previous run
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        let socket_path = self.socket_path.clone();

        tracing::info!(path = %socket_path.display(), "IPC server started");

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handler = Arc::new(handler);
        let subscribe = Arc::new(subscribe);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;

                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("IPC server shutting down");
                            break;
                        }
                    }

                    accept_result = listener.accept() => {
                        match accept_result {
                            Ok((stream, _addr)) => {
                                let handler = Arc::clone(&handler);
                                let subscribe = Arc::clone(&subscribe);
                                let shutdown = shutdown_rx.clone();
                                tokio::spawn(async move {
                                    if let Err(e) =
                                        handle_connection(stream, handler, subscribe, shutdown).await
                                    {
                                        tracing::warn!(error = %e, "Connection handler error");
                                    }
                                });
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Failed to accept connection");
                            }
                        }
                    }
                }
            }
        });

        Ok(ServerHandle {
            socket_path: self.socket_path.clone(),
            shutdown_tx,
        })
    }
}

/// Handle for a running IPC server.
///
/// When dropped, the socket file is cleaned up.
#[derive(Debug)]
pub struct ServerHandle {
    socket_path: PathBuf,
    shutdown_tx: watch::Sender<bool>,
}

impl ServerHandle {
    /// Signals the server and its subscribers to shut down.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    #[must_use]
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);

        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                tracing::warn!(
                    path = %self.socket_path.display(),
                    error = %e,
                    "Failed to remove socket file"
                );
            }
        }
    }
}

async fn write_response(
    writer: &mut OwnedWriteHalf,
    response: &IpcResponse,
) -> Result<(), IpcError> {
    let mut response_json = serde_json::to_string(response)?;
    response_json.push('\n');
    writer.write_all(response_json.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

async fn handle_connection<F, Fut, S>(
    stream: tokio::net::UnixStream,
    handler: Arc<F>,
    subscribe: Arc<S>,
    shutdown: watch::Receiver<bool>,
) -> Result<(), IpcError>
where
    F: Fn(IpcRequest) -> Fut + Send + Sync,
    Fut: Future<Output = IpcResponse> + Send,
    S: Fn() -> broadcast::Receiver<Event> + Send + Sync,
{
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    let bytes_read = reader.read_line(&mut line).await?;
    if bytes_read == 0 {
        return Ok(());
    }

    let request: IpcRequest = match serde_json::from_str(line.trim()) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected malformed request");
            return write_response(&mut writer, &IpcResponse::error(e.to_string())).await;
        }
    };

    tracing::debug!(?request, "Received IPC request");

    if request == IpcRequest::Subscribe {
        return stream_events(&mut writer, subscribe(), shutdown).await;
    }

    let response = handler(request).await;
    write_response(&mut writer, &response).await
}

async fn stream_events(
    writer: &mut OwnedWriteHalf,
    mut events: broadcast::Receiver<Event>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), IpcError> {
    loop {
        tokio::select! {
            biased;

            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    return Ok(());
                }
            }

            received = events.recv() => match received {
                Ok(event) => write_response(writer, &IpcResponse::event(event)).await?,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return Ok(()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::IpcClient;
    use std::time::Duration;

    fn socket_in(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("paperboy.sock")
    }

    #[test]
    fn server_new_uses_custom_path() {
        let server = IpcServer::new("/custom/path.sock");
        assert_eq!(server.socket_path(), Path::new("/custom/path.sock"));
    }

    #[test]
    fn server_with_default_path_uses_default() {
        let server = IpcServer::with_default_path();
        assert_eq!(server.socket_path(), Path::new(DEFAULT_SOCKET_PATH));
    }

    #[tokio::test]
    async fn server_client_request_response() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = socket_in(&dir);
        let (events, _) = broadcast::channel::<Event>(8);

        let server = IpcServer::new(&socket_path);
        let handle = server
            .start(
                |req| async move {
                    match req {
                        IpcRequest::ClearReply { post_id } => {
                            IpcResponse::event(Event::BadgeUpdate {
                                count: usize::try_from(post_id).unwrap_or_default(),
                            })
                        }
                        IpcRequest::Refresh => IpcResponse::Skipped,
                        _ => IpcResponse::error("unsupported"),
                    }
                },
                move || events.subscribe(),
            )
            .expect("Failed to start server");

        tokio::time::sleep(Duration::from_millis(10)).await;

        let client = IpcClient::with_path(&socket_path);
        assert!(client.is_daemon_running());

        let response = client.send(&IpcRequest::Refresh).await.unwrap();
        assert_eq!(response, IpcResponse::Skipped);

        let response = client
            .send(&IpcRequest::ClearReply { post_id: 3 })
            .await
            .unwrap();
        assert_eq!(response, IpcResponse::event(Event::BadgeUpdate { count: 3 }));

        let response = client.send(&IpcRequest::ClearAll).await.unwrap();
        assert!(matches!(response, IpcResponse::Error { .. }));

        handle.shutdown();
    }

    #[tokio::test]
    async fn subscribers_receive_broadcast_events() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = socket_in(&dir);
        let (events, _) = broadcast::channel::<Event>(8);
        let sender = events.clone();

        let server = IpcServer::new(&socket_path);
        let _handle = server
            .start(|_| async { IpcResponse::Skipped }, move || events.subscribe())
            .expect("Failed to start server");

        let client = IpcClient::with_path(&socket_path);
        let mut subscription = client.subscribe().await.unwrap();

        // The server subscribes after reading the request line
        while sender.receiver_count() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        sender.send(Event::Refreshed).unwrap();
        sender.send(Event::BadgeUpdate { count: 1 }).unwrap();

        assert_eq!(subscription.next().await.unwrap(), Some(Event::Refreshed));
        assert_eq!(
            subscription.next().await.unwrap(),
            Some(Event::BadgeUpdate { count: 1 })
        );
    }

    #[tokio::test]
    async fn server_handle_drop_cleans_up_socket() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = socket_in(&dir);
        let (events, _) = broadcast::channel::<Event>(1);

        {
            let server = IpcServer::new(&socket_path);
            let _handle = server
                .start(|_| async { IpcResponse::Skipped }, move || events.subscribe())
                .expect("Failed to start server");

            assert!(socket_path.exists());
        }

        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(!socket_path.exists());
    }
}
