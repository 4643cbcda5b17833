//! IPC client for CLI front-ends.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedReadHalf;
use tokio::net::UnixStream;

use crate::ipc::{IpcError, IpcRequest, IpcResponse, DEFAULT_SOCKET_PATH};
use crate::notifier::Event;

/// Default timeout for one request/response exchange.
///
/// A refresh answers only after its cycle finishes, so this sits above the
/// default HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_mins(1);

/// Client for the daemon's Unix domain socket.
#[derive(Debug, Clone)]
pub struct IpcClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl IpcClient {
    /// Creates a new IPC client with the default socket path.
    #[must_use]
    pub fn new() -> Self {
        Self::with_path(DEFAULT_SOCKET_PATH)
    }

    /// Creates a new IPC client with a custom socket path.
    #[must_use]
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            socket_path: path.as_ref().to_path_buf(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the timeout duration for IPC operations.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Checks if the daemon is running by verifying the socket file exists.
    #[must_use]
    pub fn is_daemon_running(&self) -> bool {
        self.socket_path.exists()
    }

    // Safe: timeout values are never going to exceed u64::MAX milliseconds
    #[allow(clippy::cast_possible_truncation)]
    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }

    async fn connect(&self, request: &IpcRequest) -> Result<OwnedReadHalf, IpcError> {
        if !self.is_daemon_running() {
            return Err(IpcError::DaemonNotRunning);
        }

        let stream = match UnixStream::connect(&self.socket_path).await {
            Ok(stream) => stream,
            Err(e) if matches!(e.kind(), ErrorKind::ConnectionRefused | ErrorKind::NotFound) => {
                tracing::debug!(error = %e, "Stale daemon socket");
                return Err(IpcError::DaemonNotRunning);
            }
            Err(e) => return Err(e.into()),
        };
        let (reader, mut writer) = stream.into_split();

        let mut request_json = serde_json::to_string(request)?;
        request_json.push('\n');
        writer.write_all(request_json.as_bytes()).await?;
        writer.flush().await?;

        Ok(reader)
    }

    /// Sends a request and waits for the daemon's answer.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The daemon is not running ([`IpcError::DaemonNotRunning`])
    /// - The connection fails ([`IpcError::ConnectionFailed`])
    /// - The operation times out ([`IpcError::Timeout`])
    /// - Message serialization fails ([`IpcError::SerializationError`])
    /// - The connection closes without an answer ([`IpcError::InvalidResponse`])
    pub async fn send(&self, request: &IpcRequest) -> Result<IpcResponse, IpcError> {
        let result = tokio::time::timeout(self.timeout, async {
            let reader = self.connect(request).await?;
            let mut reader = BufReader::new(reader);
            let mut response_line = String::new();
            let bytes_read = reader.read_line(&mut response_line).await?;

            if bytes_read == 0 {
                return Err(IpcError::InvalidResponse);
            }

            let response: IpcResponse = serde_json::from_str(response_line.trim())?;
            Ok(response)
        })
        .await;

        match result {
            Ok(inner) => inner,
            Err(_) => Err(IpcError::Timeout(self.timeout_ms())),
        }
    }

    /// Opens an event stream.
    ///
    /// Only connecting is bounded by the timeout; the stream itself waits
    /// indefinitely for events.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon cannot be reached.
    pub async fn subscribe(&self) -> Result<Subscription, IpcError> {
        match tokio::time::timeout(self.timeout, self.connect(&IpcRequest::Subscribe)).await {
            Ok(reader) => Ok(Subscription {
                reader: BufReader::new(reader?),
                line: String::new(),
            }),
            Err(_) => Err(IpcError::Timeout(self.timeout_ms())),
        }
    }
}

impl Default for IpcClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Event stream opened with [`IpcClient::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    reader: BufReader<OwnedReadHalf>,
    line: String,
}

impl Subscription {
    /// Waits for the next event. Returns `None` once the daemon hangs up.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the daemon sends something other
    /// than an event.
    pub async fn next(&mut self) -> Result<Option<Event>, IpcError> {
        self.line.clear();
        if self.reader.read_line(&mut self.line).await? == 0 {
            return Ok(None);
        }
        let response: IpcResponse = serde_json::from_str(self.line.trim())?;
        match response {
            IpcResponse::Event { event } => Ok(Some(event)),
            IpcResponse::Skipped | IpcResponse::Error { .. } => Err(IpcError::InvalidResponse),
        }
    }
}
