//! IPC between the daemon and CLI front-ends.
//!
//! # Architecture
//!
//! ```text
//! CLI                            Daemon
//!  |                               |
//!  |-- IpcRequest ---------------->|
//!  |                               | (refresh / clear / badge)
//!  |<-- IpcResponse ---------------|
//!  |                               |
//!  |-- subscribe ----------------->|
//!  |<-- event, event, ... ---------|
//! ```
//!
//! # Protocol
//!
//! Communication uses JSON-line format over Unix domain sockets:
//! - Client sends JSON + newline
//! - Server responds with JSON + newline, once, or once per event for
//!   `subscribe`
//!
//! # Example
//!
//! ```no_run
//! use paperboy::ipc::{IpcClient, IpcRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = IpcClient::new();
//!
//! if client.is_daemon_running() {
//!     let response = client.send(&IpcRequest::Refresh).await?;
//!     println!("Daemon answered: {response:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod server;
pub mod types;

pub use client::{IpcClient, Subscription};
pub use server::{IpcServer, ServerHandle};
pub use types::{IpcError, IpcRequest, IpcResponse};

/// Default socket path for daemon IPC.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/paperboy.sock";
