//! IPC message types.
//!
//! Requests flow from CLI front-ends to the daemon; responses flow back.

use serde::{Deserialize, Serialize};

use crate::notifier::Event;

/// Request from a front-end to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum IpcRequest {
    /// Run a refresh cycle and report how it ended.
    Refresh,
    /// Track a new user, then refresh.
    SetUsername { username: String },
    /// Overwrite the badge count.
    BadgeUpdate { count: usize },
    /// Dismiss one reply.
    ClearReply { post_id: u64 },
    /// Dismiss every reply.
    ClearAll,
    /// Keep the connection open and stream every event.
    Subscribe,
}

/// Response from the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "response", rename_all = "snake_case")]
pub enum IpcResponse {
    Event { event: Event },
    /// The refresh was skipped because no username is set.
    Skipped,
    Error { message: String },
}

impl IpcResponse {
    #[must_use]
    pub fn event(event: Event) -> Self {
        Self::Event { event }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Errors that can occur during IPC.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Failed to connect to the daemon socket.
    #[error("Failed to connect to daemon: {0}")]
    ConnectionFailed(#[from] std::io::Error),

    /// Nothing is listening on the socket.
    #[error("Daemon not running (socket not found)")]
    DaemonNotRunning,

    /// The operation timed out.
    #[error("IPC timeout after {0}ms")]
    Timeout(u64),

    /// Failed to serialize or deserialize a message.
    #[error("Failed to serialize message: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The daemon closed the connection without answering.
    #[error("Invalid response from daemon")]
    InvalidResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_format() {
        assert_eq!(
            serde_json::to_string(&IpcRequest::Refresh).unwrap(),
            r#"{"request":"refresh"}"#
        );
        assert_eq!(
            serde_json::to_string(&IpcRequest::ClearReply { post_id: 42 }).unwrap(),
            r#"{"request":"clear_reply","post_id":42}"#
        );
        let parsed: IpcRequest =
            serde_json::from_str(r#"{"request":"set_username","username":"pg"}"#).unwrap();
        assert_eq!(
            parsed,
            IpcRequest::SetUsername {
                username: "pg".to_string()
            }
        );
    }

    #[test]
    fn event_response_nests_event() {
        let response = IpcResponse::event(Event::BadgeUpdate { count: 2 });
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(
            json,
            r#"{"response":"event","event":{"event":"badge_update","count":2}}"#
        );
        let parsed: IpcResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, response);
    }

    #[test]
    fn error_response() {
        let json = serde_json::to_string(&IpcResponse::error("boom")).unwrap();
        assert_eq!(json, r#"{"response":"error","message":"boom"}"#);
    }

    #[test]
    fn unknown_request_is_rejected() {
        assert!(serde_json::from_str::<IpcRequest>(r#"{"request":"explode"}"#).is_err());
    }

    #[test]
    fn ipc_error_display() {
        let err = IpcError::DaemonNotRunning;
        assert_eq!(err.to_string(), "Daemon not running (socket not found)");

        let err = IpcError::Timeout(4000);
        assert_eq!(err.to_string(), "IPC timeout after 4000ms");
    }
}
