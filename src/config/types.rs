//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Content API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the content API, without a trailing slash.
    pub base_url: String,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Overall per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl ApiConfig {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://hacker-news.firebaseio.com/v0".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
        }
    }
}

/// Polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between timer-driven refresh cycles.
    pub interval_secs: u64,
    /// Only root posts newer than this many days are scanned for replies.
    pub window_days: u64,
}

impl PollConfig {
    /// Poll interval, at least one second.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    /// Length of the recent-post window in seconds.
    #[must_use]
    pub fn window_secs(&self) -> i64 {
        i64::try_from(self.window_days.saturating_mul(86_400)).unwrap_or(i64::MAX)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10 * 60,
            window_days: 7,
        }
    }
}

/// Local state storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the state database. Defaults to the platform data directory.
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the database path, falling back to `default_state_path`.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(crate::store::default_state_path)
    }
}

/// IPC socket configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IpcConfig {
    pub socket_path: PathBuf,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(crate::ipc::DEFAULT_SOCKET_PATH),
        }
    }
}

/// Top-level notifier configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PaperboyConfig {
    pub api: ApiConfig,
    pub poll: PollConfig,
    pub storage: StorageConfig,
    pub ipc: IpcConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_config_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "https://hacker-news.firebaseio.com/v0");
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_poll_config_defaults() {
        let config = PollConfig::default();
        assert_eq!(config.interval(), Duration::from_mins(10));
        assert_eq!(config.window_secs(), 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = PollConfig {
            interval_secs: 0,
            window_days: 7,
        };
        assert_eq!(config.interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_window_secs_saturates() {
        let config = PollConfig {
            interval_secs: 1,
            window_days: u64::MAX,
        };
        assert_eq!(config.window_secs(), i64::MAX);
    }

    #[test]
    fn test_storage_explicit_path() {
        let config = StorageConfig {
            path: Some(PathBuf::from("/tmp/state.db")),
        };
        assert_eq!(config.resolved_path(), PathBuf::from("/tmp/state.db"));
    }

    #[test]
    fn test_storage_default_path() {
        let config = StorageConfig::default();
        assert!(config.resolved_path().ends_with("paperboy/state.db"));
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
            [poll]
            interval_secs = 60

            [api]
            base_url = "http://localhost:9000/v0"
        "#;
        let config: PaperboyConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.poll.interval_secs, 60);
        assert_eq!(config.poll.window_days, 7);
        assert_eq!(config.api.base_url, "http://localhost:9000/v0");
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.ipc, IpcConfig::default());
    }
}
