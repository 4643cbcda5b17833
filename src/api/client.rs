//! HTTP client for the Hacker News content API.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;

use super::{Item, User};

/// Errors from content API operations.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("API request failed: {0}")]
    RequestFailed(String),
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Failed to parse response: {0}")]
    ParseError(String),
    #[error("API request timed out")]
    Timeout,
}

/// Read access to users and items.
///
/// Both lookups return `Ok(None)` when the API answers `null`.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Look up a user by name.
    async fn user(&self, username: &str) -> Result<Option<User>, ApiError>;

    /// Look up a single item by id.
    async fn item(&self, id: u64) -> Result<Option<Item>, ApiError>;
}

/// Client for the Firebase-hosted Hacker News API.
#[derive(Debug, Clone)]
pub struct HackerNewsClient {
    client: Client,
    base_url: Url,
}

impl HackerNewsClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidBaseUrl` if the base URL cannot be parsed or
    /// cannot carry a path, and `ApiError::RequestFailed` if the HTTP client
    /// cannot be built.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.base_url.clone()));
        }

        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/{kind}/{name}.json`, percent-encoding `name`.
    fn endpoint(&self, kind: &str, name: &str) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `from_config`.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(kind).push(&format!("{name}.json"));
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, ApiError> {
        tracing::debug!(url = %url, "GET");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<Option<T>>()
            .await
            .map_err(|e| ApiError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl ItemSource for HackerNewsClient {
    async fn user(&self, username: &str) -> Result<Option<User>, ApiError> {
        self.get_json(self.endpoint("user", username)).await
    }

    async fn item(&self, id: u64) -> Result<Option<Item>, ApiError> {
        self.get_json(self.endpoint("item", &id.to_string())).await
    }
}
