//! Daily image feed: record types and a download client with retry.
//!
//! The upstream archive answers `HPImageArchive.aspx?format=js&idx=0&n=<count>&mkt=<market>`
//! with `{"images": [...]}`. The same record shape is kept in the on-disk
//! `<market>_all.json` (`data` array) and `<market>_update.json` (`images`
//! array) archives.

use std::path::Path;
use std::time::{Duration, Instant};

use backoff::{future::retry_notify, ExponentialBackoff};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default upstream archive endpoint.
pub const DEFAULT_FEED_URL: &str = "https://www.bing.com/HPImageArchive.aspx";

/// Errors raised while downloading or reading feed data.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Transport-level failure
    #[error("Feed request failed: {0}")]
    Http(String),

    /// Upstream answered with a non-success status
    #[error("Feed returned status {0}")]
    Status(StatusCode),

    /// Body could not be decoded
    #[error("Failed to parse feed: {0}")]
    Parse(String),

    /// Local feed file could not be read
    #[error("Failed to read feed file {path}: {reason}")]
    Io { path: String, reason: String },
}

/// One entry of a freshly fetched `<run_type>_temp.json` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Human title, used for logging only
    #[serde(default)]
    pub title: String,
    /// Image record inserted into the set
    pub url: String,
}

/// One image record as published by the upstream archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveImage {
    /// First day shown, `YYYYMMDD`
    #[serde(default)]
    pub startdate: String,
    /// Day after the last day shown, `YYYYMMDD`
    #[serde(default)]
    pub enddate: String,
    /// Relative image path
    #[serde(default)]
    pub url: String,
    /// Relative path without resolution suffix
    #[serde(default)]
    pub urlbase: String,
    #[serde(default)]
    pub copyright: String,
    #[serde(default)]
    pub title: String,
}

impl From<ArchiveImage> for FeedEntry {
    fn from(image: ArchiveImage) -> Self {
        Self {
            title: image.title,
            url: image.url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    #[serde(default)]
    images: Vec<ArchiveImage>,
}

/// Read a `<run_type>_temp.json` file.
pub fn read_feed_file(path: &Path) -> Result<Vec<FeedEntry>, FeedError> {
    let bytes = std::fs::read(path).map_err(|e| FeedError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| FeedError::Parse(e.to_string()))
}

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Archive endpoint
    pub api_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum retry attempts for transient errors
    pub max_retries: u32,
    /// Initial retry interval
    pub initial_interval: Duration,
    /// Maximum retry interval
    pub max_interval: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_FEED_URL.to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 3,
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(5),
        }
    }
}

/// HTTP client for the daily image archive.
pub struct FeedClient {
    client: Client,
    config: FeedConfig,
}

impl FeedClient {
    /// Create a client with default configuration.
    pub fn new() -> Result<Self, FeedError> {
        Self::with_config(FeedConfig::default())
    }

    /// Create a client with the given configuration.
    pub fn with_config(config: FeedConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FeedError::Http(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Fetch the latest `count` images for `market` (e.g. `zh-CN`).
    pub async fn fetch(&self, market: &str, count: u32) -> Result<Vec<ArchiveImage>, FeedError> {
        let count = count.clamp(1, 8).to_string();
        let backoff = self.build_backoff();

        let images = retry_notify(
            backoff,
            || {
                let count = count.as_str();
                async move { self.fetch_once(market, count).await }
            },
            |err: FeedError, duration: Duration| {
                warn!(
                    error = %err,
                    retry_after_ms = duration.as_millis() as u64,
                    "Retry scheduled"
                );
            },
        )
        .await?;

        info!(market, count = images.len(), "Fetched daily feed");
        Ok(images)
    }

    async fn fetch_once(
        &self,
        market: &str,
        count: &str,
    ) -> Result<Vec<ArchiveImage>, backoff::Error<FeedError>> {
        let start = Instant::now();

        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[("format", "js"), ("idx", "0"), ("n", count), ("mkt", market)])
            .send()
            .await
            .map_err(|e| {
                if is_transient_error(&e) {
                    warn!(error = %e, "Transient error, will retry");
                    backoff::Error::transient(FeedError::Http(e.to_string()))
                } else {
                    backoff::Error::permanent(FeedError::Http(e.to_string()))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return if is_transient_status(status) {
                warn!(status = %status, "Transient HTTP status, will retry");
                Err(backoff::Error::transient(FeedError::Status(status)))
            } else {
                Err(backoff::Error::permanent(FeedError::Status(status)))
            };
        }

        let parsed: ArchiveResponse = response
            .json()
            .await
            .map_err(|e| backoff::Error::permanent(FeedError::Parse(e.to_string())))?;

        debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            "Feed request completed"
        );
        Ok(parsed.images)
    }

    fn build_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.config.initial_interval,
            max_interval: self.config.max_interval,
            max_elapsed_time: Some(self.config.timeout * self.config.max_retries),
            ..Default::default()
        }
    }
}

/// Check if a reqwest error is transient and should be retried.
pub fn is_transient_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

/// Check if an HTTP status code indicates a transient error.
pub fn is_transient_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
            | StatusCode::BAD_GATEWAY
    )
}
