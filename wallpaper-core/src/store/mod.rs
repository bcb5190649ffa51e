//! Image set store.
//!
//! The wallpaper catalogue lives in a single set under one well-known key.
//! Readers only need four operations (exists, cardinality, members, random
//! members); ingestion jobs additionally insert members.
//!
//! - [`RedisImageStore`] - remote Redis set, one scoped connection per call
//! - [`MemoryImageStore`] - in-process set for tests and local development

pub mod error;
mod memory;
mod redis;

pub use error::StoreError;
pub use memory::MemoryImageStore;
pub use self::redis::RedisImageStore;

use std::time::Duration;

use async_trait::async_trait;

/// Default key of the image set.
pub const DEFAULT_SET_KEY: &str = "bing_images";

/// Default per-operation timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound for the per-operation timeout.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(10);

/// Read access to the image set.
///
/// Implementations must be thread-safe (`Send + Sync`). Every call is an
/// independent snapshot of the set.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Check that the store answers at all.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Whether the set key exists.
    async fn exists(&self) -> Result<bool, StoreError>;

    /// Number of members in the set (0 when the key is missing).
    async fn cardinality(&self) -> Result<usize, StoreError>;

    /// All members, in the store's native (unspecified) order.
    async fn members(&self) -> Result<Vec<String>, StoreError>;

    /// Up to `count` distinct random members.
    async fn random_members(&self, count: usize) -> Result<Vec<String>, StoreError>;

    /// Key of the set this store reads.
    fn set_key(&self) -> &str;
}

/// Write access to the image set, used by ingestion jobs only.
#[async_trait]
pub trait ImageSetWriter: Send + Sync {
    /// Insert one record. Returns `true` when it was not present before.
    async fn add(&self, record: &str) -> Result<bool, StoreError>;

    /// Insert many records in one round trip. Returns how many were new.
    async fn add_batch(&self, records: &[String]) -> Result<usize, StoreError>;
}

/// Connection parameters for the Redis set store.
#[derive(Clone)]
pub struct StoreConfig {
    /// Redis host name
    pub host: String,
    /// Redis port (default: 6379)
    pub port: u16,
    /// Optional password
    pub password: Option<String>,
    /// Connect over TLS (default: true)
    pub tls: bool,
    /// Key of the image set (default: `bing_images`)
    pub set_key: String,
    /// Bound on connect and on every command (default: 5s, max 10s)
    pub timeout: Duration,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("tls", &self.tls)
            .field("set_key", &self.set_key)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl StoreConfig {
    /// Create a configuration for `host` with default settings.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 6379,
            password: None,
            tls: true,
            set_key: DEFAULT_SET_KEY.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required: `REDIS_HOST`
    /// Optional: `REDIS_PORT`, `REDIS_PASSWORD` (or `PASSWORD`), `REDIS_SSL`,
    /// `REDIS_SET_NAME`, `REDIS_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("REDIS_HOST")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .ok_or_else(|| StoreError::Config("REDIS_HOST environment variable not set".into()))?;

        let port = match lookup("REDIS_PORT") {
            Some(p) => p
                .trim()
                .parse()
                .map_err(|_| StoreError::Config(format!("REDIS_PORT is not a valid port: {p}")))?,
            None => 6379,
        };

        let password = lookup("REDIS_PASSWORD")
            .or_else(|| lookup("PASSWORD"))
            .filter(|p| !p.is_empty());

        let tls = lookup("REDIS_SSL")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let set_key = lookup("REDIS_SET_NAME")
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| DEFAULT_SET_KEY.to_string());

        let timeout = lookup("REDIS_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
            .clamp(Duration::from_secs(1), MAX_TIMEOUT);

        Ok(Self {
            host,
            port,
            password,
            tls,
            set_key,
            timeout,
        })
    }

    /// Connection URL understood by the Redis client (`redis://` or `rediss://`).
    pub fn connection_url(&self) -> Result<String, StoreError> {
        let scheme = if self.tls { "rediss" } else { "redis" };
        let mut url = ::url::Url::parse(&format!("{scheme}://localhost/"))
            .map_err(|e| StoreError::Config(e.to_string()))?;
        url.set_host(Some(&self.host))
            .map_err(|e| StoreError::Config(format!("Invalid REDIS_HOST '{}': {e}", self.host)))?;
        url.set_port(Some(self.port))
            .map_err(|_| StoreError::Config("Cannot set port on Redis URL".into()))?;
        if let Some(password) = &self.password {
            url.set_username("default")
                .map_err(|_| StoreError::Config("Cannot set username on Redis URL".into()))?;
            url.set_password(Some(password))
                .map_err(|_| StoreError::Config("Cannot set password on Redis URL".into()))?;
        }
        Ok(url.to_string())
    }
}
