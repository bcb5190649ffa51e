//! Redis implementation of the image set store.

use std::future::Future;
use std::time::Duration;

use ::redis::aio::MultiplexedConnection;
use ::redis::{AsyncCommands, Client};
use async_trait::async_trait;
use tracing::{debug, info};

use super::{ImageSetWriter, ImageStore, StoreConfig, StoreError};

/// Redis-backed image set.
///
/// Holds only the client handle. Each operation opens its own connection,
/// bounded by the configured timeout, and drops it when the call returns, so
/// no connection outlives a request.
#[derive(Clone)]
pub struct RedisImageStore {
    client: Client,
    set_key: String,
    timeout: Duration,
}

impl std::fmt::Debug for RedisImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisImageStore")
            .field("set_key", &self.set_key)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RedisImageStore {
    /// Create a store from connection parameters.
    ///
    /// Does not connect; the first operation does.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let url = config.connection_url()?;
        let client = Client::open(url)
            .map_err(|e| StoreError::Config(format!("Invalid Redis connection parameters: {e}")))?;

        info!(
            host = %config.host,
            port = config.port,
            tls = config.tls,
            set_key = %config.set_key,
            "Configured Redis image store"
        );

        Ok(Self {
            client,
            set_key: config.set_key.clone(),
            timeout: config.timeout,
        })
    }

    /// Create a store from environment variables (see [`StoreConfig::from_env`]).
    pub fn from_env() -> Result<Self, StoreError> {
        Self::new(&StoreConfig::from_env()?)
    }

    async fn connect(&self) -> Result<MultiplexedConnection, StoreError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))
    }

    /// Run one whole operation, connect included, under the configured timeout.
    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout {
                operation,
                timeout: self.timeout,
            }),
        }
    }
}

#[async_trait]
impl ImageStore for RedisImageStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.bounded("PING", async {
            let mut conn = self.connect().await?;
            ::redis::cmd("PING")
                .query_async::<String>(&mut conn)
                .await
                .map(|_| ())
                .map_err(StoreError::from)
        })
        .await
    }

    async fn exists(&self) -> Result<bool, StoreError> {
        let exists: bool = self
            .bounded("EXISTS", async {
                let mut conn = self.connect().await?;
                conn.exists(&self.set_key).await.map_err(StoreError::from)
            })
            .await?;
        debug!(key = %self.set_key, exists, "EXISTS");
        Ok(exists)
    }

    async fn cardinality(&self) -> Result<usize, StoreError> {
        let count: usize = self
            .bounded("SCARD", async {
                let mut conn = self.connect().await?;
                conn.scard(&self.set_key).await.map_err(StoreError::from)
            })
            .await?;
        debug!(key = %self.set_key, count, "SCARD");
        Ok(count)
    }

    async fn members(&self) -> Result<Vec<String>, StoreError> {
        let members: Vec<String> = self
            .bounded("SMEMBERS", async {
                let mut conn = self.connect().await?;
                conn.smembers(&self.set_key).await.map_err(StoreError::from)
            })
            .await?;
        debug!(key = %self.set_key, count = members.len(), "SMEMBERS");
        Ok(members)
    }

    async fn random_members(&self, count: usize) -> Result<Vec<String>, StoreError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        // A negative count would allow repeats.
        let requested = isize::try_from(count).unwrap_or(isize::MAX);
        let members: Vec<String> = self
            .bounded("SRANDMEMBER", async {
                let mut conn = self.connect().await?;
                conn.srandmember_multiple(&self.set_key, requested)
                    .await
                    .map_err(StoreError::from)
            })
            .await?;
        debug!(key = %self.set_key, requested = count, returned = members.len(), "SRANDMEMBER");
        Ok(members)
    }

    fn set_key(&self) -> &str {
        &self.set_key
    }
}

#[async_trait]
impl ImageSetWriter for RedisImageStore {
    async fn add(&self, record: &str) -> Result<bool, StoreError> {
        let added: usize = self
            .bounded("SADD", async {
                let mut conn = self.connect().await?;
                conn.sadd(&self.set_key, record).await.map_err(StoreError::from)
            })
            .await?;
        Ok(added == 1)
    }

    async fn add_batch(&self, records: &[String]) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }
        let mut pipe = ::redis::pipe();
        for record in records {
            pipe.sadd(&self.set_key, record);
        }
        let added: Vec<usize> = self
            .bounded("SADD pipeline", async {
                let mut conn = self.connect().await?;
                pipe.query_async(&mut conn).await.map_err(StoreError::from)
            })
            .await?;
        let added = added.into_iter().sum();
        debug!(key = %self.set_key, batch = records.len(), added, "Pipelined SADD");
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_does_not_connect() {
        let mut config = StoreConfig::new("127.0.0.1");
        config.tls = false;
        let store = RedisImageStore::new(&config).unwrap();
        assert_eq!(store.set_key(), "bing_images");
    }

    #[tokio::test]
    async fn test_unreachable_store_reports_fault() {
        let mut config = StoreConfig::new("127.0.0.1");
        config.tls = false;
        config.port = 1;
        config.timeout = Duration::from_secs(1);
        let store = RedisImageStore::new(&config).unwrap();

        let err = store.members().await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Connection(_) | StoreError::Timeout { .. }
        ));
    }

    fn unreachable_store() -> Box<dyn ImageStore> {
        let mut config = StoreConfig::new("127.0.0.1");
        config.tls = false;
        config.port = 1;
        config.timeout = Duration::from_secs(1);
        Box::new(RedisImageStore::new(&config).unwrap())
    }

    #[tokio::test]
    async fn test_random_members_through_trait_object() {
        let store = unreachable_store();

        assert!(store.random_members(0).await.unwrap().is_empty());

        let err = store.random_members(3).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Connection(_) | StoreError::Timeout { .. }
        ));
    }

    #[tokio::test]
    async fn test_timeout_covers_connect_and_command() {
        let mut config = StoreConfig::new("10.255.255.1");
        config.tls = false;
        config.timeout = Duration::from_millis(200);
        let store = RedisImageStore::new(&config).unwrap();

        let started = std::time::Instant::now();
        let err = store.members().await.unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(matches!(
            err,
            StoreError::Connection(_) | StoreError::Timeout { .. }
        ));
    }
}
