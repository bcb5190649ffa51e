//! In-memory image set for tests and local development.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use rand::seq::IteratorRandom;

use super::{ImageSetWriter, ImageStore, StoreError, DEFAULT_SET_KEY};

/// In-memory image set.
///
/// Clones share the same underlying set. A store created with
/// [`MemoryImageStore::missing`] behaves like a key that was never written,
/// and [`MemoryImageStore::unavailable`] fails every call the way an
/// unreachable server does.
#[derive(Debug, Clone)]
pub struct MemoryImageStore {
    records: Arc<RwLock<Option<HashSet<String>>>>,
    unavailable: bool,
}

impl MemoryImageStore {
    /// Empty store whose key does not exist yet.
    pub fn missing() -> Self {
        Self {
            records: Arc::new(RwLock::new(None)),
            unavailable: false,
        }
    }

    /// Store pre-populated with `records`.
    pub fn from_records<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: HashSet<String> = records.into_iter().map(Into::into).collect();
        Self {
            records: Arc::new(RwLock::new(Some(set))),
            unavailable: false,
        }
    }

    /// Store that fails every operation with a connection error.
    pub fn unavailable() -> Self {
        Self {
            records: Arc::new(RwLock::new(None)),
            unavailable: true,
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable {
            Err(StoreError::Connection("Connection refused (in-memory store marked unavailable)".into()))
        } else {
            Ok(())
        }
    }

    fn snapshot(&self) -> Result<Option<HashSet<String>>, StoreError> {
        self.check()?;
        let guard = self
            .records
            .read()
            .map_err(|_| StoreError::Command("In-memory store lock poisoned".into()))?;
        Ok(guard.clone())
    }
}

impl Default for MemoryImageStore {
    fn default() -> Self {
        Self::missing()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }

    async fn exists(&self) -> Result<bool, StoreError> {
        Ok(self.snapshot()?.is_some_and(|set| !set.is_empty()))
    }

    async fn cardinality(&self) -> Result<usize, StoreError> {
        Ok(self.snapshot()?.map_or(0, |set| set.len()))
    }

    async fn members(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .snapshot()?
            .map(|set| set.into_iter().collect())
            .unwrap_or_default())
    }

    async fn random_members(&self, count: usize) -> Result<Vec<String>, StoreError> {
        let set = self.snapshot()?.unwrap_or_default();
        Ok(set.into_iter().choose_multiple(&mut rand::rng(), count))
    }

    fn set_key(&self) -> &str {
        DEFAULT_SET_KEY
    }
}

#[async_trait]
impl ImageSetWriter for MemoryImageStore {
    async fn add(&self, record: &str) -> Result<bool, StoreError> {
        self.check()?;
        let mut guard = self
            .records
            .write()
            .map_err(|_| StoreError::Command("In-memory store lock poisoned".into()))?;
        Ok(guard.get_or_insert_with(HashSet::new).insert(record.to_string()))
    }

    async fn add_batch(&self, records: &[String]) -> Result<usize, StoreError> {
        self.check()?;
        let mut guard = self
            .records
            .write()
            .map_err(|_| StoreError::Command("In-memory store lock poisoned".into()))?;
        let set = guard.get_or_insert_with(HashSet::new);
        Ok(records.iter().filter(|r| set.insert((*r).clone())).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key() {
        let store = MemoryImageStore::missing();
        assert!(!store.exists().await.unwrap());
        assert_eq!(store.cardinality().await.unwrap(), 0);
        assert!(store.members().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_semantics() {
        let store = MemoryImageStore::missing();
        assert!(store.add("/a.jpg").await.unwrap());
        assert!(!store.add("/a.jpg").await.unwrap());
        let added = store
            .add_batch(&["/a.jpg".to_string(), "/b.jpg".to_string(), "/b.jpg".to_string()])
            .await
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(store.cardinality().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_random_members_are_distinct_and_bounded() {
        let store = MemoryImageStore::from_records(["/a.jpg", "/b.jpg", "/c.jpg"]);
        let sample = store.random_members(5).await.unwrap();
        assert_eq!(sample.len(), 3);

        let sample = store.random_members(2).await.unwrap();
        assert_eq!(sample.len(), 2);
        assert_ne!(sample[0], sample[1]);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = MemoryImageStore::unavailable();
        assert!(matches!(
            store.members().await,
            Err(StoreError::Connection(_))
        ));
        assert!(store.ping().await.is_err());
    }
}
