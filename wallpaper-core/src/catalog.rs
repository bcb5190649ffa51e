//! Image list builder.

use tracing::debug;

use crate::ordering::SortOrder;
use crate::store::{ImageStore, StoreError};

/// Snapshot the image set and order it.
///
/// A missing key or an empty set yields an empty list; the only error is a
/// store fault. Reads the set with a single `members` call.
pub async fn build_image_list<S>(store: &S, order: SortOrder) -> Result<Vec<String>, StoreError>
where
    S: ImageStore + ?Sized,
{
    // SMEMBERS on a missing key is an empty set.
    let mut images = store.members().await?;
    order.apply(&mut images);

    debug!(
        key = store.set_key(),
        count = images.len(),
        sort = %order,
        "Built image list"
    );
    Ok(images)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::store::MemoryImageStore;

    /// Answers `members` but fails every other read.
    struct MembersOnly(Vec<String>);

    #[async_trait]
    impl ImageStore for MembersOnly {
        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Command("unexpected PING".into()))
        }

        async fn exists(&self) -> Result<bool, StoreError> {
            Err(StoreError::Command("unexpected EXISTS".into()))
        }

        async fn cardinality(&self) -> Result<usize, StoreError> {
            Err(StoreError::Command("unexpected SCARD".into()))
        }

        async fn members(&self) -> Result<Vec<String>, StoreError> {
            Ok(self.0.clone())
        }

        async fn random_members(&self, _count: usize) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Command("unexpected SRANDMEMBER".into()))
        }

        fn set_key(&self) -> &str {
            "bing_images"
        }
    }

    #[tokio::test]
    async fn test_single_members_round_trip() {
        let store = MembersOnly(vec!["/b.jpg".into(), "/a.jpg".into()]);
        let images = build_image_list(&store, SortOrder::Alphabetical).await.unwrap();
        assert_eq!(images, vec!["/a.jpg", "/b.jpg"]);

        let empty = MembersOnly(Vec::new());
        assert!(build_image_list(&empty, SortOrder::None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_set_is_empty() {
        let store = MemoryImageStore::missing();
        let images = build_image_list(&store, SortOrder::Alphabetical).await.unwrap();
        assert!(images.is_empty());
    }

    #[tokio::test]
    async fn test_orders_snapshot() {
        let store = MemoryImageStore::from_records(["/a.jpg", "/c.jpg", "/b.jpg"]);

        let asc = build_image_list(&store, SortOrder::Alphabetical).await.unwrap();
        assert_eq!(asc, vec!["/a.jpg", "/b.jpg", "/c.jpg"]);

        let desc = build_image_list(&store, SortOrder::Reverse).await.unwrap();
        assert_eq!(desc, vec!["/c.jpg", "/b.jpg", "/a.jpg"]);

        let mut shuffled = build_image_list(&store, SortOrder::Random).await.unwrap();
        shuffled.sort();
        assert_eq!(shuffled, asc);
    }

    #[tokio::test]
    async fn test_store_fault_propagates() {
        let store = MemoryImageStore::unavailable();
        let err = build_image_list(&store, SortOrder::None).await.unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));
    }

    #[tokio::test]
    async fn test_works_through_trait_object() {
        let store: Box<dyn ImageStore> = Box::new(MemoryImageStore::from_records(["/x.jpg"]));
        let images = build_image_list(store.as_ref(), SortOrder::Alphabetical)
            .await
            .unwrap();
        assert_eq!(images, vec!["/x.jpg"]);
    }
}
