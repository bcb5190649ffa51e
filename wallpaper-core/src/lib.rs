//! Wallpaper Core - image set access and tooling for the wallpaper service
//!
//! This crate holds everything that is not HTTP specific:
//!
//! - The image set store abstraction ([`ImageStore`], [`ImageSetWriter`]) with a
//!   Redis backend and an in-memory backend
//! - Ordering policies and the image list builder
//! - Positional selection with negative-index wraparound
//! - Resolution of stored records to absolute image URLs
//! - Daily feed download, ingestion, archive pruning and README generation
//!
//! # Example
//!
//! ```no_run
//! use wallpaper_core::{build_image_list, MemoryImageStore, SortOrder};
//!
//! # async fn example() -> Result<(), wallpaper_core::StoreError> {
//! let store = MemoryImageStore::from_records(["/b.jpg", "/a.jpg"]);
//! let images = build_image_list(&store, SortOrder::Alphabetical).await?;
//! assert_eq!(images, vec!["/a.jpg", "/b.jpg"]);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod catalog;
pub mod feed;
pub mod image_url;
pub mod ingest;
pub mod ordering;
pub mod readme;
pub mod selection;
pub mod store;

pub use archive::{ArchiveError, FileOutcome, PruneOptions, PruneSummary};
pub use catalog::build_image_list;
pub use feed::{ArchiveImage, FeedClient, FeedConfig, FeedEntry, FeedError};
pub use image_url::{resolve_image_url, DEFAULT_IMAGE_BASE_URL};
pub use ingest::{ingest_entries, insert_batched, IngestReport};
pub use ordering::SortOrder;
pub use readme::{load_all_archive, render_readme};
pub use selection::{
    parse_position, resolve_position, select_latest, select_position, PositionError, Selected,
};
pub use store::{
    ImageSetWriter, ImageStore, MemoryImageStore, RedisImageStore, StoreConfig, StoreError,
};
