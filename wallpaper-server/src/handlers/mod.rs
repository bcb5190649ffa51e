//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod debug;
pub mod health;
pub mod images;
pub mod index;

pub use crate::state::AppState;
pub use debug::{debug_info, DebugErrorResponse, DebugResponse, EnvironmentFlags};
pub use health::{health, ready, HealthResponse, ReadyResponse};
pub use images::{
    image_at_position, latest_image, list_images, ImageListResponse, ImageQuery,
    SingleImageResponse,
};
pub use index::index;
