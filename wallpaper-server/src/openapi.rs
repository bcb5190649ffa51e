//! OpenAPI documentation configuration
//!
//! Generates the OpenAPI 3 document served at `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::handlers::{
    DebugErrorResponse, DebugResponse, EnvironmentFlags, HealthResponse, ImageListResponse,
    ReadyResponse, SingleImageResponse,
};

/// Wallpaper API - OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wallpaper API",
        version = "0.1.0",
        description = r#"
## Daily wallpaper images

Serves the wallpaper image set in a chosen order.

- `sort` selects the ordering: `alphabetical` (default), `reverse`, `random` or `none`
- `format=image` answers with a `308` redirect to the image instead of JSON
- Positions may be negative: `-1` is the last image

Errors are JSON objects `{"status": "error", "message": ..., "code": ...}`.
"#,
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    tags(
        (name = "Images", description = "Ordered, positional and random image lookups"),
        (name = "Health", description = "Service health, readiness and store diagnostics")
    ),
    paths(
        crate::handlers::index::index,
        crate::handlers::images::list_images,
        crate::handlers::images::latest_image,
        crate::handlers::images::image_at_position,
        crate::handlers::health::health,
        crate::handlers::health::ready,
        crate::handlers::debug::debug_info,
    ),
    components(
        schemas(
            ImageListResponse,
            SingleImageResponse,
            HealthResponse,
            ReadyResponse,
            DebugResponse,
            DebugErrorResponse,
            EnvironmentFlags,
        )
    )
)]
pub struct ApiDoc;
