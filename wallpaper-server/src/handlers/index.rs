//! Root page.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};

use crate::error::ApiError;
use crate::handlers::{AppState, ImageQuery};
use crate::render::{self, ResponseFormat};

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Wallpaper API</title>
</head>
<body>
<h1>Wallpaper API</h1>
<ul>
<li><code>GET /api/images?sort=alphabetical|reverse|random|none&amp;format=json|image</code> all images</li>
<li><code>GET /api/images/latest</code> last image of the ordered list</li>
<li><code>GET /api/images/position/{n}</code> image at index <code>n</code> (negative counts from the end)</li>
<li><code>GET /?format=image</code> redirect to a random image</li>
<li><code>GET /health</code>, <code>GET /ready</code>, <code>GET /api/debug</code></li>
<li><code>GET /api-docs/openapi.json</code> OpenAPI document</li>
</ul>
</body>
</html>
"#;

/// GET / and /index.html
///
/// With `format=image` the request is redirected to one random member of the
/// set; otherwise a short HTML page lists the endpoints.
#[utoipa::path(
    get,
    path = "/",
    tag = "Images",
    params(ImageQuery),
    responses(
        (status = 200, description = "Endpoint overview", content_type = "text/html"),
        (status = 308, description = "Redirect to a random image (format=image)"),
        (status = 404, description = "No images found (format=image only)"),
        (status = 500, description = "Image store error")
    )
)]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    match ResponseFormat::from_query(query.format.as_deref()) {
        ResponseFormat::Json => Ok(Html(INDEX_HTML).into_response()),
        ResponseFormat::Image => {
            let record = state
                .store
                .random_members(1)
                .await?
                .into_iter()
                .next()
                .ok_or_else(ApiError::no_images)?;
            render::redirect(&state, &record)
        }
    }
}
