//! Image query handlers
//!
//! List, latest and positional lookups over the ordered image set.

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use wallpaper_core::{
    build_image_list, parse_position, resolve_image_url, select_latest, select_position, Selected,
    SortOrder,
};

use crate::error::ApiError;
use crate::handlers::AppState;
use crate::render::{self, ResponseFormat};

/// Query parameters shared by the image endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImageQuery {
    /// Ordering policy: alphabetical, reverse, random or none
    #[param(default = "alphabetical")]
    pub sort: Option<String>,

    /// Response format: json or image (redirect)
    #[param(default = "json")]
    pub format: Option<String>,
}

impl ImageQuery {
    fn order(&self) -> SortOrder {
        SortOrder::from_query(self.sort.as_deref())
    }

    fn format(&self) -> ResponseFormat {
        ResponseFormat::from_query(self.format.as_deref())
    }
}

/// Full ordered image list
#[derive(Debug, Serialize, ToSchema)]
pub struct ImageListResponse {
    /// Always "success"
    pub status: String,
    /// Number of images
    pub count: usize,
    /// Ordering policy applied
    pub sort: String,
    /// Image records in order
    pub images: Vec<String>,
}

/// One image chosen from the ordered list
#[derive(Debug, Serialize, ToSchema)]
pub struct SingleImageResponse {
    /// Always "success"
    pub status: String,
    /// Zero-based index within the ordered list
    pub position: usize,
    /// Size of the ordered list
    pub total: usize,
    /// Ordering policy applied
    pub sort: String,
    /// Stored image record
    pub image: String,
    /// Record resolved to an absolute URL
    pub full_url: String,
}

impl SingleImageResponse {
    fn new(state: &AppState, selected: Selected, order: SortOrder) -> Self {
        Self {
            status: "success".to_string(),
            position: selected.position,
            total: selected.total,
            sort: order.as_str().to_string(),
            full_url: resolve_image_url(&state.image_base_url, &selected.image),
            image: selected.image,
        }
    }
}

fn render_single(
    state: &AppState,
    selected: Selected,
    query: &ImageQuery,
) -> Result<Response, ApiError> {
    match query.format() {
        ResponseFormat::Image => render::redirect(state, &selected.image),
        ResponseFormat::Json => Ok(render::json(SingleImageResponse::new(
            state,
            selected,
            query.order(),
        ))),
    }
}

/// List all images
///
/// Returns every image in the requested order. With `format=image` the
/// response redirects to one image picked at random from the list.
#[utoipa::path(
    get,
    path = "/api/images",
    tag = "Images",
    params(ImageQuery),
    responses(
        (status = 200, description = "Ordered image list", body = ImageListResponse),
        (status = 308, description = "Redirect to a random image (format=image)"),
        (status = 404, description = "No images found (format=image only)"),
        (status = 500, description = "Image store error")
    )
)]
pub async fn list_images(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    let order = query.order();
    let images = build_image_list(state.store.as_ref(), order).await?;

    match query.format() {
        ResponseFormat::Image => {
            let pick = images.choose(&mut rand::rng()).ok_or_else(ApiError::no_images)?;
            render::redirect(&state, pick)
        }
        ResponseFormat::Json => Ok(render::json(ImageListResponse {
            status: "success".to_string(),
            count: images.len(),
            sort: order.as_str().to_string(),
            images,
        })),
    }
}

/// Latest image
///
/// The last element of the ordered list. With the default alphabetical
/// ordering that is the lexicographically greatest record.
#[utoipa::path(
    get,
    path = "/api/images/latest",
    tag = "Images",
    params(ImageQuery),
    responses(
        (status = 200, description = "Last image of the ordered list", body = SingleImageResponse),
        (status = 308, description = "Redirect to the image (format=image)"),
        (status = 404, description = "No images found"),
        (status = 500, description = "Image store error")
    )
)]
pub async fn latest_image(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    let images = build_image_list(state.store.as_ref(), query.order()).await?;
    let selected = select_latest(&images).ok_or_else(ApiError::no_images)?;
    render_single(&state, selected, &query)
}

/// Image at a position
///
/// Negative positions count from the end: `-1` is the last image. Only the
/// last path segment is read, so a trailing slash is an invalid position.
#[utoipa::path(
    get,
    path = "/api/images/position/{position}",
    tag = "Images",
    params(
        ("position" = i64, Path, description = "Zero-based index, negative counts from the end"),
        ImageQuery
    ),
    responses(
        (status = 200, description = "Image at the position", body = SingleImageResponse),
        (status = 308, description = "Redirect to the image (format=image)"),
        (status = 400, description = "Position is not an integer or out of range"),
        (status = 404, description = "No images found"),
        (status = 500, description = "Image store error")
    )
)]
pub async fn image_at_position(
    State(state): State<AppState>,
    position: Option<Path<String>>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    let raw = position.map(|Path(raw)| raw).unwrap_or_default();
    let requested = parse_position(raw.rsplit('/').next().unwrap_or_default())?;
    let images = build_image_list(state.store.as_ref(), query.order()).await?;
    let selected = select_position(&images, requested)?;
    render_single(&state, selected, &query)
}
