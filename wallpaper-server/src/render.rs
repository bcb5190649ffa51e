//! Response rendering
//!
//! A successful result is either serialised as JSON or turned into a `308`
//! redirect to the resolved image URL, depending on the `format` query
//! parameter. Both carry a permissive `Access-Control-Allow-Origin` header.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use wallpaper_core::resolve_image_url;

use crate::error::ApiError;
use crate::state::AppState;

/// How a successful result is delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Structured JSON payload
    #[default]
    Json,
    /// Redirect to the image itself
    Image,
}

impl ResponseFormat {
    /// Parse the `format` query value. Anything other than `image` is JSON.
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("image") => Self::Image,
            _ => Self::Json,
        }
    }
}

/// `200` JSON response with the permissive CORS header.
pub fn json<T: Serialize>(body: T) -> Response {
    with_cors((StatusCode::OK, Json(body)).into_response())
}

/// `308` redirect to `record` resolved against the configured origin.
pub fn redirect(state: &AppState, record: &str) -> Result<Response, ApiError> {
    let target = resolve_image_url(&state.image_base_url, record);
    let location = HeaderValue::from_str(&target)
        .map_err(|_| ApiError::internal(format!("Image URL is not a valid header: {target}")))?;
    let cache_control = HeaderValue::from_str(&state.redirect_cache_control)
        .map_err(|_| ApiError::internal("Invalid redirect Cache-Control value"))?;

    tracing::debug!(location = %target, "Redirecting to image");

    let mut response = StatusCode::PERMANENT_REDIRECT.into_response();
    let headers = response.headers_mut();
    headers.insert(header::LOCATION, location);
    headers.insert(header::CACHE_CONTROL, cache_control);
    Ok(with_cors(response))
}

fn with_cors(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}
