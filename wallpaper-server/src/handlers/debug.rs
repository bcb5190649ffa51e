//! Store diagnostics.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use wallpaper_core::{ImageStore, StoreError};

use crate::handlers::AppState;

const SAMPLE_SIZE: usize = 5;

/// Which store variables are present in the environment. Values are never exposed.
#[derive(Debug, Serialize, ToSchema)]
pub struct EnvironmentFlags {
    #[serde(rename = "REDIS_HOST_set")]
    pub redis_host_set: bool,
    #[serde(rename = "REDIS_PORT_set")]
    pub redis_port_set: bool,
    #[serde(rename = "REDIS_PASSWORD_set")]
    pub redis_password_set: bool,
}

impl EnvironmentFlags {
    fn from_env() -> Self {
        let is_set = |name: &str| std::env::var(name).is_ok_and(|v| !v.is_empty());
        Self {
            redis_host_set: is_set("REDIS_HOST"),
            redis_port_set: is_set("REDIS_PORT"),
            redis_password_set: is_set("REDIS_PASSWORD") || is_set("PASSWORD"),
        }
    }
}

/// Store diagnostics report
#[derive(Debug, Serialize, ToSchema)]
pub struct DebugResponse {
    /// "success" when the store answered a ping
    pub store_connection: String,
    /// Key of the image set
    pub set_key: String,
    /// Whether the set exists
    pub set_exists: bool,
    /// Number of members
    pub image_count: usize,
    /// Up to five random members
    pub sample_images: Vec<String>,
    pub environment_vars: EnvironmentFlags,
}

/// Diagnostics failure report
#[derive(Debug, Serialize, ToSchema)]
pub struct DebugErrorResponse {
    /// Always "error"
    pub status: String,
    /// Store error message
    pub error: String,
    pub environment_vars: EnvironmentFlags,
}

async fn diagnose(store: &dyn ImageStore) -> Result<DebugResponse, StoreError> {
    store.ping().await?;
    let set_exists = store.exists().await?;
    let image_count = if set_exists {
        store.cardinality().await?
    } else {
        0
    };
    let sample_images = if image_count > 0 {
        store.random_members(SAMPLE_SIZE).await?
    } else {
        Vec::new()
    };

    Ok(DebugResponse {
        store_connection: "success".to_string(),
        set_key: store.set_key().to_string(),
        set_exists,
        image_count,
        sample_images,
        environment_vars: EnvironmentFlags::from_env(),
    })
}

/// GET /api/debug - Store diagnostics
///
/// Pings the store and reports the set's existence, size and a few sample
/// members, plus which connection variables are configured.
#[utoipa::path(
    get,
    path = "/api/debug",
    tag = "Health",
    responses(
        (status = 200, description = "Store diagnostics", body = DebugResponse),
        (status = 500, description = "Store unreachable", body = DebugErrorResponse)
    )
)]
pub async fn debug_info(State(state): State<AppState>) -> Response {
    match diagnose(state.store.as_ref()).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Store diagnostics failed");
            let body = DebugErrorResponse {
                status: "error".to_string(),
                error: e.to_string(),
                environment_vars: EnvironmentFlags::from_env(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
