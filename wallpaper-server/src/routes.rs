//! Router configuration module
//!
//! Configures all routes, middleware layers, and creates the application router.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::Config;
use crate::error::ApiError;
use crate::handlers::{
    debug_info, health, image_at_position, index, latest_image, list_images, ready, AppState,
};
use crate::openapi::ApiDoc;

/// Create the application router with default config (for testing)
pub fn create_router(state: AppState) -> Router {
    create_router_with_config(state, &Config::default())
}

/// Create the application router with custom configuration
///
/// CORS wraps every other layer, so rate limit and timeout rejections carry
/// the cross-origin header as well.
pub fn create_router_with_config(state: AppState, config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/", get(index))
        .route("/index.html", get(index))
        .route("/api/images", get(list_images))
        .route("/api/images/", get(list_images))
        .route("/api/images/latest", get(latest_image))
        .route("/api/images/position/", get(image_at_position))
        .route("/api/images/position/{*position}", get(image_at_position))
        .route("/api/debug", get(debug_info))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/api-docs/openapi.json", get(openapi_json))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn_with_state(
            Duration::from_secs(config.timeout_secs),
            request_timeout,
        ));

    // Disabled in tests, enabled in production
    if config.rate_limit_enabled {
        let governor_conf = GovernorConfigBuilder::default()
            .period(config.rate_limit_period())
            .burst_size(config.rate_limit_burst.max(1))
            .finish()
            .expect("Failed to build rate limiter config");

        tracing::info!(
            "Rate limiting: {} req/s (burst: {})",
            config.rate_limit_per_sec,
            config.rate_limit_burst
        );

        router = router.layer(
            GovernorLayer::new(Arc::new(governor_conf))
                .error_handler(|err| ApiError::from_governor(err).into_response()),
        );
    } else {
        tracing::warn!("Rate limiting: DISABLED");
    }

    router.layer(TraceLayer::new_for_http()).layer(cors)
}

async fn request_timeout(State(limit): State<Duration>, request: Request, next: Next) -> Response {
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => ApiError::RequestTimeout(limit).into_response(),
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn not_found() -> ApiError {
    ApiError::not_found("Endpoint not found")
}
