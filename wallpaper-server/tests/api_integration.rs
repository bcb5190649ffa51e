//! API integration tests for wallpaper-server.
//!
//! These drive the full router over an in-memory image store.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wallpaper_core::{ImageStore, MemoryImageStore, StoreError};
use wallpaper_server::{create_router, create_router_with_config, AppState, Config};

fn app_with(store: MemoryImageStore) -> Router {
    create_router(AppState::new(Arc::new(store)))
}

fn scenario_app() -> Router {
    app_with(MemoryImageStore::from_records(["/a.jpg", "/c.jpg", "/b.jpg"]))
}

async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = get(app, uri).await;
    let status = response.status();
    (status, body_json(response).await)
}

// ============================================================================
// Health & Readiness Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint_returns_healthy() {
    let (status, json) = get_json(scenario_app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["store_available"], true);
    assert_eq!(json["service"], "wallpaper-server");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_health_endpoint_degraded_when_store_down() {
    let (status, json) = get_json(app_with(MemoryImageStore::unavailable()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["store_available"], false);
}

#[tokio::test]
async fn test_ready_endpoint_returns_ok() {
    let (status, json) = get_json(scenario_app(), "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
}

// ============================================================================
// List Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_list_alphabetical_scenario() {
    let (status, json) = get_json(scenario_app(), "/api/images?sort=alphabetical").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({
            "status": "success",
            "count": 3,
            "sort": "alphabetical",
            "images": ["/a.jpg", "/b.jpg", "/c.jpg"]
        })
    );
}

#[tokio::test]
async fn test_list_defaults_to_alphabetical() {
    let (_, json) = get_json(scenario_app(), "/api/images/").await;
    assert_eq!(json["sort"], "alphabetical");
    assert_eq!(json["images"], json!(["/a.jpg", "/b.jpg", "/c.jpg"]));
}

#[tokio::test]
async fn test_reverse_is_exact_reversal_of_alphabetical() {
    let records: Vec<String> = (0..20).map(|i| format!("/img/{:02}_{}.jpg", (i * 7) % 20, i)).collect();
    let store = MemoryImageStore::from_records(records);
    let app = app_with(store);

    let (_, asc) = get_json(app.clone(), "/api/images?sort=alphabetical").await;
    let (_, desc) = get_json(app, "/api/images?sort=reverse").await;

    let mut asc: Vec<String> = serde_json::from_value(asc["images"].clone()).unwrap();
    let desc: Vec<String> = serde_json::from_value(desc["images"].clone()).unwrap();

    let mut sorted = asc.clone();
    sorted.sort();
    assert_eq!(asc, sorted);

    asc.reverse();
    assert_eq!(asc, desc);
}

#[tokio::test]
async fn test_random_is_a_permutation() {
    let (_, json) = get_json(scenario_app(), "/api/images?sort=random").await;
    assert_eq!(json["sort"], "random");

    let mut images: Vec<String> = serde_json::from_value(json["images"].clone()).unwrap();
    images.sort();
    assert_eq!(images, vec!["/a.jpg", "/b.jpg", "/c.jpg"]);
}

#[tokio::test]
async fn test_unknown_sort_falls_back_to_store_order() {
    let (status, json) = get_json(scenario_app(), "/api/images?sort=bogus").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sort"], "none");
    assert_eq!(json["count"], 3);
}

#[tokio::test]
async fn test_empty_set_lists_nothing() {
    let (status, json) = get_json(app_with(MemoryImageStore::missing()), "/api/images").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 0);
    assert_eq!(json["images"], json!([]));
}

#[tokio::test]
async fn test_list_image_format_redirects_to_member() {
    let response = get(scenario_app(), "/api/images?format=image").await;

    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert!(
        ["https://bing.com/a.jpg", "https://bing.com/b.jpg", "https://bing.com/c.jpg"]
            .contains(&location)
    );
}

#[tokio::test]
async fn test_list_image_format_on_empty_set_is_404_json() {
    let (status, json) = get_json(app_with(MemoryImageStore::missing()), "/api/images?format=image").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], "error");
}

// ============================================================================
// Latest Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_latest_is_lexicographic_maximum() {
    let (status, json) = get_json(scenario_app(), "/api/images/latest").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(json["image"], "/c.jpg");
    assert_eq!(json["full_url"], "https://bing.com/c.jpg");
    assert_eq!(json["position"], 2);
    assert_eq!(json["total"], 3);
    assert_eq!(json["sort"], "alphabetical");
}

#[tokio::test]
async fn test_latest_with_reverse_is_minimum() {
    let (_, json) = get_json(scenario_app(), "/api/images/latest?sort=reverse").await;
    assert_eq!(json["image"], "/a.jpg");
}

#[tokio::test]
async fn test_latest_on_empty_set_is_404() {
    let (status, json) = get_json(app_with(MemoryImageStore::missing()), "/api/images/latest").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], "error");
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_latest_image_format_redirect_headers() {
    let response = get(scenario_app(), "/api/images/latest?format=image").await;

    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    let headers = response.headers();
    assert_eq!(headers[header::LOCATION], "https://bing.com/c.jpg");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let cache = headers[header::CACHE_CONTROL].to_str().unwrap();
    assert!(cache.contains("max-age"));
    assert!(cache.contains("stale-while-revalidate"));
}

#[tokio::test]
async fn test_absolute_record_redirects_verbatim() {
    let app = app_with(MemoryImageStore::from_records(["https://cdn.example.com/x.jpg"]));
    let response = get(app, "/api/images/latest?format=image").await;
    assert_eq!(response.headers()[header::LOCATION], "https://cdn.example.com/x.jpg");
}

// ============================================================================
// Position Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_position_negative_one_scenario() {
    let (status, json) = get_json(scenario_app(), "/api/images/position/-1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["image"], "/c.jpg");
    assert_eq!(json["position"], 2);
    assert_eq!(json["total"], 3);
    assert_eq!(json["sort"], "alphabetical");
}

#[tokio::test]
async fn test_negative_positions_wrap_around() {
    let app = scenario_app();
    for n in -3i64..=-1 {
        let (_, negative) = get_json(app.clone(), &format!("/api/images/position/{n}")).await;
        let (_, positive) = get_json(app.clone(), &format!("/api/images/position/{}", n + 3)).await;
        assert_eq!(negative["image"], positive["image"]);
        assert_eq!(negative["position"], positive["position"]);
    }
}

#[tokio::test]
async fn test_position_out_of_range_scenario() {
    let (status, json) = get_json(scenario_app(), "/api/images/position/5").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "error");
    assert!(json["message"].as_str().unwrap().contains("0-2"));
    assert_eq!(json["available_positions"], 3);
}

#[tokio::test]
async fn test_position_bounds_are_rejected() {
    let app = scenario_app();
    for uri in ["/api/images/position/3", "/api/images/position/-4"] {
        let (status, json) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        let message = json["message"].as_str().unwrap();
        assert!(message.contains("0-2"), "{message}");
        assert!(message.contains("-1 to -3"), "{message}");
    }
}

#[tokio::test]
async fn test_position_not_an_integer() {
    let app = scenario_app();
    let (status, invalid) = get_json(app.clone(), "/api/images/position/abc").await;
    let (_, range) = get_json(app, "/api/images/position/99").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid["status"], "error");
    assert_ne!(invalid["message"], range["message"]);
    assert_ne!(invalid["code"], range["code"]);
}

#[tokio::test]
async fn test_position_on_empty_set_is_404() {
    let (status, _) = get_json(app_with(MemoryImageStore::missing()), "/api/images/position/0").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_position_image_format_error_stays_json() {
    let (status, json) = get_json(scenario_app(), "/api/images/position/10?format=image").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "error");
}

#[tokio::test]
async fn test_unknown_format_falls_back_to_json() {
    let (status, json) = get_json(scenario_app(), "/api/images/position/0?format=xml").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["image"], "/a.jpg");
}

// ============================================================================
// Errors, Routing & Diagnostics
// ============================================================================

#[tokio::test]
async fn test_store_failure_is_500_json() {
    let (status, json) = get_json(app_with(MemoryImageStore::unavailable()), "/api/images").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["status"], "error");
    assert_eq!(json["code"], "STORE_UNAVAILABLE");
}

#[tokio::test]
async fn test_unknown_path_is_404_json() {
    let (status, json) = get_json(scenario_app(), "/api/nothing-here").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], "error");
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_index_page() {
    for uri in ["/", "/index.html"] {
        let response = get(scenario_app(), uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
    }
}

#[tokio::test]
async fn test_index_image_format_redirects() {
    let app = app_with(MemoryImageStore::from_records(["/only.jpg"]));
    let response = get(app, "/?format=image").await;

    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "https://bing.com/only.jpg");
}

#[tokio::test]
async fn test_debug_reports_store_state() {
    let (status, json) = get_json(scenario_app(), "/api/debug").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["store_connection"], "success");
    assert_eq!(json["set_key"], "bing_images");
    assert_eq!(json["set_exists"], true);
    assert_eq!(json["image_count"], 3);
    assert_eq!(json["sample_images"].as_array().unwrap().len(), 3);
    assert!(json["environment_vars"]["REDIS_HOST_set"].is_boolean());
}

#[tokio::test]
async fn test_debug_store_failure() {
    let (status, json) = get_json(app_with(MemoryImageStore::unavailable()), "/api/debug").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].is_string());
    assert!(json["environment_vars"].is_object());
}

#[tokio::test]
async fn test_openapi_document() {
    let (status, json) = get_json(scenario_app(), "/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/images/position/{position}"].is_object());
    assert!(json["paths"]["/health"].is_object());
}

#[tokio::test]
async fn test_position_trailing_slash_is_invalid() {
    for uri in ["/api/images/position/1/", "/api/images/position/"] {
        let (status, json) = get_json(scenario_app(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json["code"], "INVALID_POSITION");
    }
}

// ============================================================================
// Cross-Origin, Rate Limit and Timeout Tests
// ============================================================================

#[tokio::test]
async fn test_json_responses_allow_any_origin() {
    for uri in ["/api/images", "/api/images/latest", "/health", "/api/nothing-here"] {
        let response = get(scenario_app(), uri).await;
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*",
            "{uri}"
        );
    }

    let response = get(app_with(MemoryImageStore::unavailable()), "/api/images").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

fn from_client(uri: &str) -> Request<Body> {
    let mut request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 7], 40000))));
    request
}

#[tokio::test]
async fn test_rate_limited_response_is_json_with_cors() {
    let config = Config {
        rate_limit_enabled: true,
        rate_limit_per_sec: 1,
        rate_limit_burst: 1,
        ..Config::default()
    };
    let store = MemoryImageStore::from_records(["/a.jpg"]);
    let app = create_router_with_config(AppState::new(Arc::new(store)), &config);

    let first = app.clone().oneshot(from_client("/api/images")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.oneshot(from_client("/api/images")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(second.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(second.headers().contains_key(header::RETRY_AFTER));

    let json = body_json(second).await;
    assert_eq!(json["status"], "error");
    assert_eq!(json["code"], "RATE_LIMITED");
}

/// Store whose reads never finish in time.
struct StalledStore;

#[async_trait]
impl ImageStore for StalledStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn exists(&self) -> Result<bool, StoreError> {
        Ok(true)
    }

    async fn cardinality(&self) -> Result<usize, StoreError> {
        Ok(1)
    }

    async fn members(&self) -> Result<Vec<String>, StoreError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(vec!["/late.jpg".to_string()])
    }

    async fn random_members(&self, _count: usize) -> Result<Vec<String>, StoreError> {
        Ok(Vec::new())
    }

    fn set_key(&self) -> &str {
        "bing_images"
    }
}

#[tokio::test]
async fn test_request_timeout_is_json_with_cors() {
    let config = Config {
        timeout_secs: 1,
        ..Config::default()
    };
    let app = create_router_with_config(AppState::new(Arc::new(StalledStore)), &config);

    let response = get(app, "/api/images").await;
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let json = body_json(response).await;
    assert_eq!(json["status"], "error");
    assert_eq!(json["code"], "REQUEST_TIMEOUT");
}
