//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get};
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Test: GET /health returns 200 with expected JSON fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let app = common::build_test_app();
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert!(json["uptimeSecs"].is_u64());
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::build_test_app();
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = common::build_test_app();
    let response = get(app, "/health").await;

    let id_str = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header")
        .to_str()
        .unwrap();
    assert_eq!(id_str.len(), 36, "x-request-id should be a UUID string");
}

// ---------------------------------------------------------------------------
// Test: envelope meta.requestId matches the x-request-id header
// ---------------------------------------------------------------------------

#[tokio::test]
async fn envelope_request_id_matches_header() {
    let app = common::build_test_app();
    let response = get(app, "/api/v1/progress/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let header = response.headers()["x-request-id"].to_str().unwrap().to_string();

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["meta"]["requestId"], header.as_str());
    assert_eq!(json["meta"]["version"], "v1");
    assert_eq!(json["data"]["service"], "progress-api");
}

// ---------------------------------------------------------------------------
// Test: a client-supplied x-request-id is echoed back
// ---------------------------------------------------------------------------

#[tokio::test]
async fn client_request_id_is_propagated() {
    let app = common::build_test_app();
    let request = Request::builder()
        .uri("/api/v1/roadmap/health")
        .header("x-request-id", "trace-me-123")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "trace-me-123");
    let json = body_json(response).await;
    assert_eq!(json["meta"]["requestId"], "trace-me-123");
    assert_eq!(json["data"]["cachedRoadmaps"], 0);
}

// ---------------------------------------------------------------------------
// Test: CORS preflight OPTIONS request returns correct headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_returns_correct_headers() {
    let app = common::build_test_app();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/config")
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "PATCH")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers["access-control-allow-origin"],
        "http://localhost:3000"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");
    let methods = headers["access-control-allow-methods"].to_str().unwrap();
    assert!(methods.contains("PATCH"), "PATCH must be allowed: {methods}");
    let allowed = headers["access-control-allow-headers"].to_str().unwrap();
    assert!(allowed.contains("content-type"), "{allowed}");
    assert!(!allowed.contains("cookie"), "cookie is browser-managed: {allowed}");
}
