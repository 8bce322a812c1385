//! Integration tests for the configuration cookie endpoints.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{body_json, cookie_for_config, cookie_from_set_cookie, get, get_with_cookie, send};
use serde_json::json;

fn wizard_body() -> serde_json::Value {
    json!({
        "email": "test@example.com",
        "password": "hunter22",
        "provider": "anthropic",
        "model": "claude-3-5-sonnet-20241022",
        "apiKey": "sk-ant-REDACTED"
    })
}

// ---------------------------------------------------------------------------
// Test: POST /api/config sets an HttpOnly cookie that later requests accept
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_then_read_config() {
    let app = common::build_test_app();

    let response = send(
        app.clone(),
        Method::POST,
        "/api/config",
        None,
        Some(wizard_body()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let set_cookie = response.headers()["set-cookie"].to_str().unwrap().to_string();
    assert!(set_cookie.starts_with("ai-interview-config="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
    assert!(set_cookie.contains("Max-Age=2592000"));
    assert!(!set_cookie.contains("Secure"), "not secure outside production");

    let cookie = cookie_from_set_cookie(&response);
    let created = body_json(response).await;
    assert_eq!(created["data"]["email"], "test@example.com");
    assert_eq!(created["data"]["provider"], "anthropic");
    assert!(created["data"].get("apiKey").is_none(), "summary must not carry the key");

    let response = get_with_cookie(app, "/api/config", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["model"], "claude-3-5-sonnet-20241022");
}

// ---------------------------------------------------------------------------
// Test: invalid wizard input is rejected
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_config_rejects_bad_email() {
    let app = common::build_test_app();
    let mut body = wizard_body();
    body["email"] = json!("not-an-email");

    let response = send(app, Method::POST, "/api/config", None, Some(body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn create_config_rejects_unknown_provider() {
    let app = common::build_test_app();
    let mut body = wizard_body();
    body["provider"] = json!("mistral");

    let response = send(app, Method::POST, "/api/config", None, Some(body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Test: reading config without a cookie is 401 with a setup redirect hint
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_config_without_cookie_requires_setup() {
    let app = common::build_test_app();
    let response = get(app, "/api/config").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "CONFIGURATION_REQUIRED");
    assert_eq!(json["error"]["details"]["redirectToSetup"], true);
}

// ---------------------------------------------------------------------------
// Test: tampered and expired cookies are treated as missing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tampered_cookie_requires_setup() {
    let app = common::build_test_app();
    let response = get_with_cookie(app, "/api/config", "ai-interview-config=garbage").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_cookie_requires_setup() {
    let app = common::build_test_app();
    let mut config = common::user_config("test@example.com");
    config.created_at = (Utc::now() - Duration::days(31)).to_rfc3339();

    let response = get_with_cookie(app, "/api/config", &cookie_for_config(&config)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: PATCH merges fields and reissues the cookie
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_config_merges_and_reissues_cookie() {
    let app = common::build_test_app();
    let cookie = common::config_cookie("test@example.com");

    let response = send(
        app.clone(),
        Method::PATCH,
        "/api/config",
        Some(&cookie),
        Some(json!({ "model": "gpt-4o-mini" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let reissued = cookie_from_set_cookie(&response);
    let json = body_json(response).await;
    assert_eq!(json["data"]["model"], "gpt-4o-mini");
    assert_eq!(json["data"]["provider"], "openai");

    let response = get_with_cookie(app, "/api/config", &reissued).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["model"], "gpt-4o-mini");
}

// ---------------------------------------------------------------------------
// Test: DELETE expires the cookie
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_config_expires_cookie() {
    let app = common::build_test_app();
    let response = send(app, Method::DELETE, "/api/config", None, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response.headers()["set-cookie"].to_str().unwrap();
    assert!(set_cookie.contains("Max-Age=0"));
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
}

// ---------------------------------------------------------------------------
// Test: export redacts the API key
// ---------------------------------------------------------------------------

#[tokio::test]
async fn export_redacts_api_key() {
    let app = common::build_test_app();
    let cookie = common::config_cookie("test@example.com");

    let response = get_with_cookie(app, "/api/config/export", &cookie).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["apiKey"], "***REDACTED***");
    assert_eq!(json["data"]["provider"], "openai");
}
