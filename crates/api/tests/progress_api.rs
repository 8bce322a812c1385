//! Integration tests for the progress API.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, config_cookie, get, get_with_cookie, send, TEST_EMAIL};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: progress requires a config cookie
// ---------------------------------------------------------------------------

#[tokio::test]
async fn progress_without_cookie_is_configuration_required() {
    let app = common::build_test_app();
    let response = get(app, "/api/v1/progress/test@example.com").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "CONFIGURATION_REQUIRED");
    assert_eq!(json["error"]["details"]["redirectToSetup"], true);
}

// ---------------------------------------------------------------------------
// Test: another user's progress is forbidden
// ---------------------------------------------------------------------------

#[tokio::test]
async fn progress_for_other_user_is_forbidden() {
    let app = common::build_test_app();
    let cookie = config_cookie("someone-else@example.com");

    let response = get_with_cookie(app, "/api/v1/progress/test@example.com", &cookie).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "ACCESS_DENIED");
}

// ---------------------------------------------------------------------------
// Test: the owner gets a full report with caching headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn progress_for_owner_returns_report() {
    let app = common::build_test_app();
    let cookie = config_cookie(TEST_EMAIL);

    let response = get_with_cookie(app, "/api/v1/progress/test@example.com", &cookie).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["cache-control"], "private, max-age=300");
    assert!(response.headers().contains_key("etag"));
    assert_eq!(response.headers()["ratelimit-limit"], "100");

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["userId"], TEST_EMAIL);

    let stats = &json["data"]["overallStats"];
    assert_eq!(stats["totalProblems"], 1200);
    assert!(stats["totalSolved"].as_u64().unwrap() <= 1200);
    assert!(!json["data"]["topicProgress"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn progress_is_stable_between_requests() {
    let app = common::build_test_app();
    let cookie = config_cookie(TEST_EMAIL);

    let first = get_with_cookie(app.clone(), "/api/v1/progress/test@example.com", &cookie).await;
    let first = body_json(first).await;
    let second = get_with_cookie(app, "/api/v1/progress/test@example.com", &cookie).await;
    let second = body_json(second).await;

    assert_eq!(
        first["data"]["overallStats"]["totalSolved"],
        second["data"]["overallStats"]["totalSolved"]
    );
}

#[tokio::test]
async fn malformed_user_id_is_rejected() {
    let app = common::build_test_app();
    let cookie = config_cookie(TEST_EMAIL);

    let response = get_with_cookie(app, "/api/v1/progress/not-an-email", &cookie).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Test: recording a submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn record_submission_returns_created() {
    let app = common::build_test_app();
    let cookie = config_cookie(TEST_EMAIL);

    let response = send(
        app,
        Method::POST,
        "/api/v1/progress/test@example.com/submissions",
        Some(&cookie),
        Some(json!({
            "problemId": 1,
            "status": "Accepted",
            "runtime": 42,
            "memory": 14.2,
            "language": "Rust",
            "submissionTime": "2026-01-15T10:00:00Z"
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["data"]["submissionId"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn record_submission_for_unknown_problem_is_404() {
    let app = common::build_test_app();
    let cookie = config_cookie(TEST_EMAIL);

    let response = send(
        app,
        Method::POST,
        "/api/v1/progress/test@example.com/submissions",
        Some(&cookie),
        Some(json!({
            "problemId": 999999,
            "status": "Wrong Answer",
            "runtime": 42,
            "memory": 14.2,
            "language": "Rust",
            "submissionTime": "2026-01-15T10:00:00Z"
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: catalog lookups are public and cacheable
// ---------------------------------------------------------------------------

#[tokio::test]
async fn problems_by_topic_filters_difficulty() {
    let app = common::build_test_app();
    let response = get(app, "/api/v1/progress/problems/topic/Array?difficulty=Easy").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["cache-control"], "public, max-age=3600");
    assert_eq!(response.headers()["etag"], "\"topic-Array-Easy\"");

    let json = body_json(response).await;
    let problems = json["data"].as_array().unwrap();
    assert!(!problems.is_empty());
    for problem in problems {
        assert_eq!(problem["difficulty"], "Easy");
        assert!(problem["topics"]
            .as_array()
            .unwrap()
            .iter()
            .any(|t| t == "Array"));
    }
}

#[tokio::test]
async fn problems_by_company_rejects_bad_difficulty() {
    let app = common::build_test_app();
    let response = get(app, "/api/v1/progress/problems/company/Google?difficulty=easy").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_applies_filters() {
    let app = common::build_test_app();
    let response = get(
        app,
        "/api/v1/progress/problems/search?q=array&difficulty=Easy,Medium&minAcceptanceRate=0.2",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["cache-control"], "public, max-age=1800");

    let json = body_json(response).await;
    let hits = json["data"].as_array().unwrap();
    assert!(hits.len() <= 50);
    for hit in hits {
        assert_ne!(hit["difficulty"], "Hard");
        assert!(hit["acRate"].as_f64().unwrap() >= 0.2);
    }
}

#[tokio::test]
async fn search_rejects_out_of_range_rate() {
    let app = common::build_test_app();
    let response = get(app, "/api/v1/progress/problems/search?q=tree&maxAcceptanceRate=1.5").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Test: recommendations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn recommendations_respect_count() {
    let app = common::build_test_app();
    let cookie = config_cookie(TEST_EMAIL);

    let response = get_with_cookie(
        app,
        "/api/v1/progress/test@example.com/recommendations?count=3",
        &cookie,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["etag"], "\"rec-test@example.com-3\"");
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn recommendations_reject_count_over_limit() {
    let app = common::build_test_app();
    let cookie = config_cookie(TEST_EMAIL);

    let response = get_with_cookie(
        app,
        "/api/v1/progress/test@example.com/recommendations?count=51",
        &cookie,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: metrics require configuration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn metrics_require_configuration() {
    let app = common::build_test_app();
    let cookie = config_cookie(TEST_EMAIL);

    let response = get(app.clone(), "/api/v1/progress/metrics").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_with_cookie(app, "/api/v1/progress/metrics", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "operational");
    assert_eq!(json["data"]["catalogSize"], 1200);
}
