//! Adapters against a local HTTP server standing in for the vendor APIs.

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::{Json, Router};
use prep_providers::anthropic::AnthropicProvider;
use prep_providers::google::GoogleProvider;
use prep_providers::openai::OpenAiProvider;
use prep_providers::{AiProvider, ChatMessage, ProviderError};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Serve `body` with `status` on every path; returns the base URL.
async fn spawn_upstream(status: StatusCode, body: Value) -> String {
    let app = Router::new().fallback(move || {
        let body = body.clone();
        async move { (status, Json(body)) }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn openai(base_url: String) -> Box<dyn AiProvider> {
    Box::new(
        OpenAiProvider::with_client(reqwest::Client::new(), "sk-test".into(), "gpt-4".into())
            .with_base_url(base_url),
    )
}

fn anthropic(base_url: String) -> Box<dyn AiProvider> {
    Box::new(
        AnthropicProvider::with_client(
            reqwest::Client::new(),
            "sk-ant-test".into(),
            "claude-3-haiku-20240307".into(),
        )
        .with_base_url(base_url),
    )
}

fn google(base_url: String) -> Box<dyn AiProvider> {
    Box::new(
        GoogleProvider::with_client(reqwest::Client::new(), "AIza-test".into(), "gemini-pro".into())
            .with_base_url(base_url),
    )
}

type Build = fn(String) -> Box<dyn AiProvider>;

const ADAPTERS: [(&str, Build); 3] = [
    ("OpenAI", openai),
    ("Anthropic", anthropic),
    ("Google", google),
];

async fn chat(provider: &dyn AiProvider) -> Result<String, ProviderError> {
    provider
        .chat(&[ChatMessage::user("hello")])
        .await
        .map(|r| r.content)
}

#[tokio::test]
async fn unauthorized_upstream_is_api_error() {
    for (name, build) in ADAPTERS {
        let base = spawn_upstream(
            StatusCode::UNAUTHORIZED,
            json!({ "error": { "message": "invalid api key" } }),
        )
        .await;

        let err = chat(build(base).as_ref()).await.unwrap_err();
        assert_matches!(
            err,
            ProviderError::Api { provider, status: 401, ref status_text }
                if provider == name && status_text == "Unauthorized",
            "{name}"
        );
    }
}

#[tokio::test]
async fn server_error_upstream_is_api_error() {
    for (name, build) in ADAPTERS {
        let base = spawn_upstream(StatusCode::INTERNAL_SERVER_ERROR, json!({})).await;

        let err = chat(build(base).as_ref()).await.unwrap_err();
        assert_matches!(
            err,
            ProviderError::Api { provider, status: 500, .. } if provider == name,
            "{name}"
        );
    }
}

#[tokio::test]
async fn rejected_key_fails_validation() {
    for (name, build) in ADAPTERS {
        let base = spawn_upstream(StatusCode::UNAUTHORIZED, json!({})).await;
        assert!(!build(base).validate_api_key().await, "{name}");
    }
}

#[tokio::test]
async fn empty_replies_are_empty_response() {
    let cases: [(Build, Value); 3] = [
        (openai, json!({ "choices": [] })),
        (anthropic, json!({ "content": [] })),
        (google, json!({ "candidates": [] })),
    ];

    for (build, body) in cases {
        let base = spawn_upstream(StatusCode::OK, body).await;
        let provider = build(base);
        let err = chat(provider.as_ref()).await.unwrap_err();
        assert_matches!(err, ProviderError::EmptyResponse(_), "{:?}", provider.kind());
    }
}

#[tokio::test]
async fn successful_replies_are_reshaped() {
    let cases: [(Build, Value); 3] = [
        (
            openai,
            json!({ "choices": [{ "message": { "content": "hi from openai" } }] }),
        ),
        (
            anthropic,
            json!({ "content": [{ "type": "text", "text": "hi from anthropic" }] }),
        ),
        (
            google,
            json!({ "candidates": [{ "content": { "parts": [{ "text": "hi from google" }] } }] }),
        ),
    ];

    for (build, body) in cases {
        let base = spawn_upstream(StatusCode::OK, body).await;
        let provider = build(base);
        let content = chat(provider.as_ref()).await.unwrap();
        assert!(content.starts_with("hi from"), "{content}");
        assert!(provider.validate_api_key().await);
    }
}
