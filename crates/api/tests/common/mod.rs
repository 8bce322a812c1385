#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use prep_api::config::ServerConfig;
use prep_api::engine::roadmap::RoadmapService;
use prep_api::router::build_app_router;
use prep_api::state::AppState;
use prep_core::cookie_cipher::CookieCipher;
use prep_core::progress::{InMemorySubmissionStore, ProgressService};
use prep_core::provider_catalog::ProviderKind;
use prep_core::roadmap::InMemoryRoadmapCache;
use prep_core::user_config::{NewUserConfig, UserConfig, CONFIG_COOKIE_NAME};
use prep_providers::{
    AiProvider, ChatMessage, ChatOptions, ChatResponse, EnvProviderStatus, ProviderError,
    ProviderFactory, ProviderSettings, Usage,
};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-cookie-secret";
pub const TEST_EMAIL: &str = "test@example.com";

/// A roadmap reply in the shape the parser expects.
pub const ROADMAP_JSON: &str = r#"{
  "nextFocusArea": {"topic": "Graph", "reason": "Lowest coverage", "priority": "high"},
  "recommendedProblems": [
    {"problemId": 7, "title": "Clone Graph", "difficulty": "Medium", "topic": "Graph", "order": 1},
    {"problemId": 12, "title": "Course Schedule", "difficulty": "Medium", "topic": "Graph", "order": 2}
  ],
  "studyPlan": {"weeklyGoals": ["Finish graph basics"], "dailyTimeRecommendation": 60},
  "weakestTopics": [],
  "overallRecommendation": {"skillLevel": "intermediate", "readinessScore": 55}
}"#;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        provider_timeout_secs: 5,
        cookie_secret: TEST_SECRET.to_string(),
        roadmap_cache_ttl_mins: 120,
        environment: "test".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Stub providers
// ---------------------------------------------------------------------------

/// Canned adapter: JSON-mode calls get [`ROADMAP_JSON`], others an echo.
pub struct StubProvider {
    kind: ProviderKind,
    model: String,
    calls: Arc<AtomicUsize>,
    fail_with: Option<u16>,
}

#[async_trait]
impl AiProvider for StubProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn chat_with(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.fail_with {
            return Err(ProviderError::Api {
                provider: "OpenAI",
                status,
                status_text: "Unauthorized".into(),
            });
        }
        let content = if options.json_mode {
            ROADMAP_JSON.to_string()
        } else {
            let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
            format!("echo: {last}")
        };
        Ok(ChatResponse {
            content,
            model: self.model.clone(),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
        })
    }

    async fn validate_api_key(&self) -> bool {
        self.fail_with.is_none()
    }
}

/// Factory handing out [`StubProvider`]s and counting their calls.
#[derive(Default)]
pub struct StubFactory {
    pub calls: Arc<AtomicUsize>,
    /// Settings reported as the server environment, if any.
    pub environment: Option<ProviderSettings>,
    /// Make every provider call fail with this upstream status.
    pub fail_with: Option<u16>,
}

impl StubFactory {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProviderFactory for StubFactory {
    fn build(&self, settings: ProviderSettings) -> Arc<dyn AiProvider> {
        Arc::new(StubProvider {
            kind: settings.kind,
            model: settings.model,
            calls: Arc::clone(&self.calls),
            fail_with: self.fail_with,
        })
    }

    fn for_environment(&self) -> Result<Arc<dyn AiProvider>, ProviderError> {
        match &self.environment {
            Some(settings) => Ok(self.build(settings.clone())),
            None => Err(ProviderError::Configuration(
                "AI_PROVIDER environment variable is required".into(),
            )),
        }
    }

    fn environment_status(&self) -> EnvProviderStatus {
        match &self.environment {
            Some(settings) => EnvProviderStatus {
                provider: Some(settings.kind.as_str().to_string()),
                model: Some(settings.model.clone()),
                configured: true,
            },
            None => EnvProviderStatus {
                provider: None,
                model: None,
                configured: false,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build the full application router with a default [`StubFactory`].
pub fn build_test_app() -> Router {
    build_test_app_with(Arc::new(StubFactory::default()))
}

/// Build the full application router with the given provider factory.
///
/// Goes through `build_app_router`, so tests exercise the production
/// middleware stack. A small fixed seed keeps the catalog deterministic.
pub fn build_test_app_with(providers: Arc<dyn ProviderFactory>) -> Router {
    let config = test_config();
    let progress = Arc::new(ProgressService::with_seed(
        Arc::new(InMemorySubmissionStore::new()),
        42,
    ));
    let roadmaps = Arc::new(RoadmapService::new(
        Arc::clone(&progress),
        Arc::new(InMemoryRoadmapCache::new()),
        chrono::Duration::minutes(config.roadmap_cache_ttl_mins),
    ));

    let state = AppState {
        config: Arc::new(config.clone()),
        cipher: Arc::new(CookieCipher::from_secret(TEST_SECRET)),
        progress,
        roadmaps,
        providers,
        started_at: Instant::now(),
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Cookies
// ---------------------------------------------------------------------------

pub fn user_config(email: &str) -> UserConfig {
    NewUserConfig {
        email: email.to_string(),
        password: "hunter22".to_string(),
        provider: ProviderKind::OpenAi,
        model: "gpt-4o".to_string(),
        api_key: "sk-test-0123456789abcdefghijklmnop".to_string(),
        api_url: None,
    }
    .into_config(Utc::now())
}

/// `Cookie` header value for a config sealed with the test secret.
pub fn cookie_for_config(config: &UserConfig) -> String {
    let sealed = CookieCipher::from_secret(TEST_SECRET)
        .seal_config(config)
        .unwrap();
    format!("{CONFIG_COOKIE_NAME}={sealed}")
}

pub fn config_cookie(email: &str) -> String {
    cookie_for_config(&user_config(email))
}

/// The `name=value` part of a `Set-Cookie` header, usable as a `Cookie`.
pub fn cookie_from_set_cookie<B>(response: &Response<B>) -> String {
    let header = response
        .headers()
        .get("set-cookie")
        .expect("response should set a cookie")
        .to_str()
        .unwrap();
    header.split(';').next().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(cookie), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
