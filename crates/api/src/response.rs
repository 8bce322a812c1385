//! Shared response envelope for the progress, roadmap and config APIs.
//!
//! Every envelope carries a `meta` block. Its `requestId` is the
//! `x-request-id` of the request being served, made available to handlers and
//! error rendering through a task-local set by the request-context middleware.

use std::time::Duration;

use chrono::Utc;
use prep_core::types::Timestamp;
use serde::Serialize;

/// API version reported in every `meta` block.
pub const API_VERSION: &str = "v1";

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Run `fut` with `request_id` visible to [`current_request_id`].
pub async fn with_request_id<F: std::future::Future>(request_id: String, fut: F) -> F::Output {
    REQUEST_ID.scope(request_id, fut).await
}

/// The id of the request being served, or a fresh UUID when called outside
/// a request scope.
pub fn current_request_id() -> String {
    REQUEST_ID
        .try_with(Clone::clone)
        .unwrap_or_else(|_| uuid::Uuid::new_v4().to_string())
}

/// `{ success, data?, error?, meta }` response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    pub meta: Meta,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::ok_with(data, Meta::new())
    }

    pub fn ok_with(data: T, meta: Meta) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta,
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload.
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            meta: Meta::new(),
        }
    }

    pub fn failure(error: ErrorBody) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            meta: Meta::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub timestamp: Timestamp,
    pub request_id: String,
    pub version: &'static str,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_expiry: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_time_ms: Option<u64>,
}

impl Meta {
    pub fn new() -> Self {
        Self {
            timestamp: Utc::now(),
            request_id: current_request_id(),
            version: API_VERSION,
            cached: false,
            cache_expiry: None,
            ai_provider: None,
            generation_time_ms: None,
        }
    }

    pub fn cached(mut self, cached: bool, expiry: Timestamp) -> Self {
        self.cached = cached;
        self.cache_expiry = Some(expiry);
        self
    }

    pub fn ai_provider(mut self, provider: impl Into<String>) -> Self {
        self.ai_provider = Some(provider.into());
        self
    }

    pub fn generation_time(mut self, elapsed: Duration) -> Self {
        self.generation_time_ms = Some(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
        self
    }
}

impl Default for Meta {
    fn default() -> Self {
        Self::new()
    }
}
