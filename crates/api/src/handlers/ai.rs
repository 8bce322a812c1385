//! Handlers for the AI proxy (`/api/ai`).
//!
//! These endpoints keep the flat `{ success, ... }` shape the setup wizard
//! and chat UI already consume rather than the `meta` envelope.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use prep_core::provider_catalog::{ProviderInfo, PROVIDERS};
use prep_core::user_config::ConfigSummary;
use prep_providers::{ChatMessage, EnvProviderStatus, ProviderError, Usage};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::config_cookie::{ConfigStatus, RequireConfig};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, message = "Messages array is required"))]
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub success: bool,
    pub response: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

#[derive(Debug, Serialize)]
pub struct KeyValidationReply {
    pub success: bool,
    pub valid: bool,
    pub provider: &'static str,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct CookieStatusReply {
    pub success: bool,
    pub configured: bool,
    pub source: &'static str,
    #[serde(flatten)]
    pub summary: ConfigSummary,
}

#[derive(Debug, Serialize)]
pub struct EnvironmentStatusReply {
    pub success: bool,
    #[serde(flatten)]
    pub status: EnvProviderStatus,
    pub source: &'static str,
    pub environment: String,
}

#[derive(Debug, Serialize)]
pub struct CookieValidationReply {
    pub success: bool,
    pub valid: bool,
    pub configured: bool,
    #[serde(flatten)]
    pub summary: ConfigSummary,
}

#[derive(Debug, Serialize)]
pub struct ProvidersReply {
    pub success: bool,
    pub providers: &'static [ProviderInfo],
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// POST /api/ai/chat
///
/// Forward the conversation to the provider configured in the cookie.
pub async fn chat(
    RequireConfig(config): RequireConfig,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<ChatRequest>,
) -> AppResult<Json<ChatReply>> {
    let provider = state.providers.for_user(&config)?;

    tracing::info!(
        email = %config.email,
        provider = %provider.kind(),
        messages = input.messages.len(),
        "Proxying chat request",
    );

    let reply = provider.chat(&input.messages).await?;

    Ok(Json(ChatReply {
        success: true,
        response: reply.content,
        model: reply.model,
        usage: reply.usage,
    }))
}

// ---------------------------------------------------------------------------
// Validation and status
// ---------------------------------------------------------------------------

/// GET /api/ai/validate
///
/// Check the API key of the environment-configured provider.
pub async fn validate_environment_key(
    State(state): State<AppState>,
) -> AppResult<Json<KeyValidationReply>> {
    let provider = state.providers.for_environment().map_err(|e| match e {
        ProviderError::Configuration(msg) => AppError::ServerConfiguration(msg),
        other => AppError::Provider(other),
    })?;

    let valid = provider.validate_api_key().await;
    tracing::info!(provider = %provider.kind(), valid, "Validated environment API key");

    Ok(Json(KeyValidationReply {
        success: true,
        valid,
        provider: provider.kind().as_str(),
        model: provider.model().to_string(),
    }))
}

/// GET /api/ai/status
///
/// Report the cookie configuration when present, otherwise the environment.
pub async fn status(State(state): State<AppState>, config: ConfigStatus) -> Response {
    match config.valid() {
        Some(config) => Json(CookieStatusReply {
            success: true,
            configured: true,
            source: "cookie",
            summary: config.summary(),
        })
        .into_response(),
        None => Json(EnvironmentStatusReply {
            success: true,
            status: state.providers.environment_status(),
            source: "environment",
            environment: state.config.environment.clone(),
        })
        .into_response(),
    }
}

/// GET /api/ai/validate-cookie
///
/// 401 without a valid cookie; otherwise confirm a provider can be built
/// from it.
pub async fn validate_cookie(
    State(state): State<AppState>,
    config: ConfigStatus,
) -> AppResult<Response> {
    let Some(config) = config.valid() else {
        let body = serde_json::json!({
            "success": false,
            "error": "No valid configuration found",
            "configured": false,
        });
        return Ok((StatusCode::UNAUTHORIZED, Json(body)).into_response());
    };

    state.providers.for_user(config)?;

    Ok(Json(CookieValidationReply {
        success: true,
        valid: true,
        configured: true,
        summary: config.summary(),
    })
    .into_response())
}

/// GET /api/ai/providers
pub async fn list_providers() -> Json<ProvidersReply> {
    Json(ProvidersReply {
        success: true,
        providers: PROVIDERS,
    })
}
