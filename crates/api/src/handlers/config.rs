//! Handlers for the configuration cookie (`/api/config`).
//!
//! The setup wizard posts its result here and the server writes the sealed
//! cookie, so the browser never holds the cookie key.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use chrono::Utc;
use prep_core::error::CoreError;
use prep_core::user_config::{ConfigSummary, ConfigUpdate, NewUserConfig, UserConfig};
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::middleware::config_cookie::{config_cookie, expired_config_cookie, RequireConfig};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Summary plus the advisory key-format check.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    #[serde(flatten)]
    pub summary: ConfigSummary,
    pub api_key_format_valid: bool,
}

impl ConfigView {
    fn of(config: &UserConfig) -> Self {
        Self {
            summary: config.summary(),
            api_key_format_valid: config.api_key_format_valid(),
        }
    }
}

fn sealed_cookie(state: &AppState, config: &UserConfig) -> AppResult<String> {
    let sealed = state.cipher.seal_config(config)?;
    Ok(config_cookie(&sealed, state.config.is_production()))
}

/// POST /api/config
///
/// Store a completed setup as the encrypted config cookie.
pub async fn create_config(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<NewUserConfig>,
) -> AppResult<impl IntoResponse> {
    let config = input.into_config(Utc::now());
    let cookie = sealed_cookie(&state, &config)?;

    tracing::info!(email = %config.email, provider = %config.provider, "Configuration saved");

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(ApiResponse::ok(ConfigView::of(&config))),
    ))
}

/// GET /api/config
pub async fn get_config(RequireConfig(config): RequireConfig) -> Json<ApiResponse<ConfigView>> {
    Json(ApiResponse::ok(ConfigView::of(&config)))
}

/// PATCH /api/config
///
/// Merge a partial update and reissue the cookie. `createdAt` is kept, so an
/// update does not extend the 30-day lifetime.
pub async fn update_config(
    RequireConfig(config): RequireConfig,
    State(state): State<AppState>,
    ValidatedJson(update): ValidatedJson<ConfigUpdate>,
) -> AppResult<impl IntoResponse> {
    let mut updated = UserConfig::clone(&config);
    updated.apply(update);
    updated
        .validate_fields()
        .map_err(|reason| CoreError::Validation(reason.to_string()))?;

    let cookie = sealed_cookie(&state, &updated)?;

    tracing::info!(email = %updated.email, provider = %updated.provider, "Configuration updated");

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(ApiResponse::ok(ConfigView::of(&updated))),
    ))
}

/// DELETE /api/config
pub async fn delete_config(State(state): State<AppState>) -> impl IntoResponse {
    tracing::info!("Configuration cookie cleared");
    (
        AppendHeaders([(SET_COOKIE, expired_config_cookie(state.config.is_production()))]),
        Json(ApiResponse::<()>::empty()),
    )
}

/// GET /api/config/export
///
/// Downloadable copy with the API key redacted.
pub async fn export_config(RequireConfig(config): RequireConfig) -> impl IntoResponse {
    Json(ApiResponse::ok(config.export()))
}
