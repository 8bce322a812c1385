use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use prep_core::cookie_cipher::CipherError;
use prep_core::error::CoreError;
use prep_core::roadmap::RoadmapParseError;
use prep_providers::ProviderError;
use serde_json::json;

use crate::engine::roadmap::RoadmapError;
use crate::response::{ApiResponse, ErrorBody};

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain errors of the lower crates and adds HTTP-specific
/// variants. Every variant renders as the standard failure envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `prep_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Roadmap generation failed.
    #[error(transparent)]
    Roadmap(#[from] RoadmapError),

    /// A direct provider call (chat, key validation) failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Sealing the config cookie failed.
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// Request body or query failed `validator` rules.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Server-side provider settings are incomplete.
    #[error("Server configuration error: {0}")]
    ServerConfiguration(String),

    /// The client exhausted its rate-limit window.
    #[error("Rate limit exceeded")]
    RateLimited {
        message: &'static str,
        retry_after_secs: u64,
    },

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut retry_after = None;
        let (status, code, message, details) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                    None,
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
                }
                CoreError::ConfigurationRequired(msg) => (
                    StatusCode::UNAUTHORIZED,
                    "CONFIGURATION_REQUIRED",
                    msg.clone(),
                    Some(json!({ "redirectToSetup": true })),
                ),
                CoreError::Configuration(msg) => {
                    (StatusCode::BAD_REQUEST, "CONFIGURATION_ERROR", msg.clone(), None)
                }
                CoreError::Forbidden(msg) => {
                    (StatusCode::FORBIDDEN, "ACCESS_DENIED", msg.clone(), None)
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Roadmap generation ---
            AppError::Roadmap(err) => match err {
                RoadmapError::Configuration(msg) => {
                    (StatusCode::BAD_REQUEST, "CONFIGURATION_ERROR", msg.clone(), None)
                }
                RoadmapError::Provider(e) => {
                    tracing::warn!(error = %e, "AI provider call failed during roadmap generation");
                    ai_service_error(e)
                }
                RoadmapError::Parse(e) => {
                    tracing::error!(error = %e, "AI returned an unusable roadmap");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "Failed to generate roadmap".to_string(),
                        Some(json!({ "reason": parse_reason(e) })),
                    )
                }
            },

            // --- Direct provider calls ---
            AppError::Provider(err) => match err {
                ProviderError::Configuration(msg) => {
                    (StatusCode::BAD_REQUEST, "CONFIGURATION_ERROR", msg.clone(), None)
                }
                other => {
                    tracing::warn!(error = %other, "AI provider call failed");
                    ai_service_error(other)
                }
            },

            AppError::Cipher(err) => {
                tracing::error!(error = %err, "Config cookie sealing failed");
                internal()
            }

            // --- HTTP-specific errors ---
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Invalid request".to_string(),
                serde_json::to_value(errors).ok(),
            ),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            AppError::ServerConfiguration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::RateLimited {
                message,
                retry_after_secs,
            } => {
                retry_after = Some(*retry_after_secs);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "RATE_LIMIT_EXCEEDED",
                    message.to_string(),
                    None,
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = ApiResponse::<()>::failure(ErrorBody {
            code,
            message,
            details,
        });
        let mut response = (status, axum::Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

type Rendered = (
    StatusCode,
    &'static str,
    String,
    Option<serde_json::Value>,
);

fn internal() -> Rendered {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
        None,
    )
}

fn ai_service_error(err: &ProviderError) -> Rendered {
    let details = match err {
        ProviderError::Api { status, .. } => Some(json!({ "upstreamStatus": status })),
        _ => None,
    };
    (
        StatusCode::BAD_GATEWAY,
        "AI_SERVICE_ERROR",
        "Failed to communicate with AI provider".to_string(),
        details,
    )
}

fn parse_reason(err: &RoadmapParseError) -> &'static str {
    match err {
        RoadmapParseError::NoJson => "no_json",
        RoadmapParseError::InvalidJson(_) => "invalid_json",
        RoadmapParseError::MissingField(_) => "missing_field",
        RoadmapParseError::Shape(_) => "unexpected_shape",
    }
}
