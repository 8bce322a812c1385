//! Config cookie resolution and the extractors that gate on it.
//!
//! The request-context middleware resolves the cookie once per request and
//! stores a [`ConfigStatus`] in the request extensions. Handlers then pick
//! either [`ConfigStatus`] (optional) or [`RequireConfig`] (401 unless valid).

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use prep_core::cookie_cipher::CookieCipher;
use prep_core::error::CoreError;
use prep_core::types::Timestamp;
use prep_core::user_config::{UserConfig, CONFIG_COOKIE_NAME, CONFIG_MAX_AGE_DAYS};

use crate::error::AppError;

const SETUP_REQUIRED: &str = "Please complete the setup wizard to configure your AI provider";

/// Outcome of reading the config cookie for one request.
#[derive(Debug, Clone)]
pub enum ConfigStatus {
    Valid(Arc<UserConfig>),
    Missing,
    /// Present but unusable; the reason is for logs only.
    Invalid(String),
}

impl ConfigStatus {
    pub fn valid(&self) -> Option<&Arc<UserConfig>> {
        match self {
            Self::Valid(config) => Some(config),
            _ => None,
        }
    }
}

/// Decrypt, validate and expiry-check the config cookie. Never fails.
pub fn resolve_config(cipher: &CookieCipher, jar: &CookieJar, now: Timestamp) -> ConfigStatus {
    let Some(cookie) = jar.get(CONFIG_COOKIE_NAME) else {
        return ConfigStatus::Missing;
    };

    let config = match cipher.open_config(cookie.value()) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Config cookie could not be opened");
            return ConfigStatus::Invalid(e.to_string());
        }
    };

    if let Err(reason) = config.check_at(now) {
        tracing::info!(email = %config.email, %reason, "Config cookie rejected");
        return ConfigStatus::Invalid(reason.to_string());
    }

    tracing::debug!(email = %config.email, provider = %config.provider, "Config cookie accepted");
    ConfigStatus::Valid(Arc::new(config))
}

/// `Set-Cookie` value carrying a sealed configuration.
pub fn config_cookie(sealed: &str, secure: bool) -> String {
    let max_age = CONFIG_MAX_AGE_DAYS * 24 * 60 * 60;
    cookie_header(sealed, max_age, secure)
}

/// `Set-Cookie` value that deletes the configuration cookie.
pub fn expired_config_cookie(secure: bool) -> String {
    cookie_header("", 0, secure)
}

fn cookie_header(value: &str, max_age: i64, secure: bool) -> String {
    let mut header =
        format!("{CONFIG_COOKIE_NAME}={value}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Strict");
    if secure {
        header.push_str("; Secure");
    }
    header
}

fn status_of(parts: &Parts) -> ConfigStatus {
    parts
        .extensions
        .get::<ConfigStatus>()
        .cloned()
        .unwrap_or(ConfigStatus::Missing)
}

impl<S: Send + Sync> FromRequestParts<S> for ConfigStatus {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(status_of(parts))
    }
}

/// Requires a valid config cookie. Rejects with 401
/// `CONFIGURATION_REQUIRED` otherwise.
///
/// ```ignore
/// async fn handler(RequireConfig(config): RequireConfig) -> AppResult<Json<()>> {
///     tracing::info!(email = %config.email, "handling request");
///     Ok(Json(()))
/// }
/// ```
pub struct RequireConfig(pub Arc<UserConfig>);

impl<S: Send + Sync> FromRequestParts<S> for RequireConfig {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match status_of(parts) {
            ConfigStatus::Valid(config) => Ok(RequireConfig(config)),
            _ => Err(AppError::Core(CoreError::ConfigurationRequired(
                SETUP_REQUIRED.into(),
            ))),
        }
    }
}

impl RequireConfig {
    /// 403 unless the path's user id is the cookie owner's email.
    pub fn ensure_owner(&self, user_id: &str, message: &str) -> Result<(), AppError> {
        if self.0.email != user_id {
            tracing::warn!(email = %self.0.email, requested = user_id, "Cross-user access denied");
            return Err(AppError::Core(CoreError::Forbidden(message.into())));
        }
        Ok(())
    }
}
