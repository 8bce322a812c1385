//! The per-user configuration carried in the encrypted cookie.
//!
//! A `UserConfig` is never stored server-side. It is produced by the setup
//! wizard, sealed into the `ai-interview-config` cookie, and opened again on
//! every request. This module owns its shape, validation and expiry rules.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail};

use crate::provider_catalog::{self, ProviderKind};
use crate::types::Timestamp;

/// Name of the configuration cookie.
pub const CONFIG_COOKIE_NAME: &str = "ai-interview-config";

/// Days after `createdAt` before a configuration is considered expired.
pub const CONFIG_MAX_AGE_DAYS: i64 = 30;

/// Placeholder used wherever a key would otherwise be exported.
pub const REDACTED: &str = "***REDACTED***";

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    pub email: String,
    pub password: String,
    pub provider: ProviderKind,
    pub model: String,
    pub api_key: String,
    pub api_url: String,
    pub setup_complete: bool,
    /// Kept as the raw ISO-8601 string so an unparseable value can be
    /// detected (and treated as expired) instead of failing deserialization.
    pub created_at: String,
}

// Secrets stay out of logs.
impl std::fmt::Debug for UserConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserConfig")
            .field("email", &self.email)
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("setup_complete", &self.setup_complete)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Why a decrypted configuration was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigRejection {
    MissingField(&'static str),
    Expired,
}

impl std::fmt::Display for ConfigRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "field '{field}' is empty"),
            Self::Expired => write!(f, "configuration older than {CONFIG_MAX_AGE_DAYS} days"),
        }
    }
}

impl UserConfig {
    /// Check that every required field is populated.
    ///
    /// The provider is already constrained by its enum type during
    /// deserialization, so only the free-form strings are checked here.
    pub fn validate_fields(&self) -> Result<(), ConfigRejection> {
        let required: [(&'static str, &str); 6] = [
            ("email", &self.email),
            ("password", &self.password),
            ("model", &self.model),
            ("apiKey", &self.api_key),
            ("apiUrl", &self.api_url),
            ("createdAt", &self.created_at),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigRejection::MissingField(name));
            }
        }
        Ok(())
    }

    /// Parsed `createdAt`, if it is valid RFC 3339.
    pub fn created_at_parsed(&self) -> Option<Timestamp> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Whole days elapsed since creation, floored. `None` when unparseable.
    pub fn age_in_days_at(&self, now: Timestamp) -> Option<i64> {
        self.created_at_parsed()
            .map(|created| (now - created).num_days())
    }

    /// A config is expired strictly after 30 whole days, or when its
    /// creation time cannot be read at all.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        match self.age_in_days_at(now) {
            Some(days) => days > CONFIG_MAX_AGE_DAYS,
            None => true,
        }
    }

    /// Full check applied by the cookie middleware.
    pub fn check_at(&self, now: Timestamp) -> Result<(), ConfigRejection> {
        self.validate_fields()?;
        if self.is_expired_at(now) {
            return Err(ConfigRejection::Expired);
        }
        Ok(())
    }

    /// When the cookie carrying this config stops being accepted.
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.created_at_parsed()
            .map(|created| created + Duration::days(CONFIG_MAX_AGE_DAYS + 1))
    }

    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            email: self.email.clone(),
            provider: self.provider,
            model: self.model.clone(),
            api_url: self.api_url.clone(),
            setup_complete: self.setup_complete,
            created_at: self.created_at.clone(),
        }
    }

    pub fn export(&self) -> ConfigExport {
        ConfigExport {
            provider: self.provider,
            model: self.model.clone(),
            api_url: self.api_url.clone(),
            setup_complete: self.setup_complete,
            created_at: self.created_at.clone(),
            api_key: REDACTED,
        }
    }

    /// Merge a partial update. Identity fields are re-validated by the
    /// caller through [`UserConfig::validate_fields`].
    pub fn apply(&mut self, update: ConfigUpdate) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(password) = update.password {
            self.password = password;
        }
        if let Some(provider) = update.provider {
            self.provider = provider;
        }
        if let Some(model) = update.model {
            self.model = model;
        }
        if let Some(api_key) = update.api_key {
            self.api_key = api_key;
        }
        if let Some(api_url) = update.api_url {
            self.api_url = api_url;
        }
    }

    pub fn api_key_format_valid(&self) -> bool {
        provider_catalog::api_key_format_valid(self.provider, &self.api_key)
    }
}

/// Non-secret view of a configuration returned by status endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSummary {
    pub email: String,
    pub provider: ProviderKind,
    pub model: String,
    pub api_url: String,
    pub setup_complete: bool,
    pub created_at: String,
}

/// Downloadable export with the key redacted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigExport {
    pub provider: ProviderKind,
    pub model: String,
    pub api_url: String,
    pub setup_complete: bool,
    pub created_at: String,
    pub api_key: &'static str,
}

// ---------------------------------------------------------------------------
// Setup wizard input
// ---------------------------------------------------------------------------

/// Body accepted when the setup wizard completes.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUserConfig {
    #[validate(email(message = "Valid email required"))]
    pub email: String,
    #[validate(length(min = 1, max = 200, message = "Password required"))]
    pub password: String,
    pub provider: ProviderKind,
    #[validate(length(min = 1, max = 100, message = "Model required"))]
    pub model: String,
    #[validate(length(min = 1, max = 500, message = "API key required"))]
    pub api_key: String,
    #[serde(default)]
    pub api_url: Option<String>,
}

/// Default `apiUrl` when the wizard does not supply one.
pub const DEFAULT_API_URL: &str = "http://localhost:3004";

impl NewUserConfig {
    /// Stamp the wizard input into a complete configuration.
    pub fn into_config(self, now: Timestamp) -> UserConfig {
        UserConfig {
            email: self.email,
            password: self.password,
            provider: self.provider,
            model: self.model,
            api_key: self.api_key,
            api_url: self
                .api_url
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            setup_complete: true,
            created_at: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

/// Partial update applied to an existing cookie.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    #[validate(email(message = "Valid email required"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub password: Option<String>,
    pub provider: Option<ProviderKind>,
    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub api_key: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub api_url: Option<String>,
}

/// Whether a path segment used as a user id looks like an email address.
pub fn is_valid_user_id(user_id: &str) -> bool {
    user_id.validate_email()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_config(created_at: Timestamp) -> UserConfig {
        UserConfig {
            email: "test@example.com".to_string(),
            password: "testpassword123".to_string(),
            provider: ProviderKind::OpenAi,
            model: "gpt-4".to_string(),
            api_key: "test-api-key".to_string(),
            api_url: "http://localhost:3003".to_string(),
            setup_complete: true,
            created_at: created_at.to_rfc3339(),
        }
    }

    #[test]
    fn fresh_config_passes_check() {
        let now = Utc::now();
        assert_eq!(sample_config(now).check_at(now), Ok(()));
    }

    #[test]
    fn config_29_days_old_is_valid() {
        let now = Utc::now();
        let config = sample_config(now - Duration::days(29));
        assert!(!config.is_expired_at(now));
    }

    #[test]
    fn config_30_days_old_is_still_valid() {
        let now = Utc::now();
        let config = sample_config(now - Duration::days(30) - Duration::hours(1));
        assert!(!config.is_expired_at(now));
    }

    #[test]
    fn config_31_days_old_is_expired() {
        let now = Utc::now();
        let config = sample_config(now - Duration::days(31));
        assert!(config.is_expired_at(now));
        assert_eq!(config.check_at(now), Err(ConfigRejection::Expired));
    }

    #[test]
    fn unparseable_created_at_counts_as_expired() {
        let now = Utc::now();
        let mut config = sample_config(now);
        config.created_at = "yesterday-ish".to_string();
        assert!(config.is_expired_at(now));
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let now = Utc::now();
        let mut config = sample_config(now);
        config.api_key = "  ".to_string();
        assert_eq!(
            config.check_at(now),
            Err(ConfigRejection::MissingField("apiKey"))
        );
    }

    #[test]
    fn unknown_provider_fails_deserialization() {
        let json = serde_json::json!({
            "email": "a@b.com", "password": "p", "provider": "mistral",
            "model": "m", "apiKey": "k", "apiUrl": "u",
            "setupComplete": true, "createdAt": "2024-01-01T00:00:00Z"
        });
        assert!(serde_json::from_value::<UserConfig>(json).is_err());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let rendered = format!("{:?}", sample_config(Utc::now()));
        assert!(!rendered.contains("testpassword123"));
        assert!(!rendered.contains("test-api-key"));
    }

    #[test]
    fn export_redacts_api_key() {
        let export = sample_config(Utc::now()).export();
        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["apiKey"], REDACTED);
        assert!(json.get("password").is_none());
    }

    #[test]
    fn apply_merges_only_present_fields() {
        let mut config = sample_config(Utc::now());
        config.apply(ConfigUpdate {
            model: Some("gpt-4-turbo".to_string()),
            ..Default::default()
        });
        assert_eq!(config.model, "gpt-4-turbo");
        assert_eq!(config.api_key, "test-api-key");
    }

    #[test]
    fn new_config_defaults_api_url_and_marks_setup_complete() {
        let input = NewUserConfig {
            email: "new@example.com".to_string(),
            password: "pw".to_string(),
            provider: ProviderKind::Google,
            model: "gemini-1.5-pro".to_string(),
            api_key: "AIza-key".to_string(),
            api_url: None,
        };
        let now = Utc::now();
        let config = input.into_config(now);
        assert!(config.setup_complete);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.check_at(now).is_ok());
    }

    #[test]
    fn user_id_must_be_an_email() {
        assert!(is_valid_user_id("test@example.com"));
        assert!(!is_valid_user_id("invalid-email"));
    }
}
