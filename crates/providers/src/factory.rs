//! Resolving provider settings and building adapters.
//!
//! Settings come from one of two places: the decrypted config cookie, or the
//! `AI_PROVIDER` / `{PROVIDER}_API_KEY` / `{PROVIDER}_MODEL` environment
//! variables. The factory trait is the seam the HTTP layer depends on, so
//! tests can hand back canned adapters instead of reaching the network.

use std::sync::Arc;
use std::time::Duration;

use prep_core::provider_catalog::{find_model, ProviderKind};
use prep_core::user_config::UserConfig;
use serde::Serialize;

use crate::anthropic::AnthropicProvider;
use crate::error::ProviderError;
use crate::google::GoogleProvider;
use crate::openai::OpenAiProvider;
use crate::provider::AiProvider;

/// Everything needed to construct one adapter.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub api_key: String,
    pub model: String,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl ProviderSettings {
    /// Settings from a decrypted cookie. Model and key must be non-blank.
    pub fn from_user_config(config: &UserConfig) -> Result<Self, ProviderError> {
        let kind = config.provider;
        if config.model.trim().is_empty() {
            return Err(ProviderError::Configuration(format!(
                "Model is required for {kind} provider"
            )));
        }
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::Configuration(format!(
                "API key is required for {kind} provider"
            )));
        }
        Ok(Self {
            kind,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Settings from the process environment.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Settings from an arbitrary variable lookup. Blank values count as
    /// unset; a missing model falls back to the provider default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = non_blank("AI_PROVIDER").ok_or_else(|| {
            ProviderError::Configuration("AI_PROVIDER environment variable is required".into())
        })?;
        let kind = ProviderKind::from_str_value(&provider).map_err(ProviderError::Configuration)?;

        let prefix = kind.env_prefix();
        let api_key = non_blank(&format!("{prefix}_API_KEY")).ok_or_else(|| {
            ProviderError::Configuration(format!("API key is required for {kind} provider"))
        })?;
        let model = non_blank(&format!("{prefix}_MODEL"))
            .unwrap_or_else(|| kind.default_model().to_string());

        Ok(Self {
            kind,
            api_key,
            model,
        })
    }
}

/// What `/api/ai/status` reports when no cookie is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvProviderStatus {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub configured: bool,
}

impl EnvProviderStatus {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match ProviderSettings::from_lookup(&lookup) {
            Ok(settings) => Self {
                provider: Some(settings.kind.as_str().to_string()),
                model: Some(settings.model),
                configured: true,
            },
            Err(_) => Self {
                provider: lookup("AI_PROVIDER").filter(|v| !v.trim().is_empty()),
                model: None,
                configured: false,
            },
        }
    }
}

/// Builds adapters for the HTTP layer.
pub trait ProviderFactory: Send + Sync {
    fn build(&self, settings: ProviderSettings) -> Arc<dyn AiProvider>;

    /// Adapter for the user behind a valid config cookie.
    fn for_user(&self, config: &UserConfig) -> Result<Arc<dyn AiProvider>, ProviderError> {
        Ok(self.build(ProviderSettings::from_user_config(config)?))
    }

    /// Adapter configured from the server environment.
    fn for_environment(&self) -> Result<Arc<dyn AiProvider>, ProviderError> {
        Ok(self.build(ProviderSettings::from_env()?))
    }

    fn environment_status(&self) -> EnvProviderStatus {
        EnvProviderStatus::from_env()
    }
}

/// Production factory: real REST adapters sharing one pooled client.
#[derive(Clone)]
pub struct HttpProviderFactory {
    client: reqwest::Client,
}

impl HttpProviderFactory {
    /// Build the shared client with a per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn build(&self, settings: ProviderSettings) -> Arc<dyn AiProvider> {
        tracing::debug!(provider = %settings.kind, model = %settings.model, "Building AI provider");
        if find_model(settings.kind, &settings.model).is_none() {
            tracing::warn!(
                provider = %settings.kind,
                model = %settings.model,
                "Model is not in the provider catalog; passing it through",
            );
        }
        let client = self.client.clone();
        match settings.kind {
            ProviderKind::OpenAi => Arc::new(OpenAiProvider::with_client(
                client,
                settings.api_key,
                settings.model,
            )),
            ProviderKind::Anthropic => Arc::new(AnthropicProvider::with_client(
                client,
                settings.api_key,
                settings.model,
            )),
            ProviderKind::Google => Arc::new(GoogleProvider::with_client(
                client,
                settings.api_key,
                settings.model,
            )),
        }
    }
}
