//! Static registry of the supported AI providers and their models.
//!
//! The setup wizard lists these, and the config endpoints use the key-format
//! patterns to flag API keys that are obviously mistyped. Format checks are
//! advisory only: providers change their key shapes without notice.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Provider kind
// ---------------------------------------------------------------------------

/// The three vendors a user can configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Google,
}

/// All valid provider identifiers, in display order.
pub const VALID_PROVIDERS: &[&str] = &["openai", "anthropic", "google"];

impl ProviderKind {
    /// Parse the lowercase identifier used in cookies and env vars.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "google" => Ok(Self::Google),
            other => Err(format!(
                "Unsupported AI provider '{other}'. Must be one of: {}",
                VALID_PROVIDERS.join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
        }
    }

    /// Prefix used for `{PREFIX}_API_KEY` / `{PREFIX}_MODEL` env vars.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI",
            Self::Anthropic => "ANTHROPIC",
            Self::Google => "GOOGLE",
        }
    }

    /// Model used when the environment names a provider but no model: the
    /// catalog's first recommended entry.
    pub fn default_model(&self) -> &'static str {
        recommended_model(*self).id
    }

    /// Human-facing name used in upstream error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Google => "Google",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub context_limit: u32,
    pub recommended: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: ProviderKind,
    pub display_name: &'static str,
    pub api_key_url: &'static str,
    pub api_key_prefix: &'static str,
    #[serde(skip)]
    pub api_key_pattern: &'static str,
    pub models: &'static [ModelInfo],
}

const OPENAI_MODELS: &[ModelInfo] = &[
    ModelInfo { id: "gpt-4", name: "GPT-4", context_limit: 8_192, recommended: true },
    ModelInfo { id: "gpt-4-turbo", name: "GPT-4 Turbo", context_limit: 128_000, recommended: true },
    ModelInfo { id: "gpt-3.5-turbo", name: "GPT-3.5 Turbo", context_limit: 16_385, recommended: false },
];

const ANTHROPIC_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "claude-3-5-sonnet-20241022",
        name: "Claude 3.5 Sonnet",
        context_limit: 200_000,
        recommended: true,
    },
    ModelInfo {
        id: "claude-3-opus-20240229",
        name: "Claude 3 Opus",
        context_limit: 200_000,
        recommended: false,
    },
    ModelInfo {
        id: "claude-3-haiku-20240307",
        name: "Claude 3 Haiku",
        context_limit: 200_000,
        recommended: false,
    },
];

const GOOGLE_MODELS: &[ModelInfo] = &[
    ModelInfo { id: "gemini-1.5-pro", name: "Gemini 1.5 Pro", context_limit: 1_000_000, recommended: true },
    ModelInfo { id: "gemini-1.5-flash", name: "Gemini 1.5 Flash", context_limit: 1_000_000, recommended: true },
    ModelInfo { id: "gemini-pro", name: "Gemini Pro", context_limit: 30_720, recommended: false },
];

pub const PROVIDERS: &[ProviderInfo] = &[
    ProviderInfo {
        id: ProviderKind::OpenAi,
        display_name: "OpenAI",
        api_key_url: "https://platform.openai.com/api-keys",
        api_key_prefix: "sk-",
        api_key_pattern: r"^sk-[a-zA-Z0-9]{48,}$",
        models: OPENAI_MODELS,
    },
    ProviderInfo {
        id: ProviderKind::Anthropic,
        display_name: "Anthropic",
        api_key_url: "https://console.anthropic.com/settings/keys",
        api_key_prefix: "sk-ant-",
        api_key_pattern: r"^sk-ant-[a-zA-Z0-9\-_]{95,}$",
        models: ANTHROPIC_MODELS,
    },
    ProviderInfo {
        id: ProviderKind::Google,
        display_name: "Google",
        api_key_url: "https://aistudio.google.com/app/apikey",
        api_key_prefix: "AIza",
        api_key_pattern: r"^AIza[0-9A-Za-z\-_]{35}$",
        models: GOOGLE_MODELS,
    },
];

/// Look up the catalog entry for a provider.
pub fn provider_info(kind: ProviderKind) -> &'static ProviderInfo {
    PROVIDERS
        .iter()
        .find(|p| p.id == kind)
        .unwrap_or(&PROVIDERS[0])
}

/// Find a model by id within a provider's catalog entry.
pub fn find_model(kind: ProviderKind, model_id: &str) -> Option<&'static ModelInfo> {
    provider_info(kind).models.iter().find(|m| m.id == model_id)
}

/// First recommended model, or the first listed one.
pub fn recommended_model(kind: ProviderKind) -> &'static ModelInfo {
    let models = provider_info(kind).models;
    models.iter().find(|m| m.recommended).unwrap_or(&models[0])
}

fn key_patterns() -> &'static [(ProviderKind, Regex)] {
    static PATTERNS: OnceLock<Vec<(ProviderKind, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        PROVIDERS
            .iter()
            .filter_map(|p| Regex::new(p.api_key_pattern).ok().map(|re| (p.id, re)))
            .collect()
    })
}

/// Whether `api_key` matches the documented format for `kind`.
pub fn api_key_format_valid(kind: ProviderKind, api_key: &str) -> bool {
    key_patterns()
        .iter()
        .find(|(k, _)| *k == kind)
        .is_some_and(|(_, re)| re.is_match(api_key))
}
