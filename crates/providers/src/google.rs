//! Google Gemini `generateContent` adapter.

use async_trait::async_trait;
use prep_core::provider_catalog::ProviderKind;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::http::{parse_response, validation_outcome};
use crate::provider::AiProvider;
use crate::types::{ChatMessage, ChatOptions, ChatResponse, ChatRole, Usage};

pub const GOOGLE_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const PROVIDER: &str = "Google";

pub struct GoogleProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

/// Gemini calls the assistant side of the conversation `model`.
fn gemini_role(role: ChatRole) -> &'static str {
    match role {
        ChatRole::Assistant => "model",
        _ => "user",
    }
}

impl GoogleProvider {
    pub fn with_client(client: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            client,
            base_url: GOOGLE_BASE_URL.to_string(),
            api_key,
            model,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_body(&self, messages: &[ChatMessage], options: &ChatOptions) -> serde_json::Value {
        let contents: Vec<serde_json::Value> = messages
            .iter()
            .filter(|m| m.role != ChatRole::System)
            .map(|m| {
                serde_json::json!({
                    "role": gemini_role(m.role),
                    "parts": [{ "text": m.content }],
                })
            })
            .collect();

        let mut generation_config = serde_json::json!({
            "temperature": options.temperature,
            "maxOutputTokens": options.max_tokens,
        });
        if options.json_mode {
            generation_config["responseMimeType"] =
                serde_json::Value::String("application/json".into());
        }

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": generation_config,
        });
        if let Some(system) = messages.iter().find(|m| m.role == ChatRole::System) {
            body["systemInstruction"] = serde_json::json!({ "parts": [{ "text": system.content }] });
        }
        body
    }

    fn into_chat_response(&self, data: GenerateResponse) -> Result<ChatResponse, ProviderError> {
        let content = data
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or(ProviderError::EmptyResponse(PROVIDER))?;

        // Gemini does not echo the model id back.
        Ok(ChatResponse {
            content,
            model: self.model.clone(),
            usage: data.usage_metadata.map(|u| Usage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            }),
        })
    }
}

#[async_trait]
impl AiProvider for GoogleProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn chat_with(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatResponse, ProviderError> {
        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", &self.api_key)])
            .json(&self.request_body(messages, options))
            .send()
            .await?;

        let data: GenerateResponse = parse_response(PROVIDER, response).await?;
        self.into_chat_response(data)
    }

    async fn validate_api_key(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/v1beta/models", self.base_url))
            .query(&[("key", &self.api_key)])
            .send()
            .await;
        validation_outcome(PROVIDER, result)
    }
}
