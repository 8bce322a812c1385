//! Anthropic messages adapter.
//!
//! The messages API takes the system prompt as a top-level field, so the
//! first system message is lifted out and the rest are forwarded as-is.

use async_trait::async_trait;
use prep_core::provider_catalog::ProviderKind;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::http::{parse_response, validation_outcome};
use crate::provider::AiProvider;
use crate::types::{ChatMessage, ChatOptions, ChatResponse, ChatRole, Usage};

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

const PROVIDER: &str = "Anthropic";

pub struct AnthropicProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    model: Option<String>,
    usage: Option<MessagesUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicProvider {
    pub fn with_client(client: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            client,
            base_url: ANTHROPIC_BASE_URL.to_string(),
            api_key,
            model,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn messages_request(&self) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
    }

    fn request_body(&self, messages: &[ChatMessage], options: &ChatOptions) -> serde_json::Value {
        let system = messages
            .iter()
            .find(|m| m.role == ChatRole::System)
            .map(|m| m.content.as_str());
        let conversation: Vec<&ChatMessage> = messages
            .iter()
            .filter(|m| m.role != ChatRole::System)
            .collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "max_tokens": options.max_tokens,
            "messages": conversation,
        });
        if let Some(system) = system {
            body["system"] = serde_json::Value::String(system.to_string());
        }
        body
    }

    fn into_chat_response(&self, data: MessagesResponse) -> Result<ChatResponse, ProviderError> {
        let content = data
            .content
            .into_iter()
            .next()
            .and_then(|b| b.text)
            .ok_or(ProviderError::EmptyResponse(PROVIDER))?;

        Ok(ChatResponse {
            content,
            model: data.model.unwrap_or_else(|| self.model.clone()),
            usage: data.usage.map(|u| Usage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
                total_tokens: u.input_tokens + u.output_tokens,
            }),
        })
    }
}

#[async_trait]
impl AiProvider for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
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
            .messages_request()
            .json(&self.request_body(messages, options))
            .send()
            .await?;

        let data: MessagesResponse = parse_response(PROVIDER, response).await?;
        self.into_chat_response(data)
    }

    async fn validate_api_key(&self) -> bool {
        let probe = serde_json::json!({
            "model": self.model,
            "max_tokens": 1,
            "messages": [{ "role": "user", "content": "test" }],
        });
        let result = self.messages_request().json(&probe).send().await;
        validation_outcome(PROVIDER, result)
    }
}
