//! OpenAI chat-completions adapter.

use async_trait::async_trait;
use prep_core::provider_catalog::ProviderKind;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::http::{parse_response, validation_outcome};
use crate::provider::AiProvider;
use crate::types::{ChatMessage, ChatOptions, ChatResponse, Usage};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

const PROVIDER: &str = "OpenAI";

pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    model: Option<String>,
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl OpenAiProvider {
    pub fn with_client(client: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            client,
            base_url: OPENAI_BASE_URL.to_string(),
            api_key,
            model,
        }
    }

    /// Point the adapter at a different host (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_body(&self, messages: &[ChatMessage], options: &ChatOptions) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
        });
        if options.json_mode {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }
        body
    }

    fn into_chat_response(&self, data: CompletionResponse) -> Result<ChatResponse, ProviderError> {
        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or(ProviderError::EmptyResponse(PROVIDER))?;

        Ok(ChatResponse {
            content,
            model: data.model.unwrap_or_else(|| self.model.clone()),
            usage: data.usage.map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
        })
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
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
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(messages, options))
            .send()
            .await?;

        let data: CompletionResponse = parse_response(PROVIDER, response).await?;
        self.into_chat_response(data)
    }

    async fn validate_api_key(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/v1/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await;
        validation_outcome(PROVIDER, result)
    }
}
