use async_trait::async_trait;
use prep_core::provider_catalog::ProviderKind;

use crate::error::ProviderError;
use crate::types::{ChatMessage, ChatOptions, ChatResponse};

/// A configured chat-completion backend.
///
/// Implementations make exactly one upstream call per method; there is no
/// retry or backoff at this layer.
#[async_trait]
pub trait AiProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn model(&self) -> &str;

    /// Chat with the default options.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatResponse, ProviderError> {
        self.chat_with(messages, &ChatOptions::default()).await
    }

    async fn chat_with(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatResponse, ProviderError>;

    /// Cheap round trip proving the key works. Every failure, including
    /// transport errors, is reported as `false`.
    async fn validate_api_key(&self) -> bool;
}
