//! Chat-completion adapters for the supported AI vendors.
//!
//! Each adapter speaks one vendor's REST API through a shared
//! [`reqwest::Client`] and reshapes the reply into a [`ChatResponse`].
//! Callers hold adapters as `Arc<dyn AiProvider>` built by a
//! [`ProviderFactory`].

pub mod anthropic;
pub mod error;
pub mod factory;
pub mod google;
mod http;
pub mod openai;
pub mod provider;
pub mod types;

pub use error::ProviderError;
pub use factory::{EnvProviderStatus, HttpProviderFactory, ProviderFactory, ProviderSettings};
pub use provider::AiProvider;
pub use types::{ChatMessage, ChatOptions, ChatResponse, ChatRole, Usage};
