/// Errors from talking to an AI provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered with a non-2xx status.
    #[error("{provider} API error: {status} {status_text}")]
    Api {
        provider: &'static str,
        status: u16,
        status_text: String,
    },

    /// The request never completed (network, DNS, TLS, timeout) or the body
    /// could not be decoded.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A 2xx reply without the expected content field.
    #[error("No content received from {0}")]
    EmptyResponse(&'static str),

    /// Missing or unusable provider settings.
    #[error("{0}")]
    Configuration(String),
}

impl ProviderError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
