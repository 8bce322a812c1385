//! Response helpers shared by the adapters.

use serde::de::DeserializeOwned;

use crate::error::ProviderError;

/// Map a non-2xx response to [`ProviderError::Api`].
pub(crate) fn ensure_success(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Api {
            provider,
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
        });
    }
    Ok(response)
}

/// Check the status, then decode the JSON body.
pub(crate) async fn parse_response<T: DeserializeOwned>(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let response = ensure_success(provider, response)?;
    Ok(response.json::<T>().await?)
}

/// Outcome of a key-validation round trip, with failures logged and
/// collapsed to `false`.
pub(crate) fn validation_outcome(
    provider: &'static str,
    result: Result<reqwest::Response, reqwest::Error>,
) -> bool {
    match result {
        Ok(response) if response.status().is_success() => true,
        Ok(response) => {
            tracing::info!(provider, status = response.status().as_u16(), "API key rejected");
            false
        }
        Err(e) => {
            tracing::warn!(provider, error = %e, "API key validation request failed");
            false
        }
    }
}
