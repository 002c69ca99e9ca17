//! Errors from external service adapters.

/// Failure talking to a text, image or storage provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        /// Error text extracted from the body, or the raw body.
        message: String,
    },

    /// A 2xx response that did not carry the expected payload.
    #[error("{provider} returned an invalid response: {reason}")]
    InvalidResponse {
        provider: &'static str,
        reason: String,
    },

    #[error("Blob storage error: {0}")]
    Storage(String),
}

impl ProviderError {
    pub fn invalid(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider,
            reason: reason.into(),
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Both OpenAI (`{"error": {"message": ...}}`) and Replicate
/// (`{"detail": ...}`) wrap the message; anything else is returned as-is.
pub(crate) fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    value
        .pointer("/error/message")
        .or_else(|| value.get("detail"))
        .or_else(|| value.get("error"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Return the response unchanged on a success status, or an
/// [`ProviderError::Api`] carrying the status and error text.
pub(crate) async fn ensure_success(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ProviderError::Api {
            provider,
            status: status.as_u16(),
            message: error_message(&body),
        });
    }
    Ok(response)
}
