//! LLM error types.

use thiserror::Error;

/// Check an HTTP response for rate-limit errors, returning `RateLimit` for 429.
pub fn check_response_error(response: &reqwest::Response) -> Option<LLMError> {
    if response.status().is_success() {
        return None;
    }
    if response.status().as_u16() == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        return Some(LLMError::RateLimit { retry_after });
    }
    None
}

/// Errors that can occur when making LLM API calls.
#[derive(Debug, Error)]
pub enum LLMError {
    /// HTTP request failed (connect, timeout, body decode)
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned an error response
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Rate limited (429)
    #[error("rate limited (retry after {retry_after:?}s)")]
    RateLimit { retry_after: Option<u64> },

    /// Response parsed but did not have the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl LLMError {
    /// Whether the provider answered with a body we could not use.
    pub fn is_malformed(&self) -> bool {
        match self {
            LLMError::MalformedResponse(_) => true,
            LLMError::Request(e) => e.is_decode(),
            _ => false,
        }
    }
}

/// Read a non-success response into an error.
pub(crate) async fn error_from_response(response: reqwest::Response) -> LLMError {
    if let Some(err) = check_response_error(&response) {
        return err;
    }
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    LLMError::Api { status, message }
}
