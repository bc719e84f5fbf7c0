//! Typed LLM failure classification.
//!
//! Callers apply different fallback policies depending on whether the
//! capability is absent, transiently failing, or returning garbage, so the
//! distinction is carried in the type rather than inferred from message text
//! at every call site.

use thiserror::Error;

/// Failure modes of the external LLM capability.
#[derive(Error, Debug)]
pub enum LlmError {
    /// No provider is configured (missing credentials or endpoint).
    /// Consumers degrade to a deterministic fallback; never fatal.
    #[error("no LLM provider is configured")]
    Unavailable,

    /// The provider exists but the call failed transiently: rate limit,
    /// exhausted quota, network failure, or timeout.
    #[error("transient LLM failure: {0}")]
    Transient(String),

    /// The provider answered but the response could not be decoded.
    #[error("malformed LLM response: {0}")]
    Malformed(String),

    /// Any other provider-reported error.
    #[error("LLM provider error: {0}")]
    Other(String),
}

impl LlmError {
    /// Classify an HTTP error status + body into a failure mode.
    ///
    /// Rate limiting (429), quota exhaustion, and server-side errors are
    /// transient; everything else is a plain provider error.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let lower = body.to_lowercase();
        if status.as_u16() == 429
            || status.is_server_error()
            || lower.contains("quota")
            || lower.contains("rate limit")
        {
            LlmError::Transient(format!("{}: {}", status, body))
        } else {
            LlmError::Other(format!("{}: {}", status, body))
        }
    }

    /// Whether this failure is worth retrying later.
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmError::Transient(_))
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LlmError::Malformed(err.to_string())
        } else {
            // Connect failures and timeouts are transient from the caller's
            // perspective: the provider may come back.
            LlmError::Transient(err.to_string())
        }
    }
}

impl From<LlmError> for grounded_core::AppError {
    fn from(err: LlmError) -> Self {
        grounded_core::AppError::Llm(err.to_string())
    }
}

/// Convenience type alias for Results with LlmError.
pub type LlmResult<T> = Result<T, LlmError>;
