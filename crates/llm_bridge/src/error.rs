//! Error types for model calls

use crate::config::MissingCredentialError;
use core_pipeline::ParseError;

/// The remote call itself failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelInvocationError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("API key rejected ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("API returned error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response envelope: {0}")]
    InvalidEnvelope(String),

    #[error("model returned no text")]
    EmptyResponse,
}

impl From<reqwest::Error> for ModelInvocationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ModelInvocationError::Timeout
        } else {
            ModelInvocationError::Network(e.to_string())
        }
    }
}

/// Failure of a single model client operation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error(transparent)]
    MissingCredential(#[from] MissingCredentialError),

    #[error(transparent)]
    Invocation(#[from] ModelInvocationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
