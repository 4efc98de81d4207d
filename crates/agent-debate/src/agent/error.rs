//! Error types for the agent gateway.

use std::time::Duration;
use thiserror::Error;

/// Failures a single gateway call can end in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The subprocess did not finish within the per-call bound. Never retried.
    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Spawn failure, non-zero exit, or an error envelope that is not a rate limit.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend reported a rate limit. Retried inside the retry policy.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Still rate limited once the retry budget ran out.
    #[error("rate limited after {attempts} attempts: {message}")]
    RateLimitExhausted { attempts: u32, message: String },

    /// The envelope parsed but the expected text field was absent or empty,
    /// or the output could not be parsed at all.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A well-formed reply with nothing but whitespace in it.
    #[error("empty response")]
    EmptyResponse,
}

impl GatewayError {
    /// Only rate limits are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::RateLimited(_))
    }

    /// Number of attempts made, when the error came out of the retry loop.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            GatewayError::RateLimitExhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}
