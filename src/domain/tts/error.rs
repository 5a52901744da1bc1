use crate::error::AppError;

/// Outcome of a single failed provider call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderFailure {
    #[error("rate limited (HTTP 429)")]
    RateLimited,
    #[error("transient upstream error (HTTP {0})")]
    Transient(u16),
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("credential rejected (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },
    #[error("request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

const INVALID_KEY_MARKERS: &[&str] = &["API_KEY_INVALID", "API key not valid", "API key expired"];

impl ProviderFailure {
    /// Classify a non-2xx provider response.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message: String = body.chars().take(300).collect();
        match status {
            429 => ProviderFailure::RateLimited,
            408 => ProviderFailure::Timeout,
            401 | 403 => ProviderFailure::Unauthorized { status, message },
            400 if INVALID_KEY_MARKERS.iter().any(|m| body.contains(m)) => {
                ProviderFailure::Unauthorized { status, message }
            }
            500..=599 => ProviderFailure::Transient(status),
            _ => ProviderFailure::Rejected { status, message },
        }
    }

    /// Worth retrying with the same key after a backoff
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderFailure::RateLimited
                | ProviderFailure::Transient(_)
                | ProviderFailure::Timeout
                | ProviderFailure::Transport(_)
                | ProviderFailure::MalformedResponse(_)
        )
    }

    /// The key itself is unusable
    pub fn is_key_fatal(&self) -> bool {
        matches!(self, ProviderFailure::Unauthorized { .. })
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SynthesisError {
    #[error("no API keys available for provider {0}")]
    NoKeysAvailable(String),
    #[error("all API keys are rate limited, try again later")]
    AllKeysRateLimited,
    #[error("all API keys were rejected, check the provider credentials")]
    AllKeysForbidden,
    #[error("speech provider failed: {0}")]
    UpstreamUnknownFailure(String),
    #[error("provider rejected the request: {0}")]
    Rejected(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("audio encoding failed: {0}")]
    Encoding(String),
    #[error("cancelled before synthesis started")]
    Cancelled,
    #[error("not attempted after a batch failure")]
    Aborted,
    #[error("dependency error: {0}")]
    Dependency(String),
}

impl SynthesisError {
    /// Errors that end the whole batch rather than a single item
    pub fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            SynthesisError::NoKeysAvailable(_)
                | SynthesisError::AllKeysRateLimited
                | SynthesisError::AllKeysForbidden
                | SynthesisError::UpstreamUnknownFailure(_)
        )
    }
}

impl From<SynthesisError> for AppError {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::Invalid(msg) => AppError::BadRequest(msg),
            SynthesisError::AllKeysRateLimited => AppError::RateLimitExceeded(err.to_string()),
            SynthesisError::NoKeysAvailable(_)
            | SynthesisError::AllKeysForbidden
            | SynthesisError::Dependency(_) => AppError::ServiceUnavailable(err.to_string()),
            SynthesisError::UpstreamUnknownFailure(_) | SynthesisError::Rejected(_) => {
                AppError::ExternalService(err.to_string())
            }
            SynthesisError::Encoding(_) | SynthesisError::Cancelled | SynthesisError::Aborted => {
                AppError::Internal(err.to_string())
            }
        }
    }
}
