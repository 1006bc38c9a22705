use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaltError {
    #[error("salt issuer unreachable: {0}")]
    Unreachable(String),

    #[error("salt request failed: {0}")]
    RequestFailed(String),

    #[error("invalid salt service response: {0}")]
    InvalidResponse(String),

    #[error("salt service returned no salt")]
    MissingSalt,

    #[error("invalid salt (expected a non-negative decimal integer): {0}")]
    InvalidSalt(String),

    #[error("salt unavailable: {0}")]
    SaltUnavailable(String),

    #[error("salt conflict: {0}")]
    Conflict(String),

    #[error("wrong body format: {0}")]
    RequestValidation(String),

    #[error("salt cache error: {0}")]
    Cache(String),
}

impl SaltError {
    /// Transport failures are worth retrying; answers from the issuer are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SaltError::Unreachable(_))
    }

    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SaltError::Unreachable(format!("request timed out: {e}"))
        } else if e.is_connect() {
            SaltError::Unreachable(format!("connection failed: {e}"))
        } else {
            SaltError::RequestFailed(e.to_string())
        }
    }
}
