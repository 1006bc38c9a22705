use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProverError {
    #[error("proving service unreachable: {0}")]
    Unreachable(String),

    #[error("proof request rejected: {0}")]
    Rejected(String),

    #[error("proof unavailable: {0}")]
    ProofUnavailable(String),
}

impl ProverError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProverError::Unreachable(_))
    }

    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProverError::Unreachable(format!("request timed out: {e}"))
        } else if e.is_connect() {
            ProverError::Unreachable(format!("connection failed: {e}"))
        } else {
            ProverError::Rejected(e.to_string())
        }
    }
}
