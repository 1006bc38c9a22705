use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger node unreachable: {0}")]
    Unreachable(String),

    #[error("ledger request failed: {0}")]
    RequestFailed(String),

    #[error("ledger RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid ledger response: {0}")]
    InvalidResponse(String),

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("faucet request failed: {0}")]
    Faucet(String),
}

impl LedgerError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LedgerError::Unreachable(format!("request timed out: {e}"))
        } else if e.is_connect() {
            LedgerError::Unreachable(format!("connection failed: {e}"))
        } else {
            LedgerError::RequestFailed(e.to_string())
        }
    }
}
