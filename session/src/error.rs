use thiserror::Error;
use zkvote_crypto::CryptoError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no session found; log in first")]
    MissingSession,

    #[error("session store I/O error: {0}")]
    Io(String),

    #[error("corrupt session record: {0}")]
    Corrupt(String),

    #[error("invalid ephemeral key: {0}")]
    InvalidKey(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
