use thiserror::Error;
use zkvote_crypto::CryptoError;
use zkvote_ledger::LedgerError;

#[derive(Debug, Error)]
pub enum TxError {
    #[error("signing failed: {0}")]
    Signing(String),

    #[error("transaction failed: {0}")]
    Submission(String),

    #[error("cannot build transaction: {0}")]
    Build(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
