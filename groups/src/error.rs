use thiserror::Error;
use zkvote_ledger::LedgerError;

#[derive(Debug, Error)]
pub enum GroupError {
    #[error("unexpected voting group layout: {0}")]
    InvalidGroup(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
