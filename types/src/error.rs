//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for value parsing in zkvote.
#[derive(Debug, Error)]
pub enum ZkVoteError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    #[error("{0}")]
    Other(String),
}
