//! RPC error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("config error: {0}")]
    Config(String),

    #[error("cannot bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("server error: {0}")]
    Server(String),

    #[error("metrics error: {0}")]
    Metrics(String),

    #[error("salt cache error: {0}")]
    Cache(#[from] zkvote_salt::SaltError),
}
