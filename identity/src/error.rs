use thiserror::Error;
use zkvote_crypto::CryptoError;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("malformed identity token: {0}")]
    MalformedToken(String),

    #[error("token nonce does not match the ephemeral key (expected {expected}, got {actual})")]
    NonceMismatch { expected: String, actual: String },

    #[error("no id_token found in the callback")]
    MissingToken,

    #[error("address derivation failed: {0}")]
    Derivation(#[from] CryptoError),
}
