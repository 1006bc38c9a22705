use thiserror::Error;

/// Errors arising from key material and identity-derived values.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid salt {0:?}: expected a non-negative decimal integer")]
    InvalidSalt(String),

    #[error("invalid randomness {0:?}: expected a non-negative decimal integer")]
    InvalidRandomness(String),

    #[error("issuer claim too long: {0} bytes")]
    IssuerTooLong(usize),

    #[error("key derivation failed: {0}")]
    Derivation(String),
}
