//! Nonce commitment embedded in the identity token at login.
//!
//! nonce = base64url(Blake2b-256("zkvote-nonce" ‖ pk ‖ max_epoch ‖ randomness)[..20])
//!
//! The identity provider echoes the nonce back inside the token, which ties
//! the token to this ephemeral key, this epoch bound and this randomness.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use zkvote_types::{Epoch, PublicKey};

use crate::bigint::parse_decimal;
use crate::{blake2b_256_multi, CryptoError};

const NONCE_DOMAIN: &[u8] = b"zkvote-nonce";
const NONCE_BYTES: usize = 20;

/// Compute the login nonce for an ephemeral public key.
pub fn compute_nonce(
    public_key: &PublicKey,
    max_epoch: Epoch,
    randomness: &str,
) -> Result<String, CryptoError> {
    let randomness_value = parse_decimal(randomness)
        .ok_or_else(|| CryptoError::InvalidRandomness(randomness.into()))?;
    let digest = blake2b_256_multi(&[
        NONCE_DOMAIN,
        public_key.as_bytes(),
        &max_epoch.to_be_bytes(),
        &randomness_value.to_bytes_be(),
    ]);
    Ok(URL_SAFE_NO_PAD.encode(&digest[..NONCE_BYTES]))
}
