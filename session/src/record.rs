//! The persisted session record.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;
use zkvote_types::{Epoch, KeyPair, PrivateKey, PublicKey};

use crate::StoreError;

/// Ephemeral signing key material and its nonce commitment.
///
/// Keys are stored base64-encoded. The private key never leaves the device
/// and is redacted from `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EphemeralKeyData {
    pub public_key: String,
    pub private_key: String,
    /// Decimal 128-bit randomness.
    pub randomness: String,
    pub max_epoch: Epoch,
    pub nonce: String,
}

impl EphemeralKeyData {
    /// Encode a freshly generated keypair into a record.
    pub fn from_keypair(kp: &KeyPair, randomness: String, max_epoch: Epoch, nonce: String) -> Self {
        Self {
            public_key: STANDARD.encode(kp.public.as_bytes()),
            private_key: STANDARD.encode(kp.private.0),
            randomness,
            max_epoch,
            nonce,
        }
    }

    pub fn public(&self) -> Result<PublicKey, StoreError> {
        let bytes = decode_key(&self.public_key, "public")?;
        PublicKey::from_slice(&bytes).map_err(|e| StoreError::InvalidKey(e.to_string()))
    }

    /// Reconstruct the signing keypair. The stored public key must match the
    /// one implied by the private key.
    pub fn keypair(&self) -> Result<KeyPair, StoreError> {
        let mut bytes = decode_key(&self.private_key, "private")?;
        let private = PrivateKey::from_slice(&bytes);
        bytes.zeroize();
        let private = private.map_err(|e| StoreError::InvalidKey(e.to_string()))?;
        let kp = zkvote_crypto::keypair_from_private(private);
        if kp.public != self.public()? {
            return Err(StoreError::InvalidKey(
                "public key does not match private key".into(),
            ));
        }
        Ok(kp)
    }

    /// The public key as a big-endian decimal integer, the form the proving
    /// service expects.
    pub fn extended_public_key(&self) -> Result<String, StoreError> {
        Ok(zkvote_crypto::bytes_to_decimal(self.public()?.as_bytes()))
    }

    /// Recompute the nonce from the stored key, epoch bound and randomness.
    pub fn expected_nonce(&self) -> Result<String, StoreError> {
        Ok(zkvote_crypto::compute_nonce(
            &self.public()?,
            self.max_epoch,
            &self.randomness,
        )?)
    }
}

impl fmt::Debug for EphemeralKeyData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralKeyData")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("randomness", &self.randomness)
            .field("max_epoch", &self.max_epoch)
            .field("nonce", &self.nonce)
            .finish()
    }
}

impl Drop for EphemeralKeyData {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

fn decode_key(encoded: &str, which: &str) -> Result<Vec<u8>, StoreError> {
    STANDARD
        .decode(encoded)
        .map_err(|e| StoreError::InvalidKey(format!("{which} key is not base64: {e}")))
}

/// User data stored once the salt is resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub subject: String,
    pub salt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,
    /// `salt` is the fallback placeholder, not the subject's issued salt.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub placeholder_salt: bool,
}

/// The single locally persisted record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub ephemeral: EphemeralKeyData,
    #[serde(default)]
    pub user: Option<UserRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> EphemeralKeyData {
        let kp = zkvote_crypto::keypair_from_seed(&[5u8; 32]);
        let nonce = zkvote_crypto::compute_nonce(&kp.public, 12, "77").unwrap();
        EphemeralKeyData::from_keypair(&kp, "77".into(), 12, nonce)
    }

    #[test]
    fn keypair_roundtrips_through_base64() {
        let kp = zkvote_crypto::keypair_from_seed(&[5u8; 32]);
        let restored = data().keypair().unwrap();
        assert_eq!(restored.public, kp.public);
        assert_eq!(restored.private.0, kp.private.0);
    }

    #[test]
    fn mismatched_public_key_rejected() {
        let mut d = data();
        d.public_key = STANDARD.encode([1u8; 32]);
        assert!(matches!(d.keypair(), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn expected_nonce_matches_stored() {
        let d = data();
        assert_eq!(d.expected_nonce().unwrap(), d.nonce);
    }

    #[test]
    fn extended_public_key_is_decimal() {
        let ext = data().extended_public_key().unwrap();
        assert!(zkvote_crypto::parse_decimal(&ext).is_some());
    }

    #[test]
    fn debug_redacts_private_key() {
        let d = data();
        let dbg = format!("{d:?}");
        assert!(dbg.contains("<redacted>"));
        assert!(!dbg.contains(&d.private_key));
    }

    #[test]
    fn json_uses_camel_case() {
        let json = serde_json::to_value(data()).unwrap();
        assert!(json.get("publicKey").is_some());
        assert!(json.get("maxEpoch").is_some());
    }
}
