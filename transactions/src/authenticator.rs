//! The composite zero-knowledge authorization attached to a transaction.
//!
//! bytes = 0x05 ‖ bincode{ inputs (proof + address seed), max_epoch,
//!                         user_signature (0x00 ‖ ed25519 sig ‖ pk) }

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zkvote_crypto::{AddressSeed, ZKLOGIN_SIGNATURE_FLAG};
use zkvote_prover::{IssBase64Details, ProofPoints, ZkProofArtifact};
use zkvote_types::{Epoch, PublicKey, Signature};

use crate::TxError;

/// Signature scheme flag of a plain Ed25519 signature.
pub const ED25519_FLAG: u8 = 0x00;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkLoginInputs {
    pub proof_points: ProofPoints,
    pub iss_base64_details: IssBase64Details,
    pub header_base64: String,
    /// Address seed as a decimal integer.
    pub address_seed: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkLoginAuthenticator {
    pub inputs: ZkLoginInputs,
    pub max_epoch: Epoch,
    pub user_signature: Vec<u8>,
}

impl ZkLoginAuthenticator {
    pub fn new(
        proof: &ZkProofArtifact,
        address_seed: &AddressSeed,
        max_epoch: Epoch,
        user_signature: Vec<u8>,
    ) -> Self {
        Self {
            inputs: ZkLoginInputs {
                proof_points: proof.proof_points.clone(),
                iss_base64_details: proof.iss_base64_details.clone(),
                header_base64: proof.header_base64.clone(),
                address_seed: address_seed.to_decimal(),
            },
            max_epoch,
            user_signature,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TxError> {
        let body = bincode::serialize(self)
            .map_err(|e| TxError::Signing(format!("cannot encode authorization: {e}")))?;
        let mut bytes = Vec::with_capacity(body.len() + 1);
        bytes.push(ZKLOGIN_SIGNATURE_FLAG);
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    pub fn to_base64(&self) -> Result<String, TxError> {
        Ok(STANDARD.encode(self.to_bytes()?))
    }
}

/// Serialized ephemeral signature: `0x00 ‖ sig ‖ pk`.
pub fn user_signature(signature: &Signature, public_key: &PublicKey) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + 64 + 32);
    out.push(ED25519_FLAG);
    out.extend_from_slice(signature.as_bytes());
    out.extend_from_slice(public_key.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proof() -> ZkProofArtifact {
        ZkProofArtifact {
            proof_points: ProofPoints {
                a: vec!["1".into()],
                b: vec![vec!["2".into()]],
                c: vec!["3".into()],
            },
            iss_base64_details: IssBase64Details {
                value: "iss".into(),
                index_mod_4: 1,
            },
            header_base64: "hdr".into(),
        }
    }

    #[test]
    fn user_signature_layout() {
        let sig = Signature([3u8; 64]);
        let pk = PublicKey([4u8; 32]);
        let bytes = user_signature(&sig, &pk);
        assert_eq!(bytes.len(), 97);
        assert_eq!(bytes[0], 0x00);
        assert_eq!(&bytes[1..65], &[3u8; 64][..]);
        assert_eq!(&bytes[65..], &[4u8; 32][..]);
    }

    #[test]
    fn authorization_is_flagged_and_decodable() {
        let seed = zkvote_crypto::gen_address_seed("42", "sub", "abc", "aud").unwrap();
        let auth = ZkLoginAuthenticator::new(&proof(), &seed, 9, vec![0, 1, 2]);
        let bytes = auth.to_bytes().unwrap();
        assert_eq!(bytes[0], 0x05);

        let decoded: ZkLoginAuthenticator = bincode::deserialize(&bytes[1..]).unwrap();
        assert_eq!(decoded, auth);
        assert_eq!(decoded.inputs.address_seed, seed.to_decimal());
        assert_eq!(decoded.max_epoch, 9);
    }
}
