//! Proof request and proof artifact wire types.

use serde::{Deserialize, Serialize};
use zkvote_types::Epoch;

/// Claim the proof discloses as the stable user identifier.
pub const KEY_CLAIM_NAME: &str = "sub";

/// Body sent to the proving service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRequest {
    pub jwt: String,
    pub extended_ephemeral_public_key: String,
    pub jwt_randomness: String,
    pub max_epoch: Epoch,
    pub salt: String,
    pub key_claim_name: String,
}

impl ProofRequest {
    pub fn new(
        extended_ephemeral_public_key: impl Into<String>,
        jwt: impl Into<String>,
        jwt_randomness: impl Into<String>,
        max_epoch: Epoch,
        salt: impl Into<String>,
    ) -> Self {
        Self {
            jwt: jwt.into(),
            extended_ephemeral_public_key: extended_ephemeral_public_key.into(),
            jwt_randomness: jwt_randomness.into(),
            max_epoch,
            salt: salt.into(),
            key_claim_name: KEY_CLAIM_NAME.to_string(),
        }
    }
}

/// Groth16 proof points, as decimal strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofPoints {
    pub a: Vec<String>,
    pub b: Vec<Vec<String>>,
    pub c: Vec<String>,
}

/// The base64 `iss` claim slice the proof commits to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssBase64Details {
    pub value: String,
    pub index_mod_4: u8,
}

/// A proof returned by the proving service. Opaque beyond these fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZkProofArtifact {
    pub proof_points: ProofPoints,
    pub iss_base64_details: IssBase64Details,
    pub header_base64: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_names() {
        let req = ProofRequest::new("123", "a.b.c", "456", 10, "42");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["extendedEphemeralPublicKey"], "123");
        assert_eq!(json["jwtRandomness"], "456");
        assert_eq!(json["maxEpoch"], 10);
        assert_eq!(json["salt"], "42");
        assert_eq!(json["keyClaimName"], "sub");
    }

    #[test]
    fn artifact_parses_prover_output() {
        let json = r#"{
            "proofPoints": {"a": ["1","2","1"], "b": [["1","2"],["3","4"],["1","0"]], "c": ["5","6","1"]},
            "issBase64Details": {"value": "yJpc3MiOiJodHRwczovL2lkLnR3aXRjaC50di9vYXV0aDIiLC", "indexMod4": 2},
            "headerBase64": "eyJhbGciOiJSUzI1NiJ9"
        }"#;
        let artifact: ZkProofArtifact = serde_json::from_str(json).unwrap();
        assert_eq!(artifact.proof_points.b.len(), 3);
        assert_eq!(artifact.iss_base64_details.index_mod_4, 2);
        assert_eq!(artifact.header_base64, "eyJhbGciOiJSUzI1NiJ9");
    }
}
