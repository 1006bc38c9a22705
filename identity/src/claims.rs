//! Identity token claims.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zkvote_types::{AccountAddress, Timestamp};

use crate::IdentityError;

/// The claims of a decoded identity token.
///
/// `jwt_raw` keeps the original compact token, which the salt issuer and the
/// proving service need verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub exp: u64,
    pub iat: u64,
    pub nonce: String,
    pub azp: Option<String>,
    pub nbf: Option<u64>,
    pub jti: Option<String>,
    pub jwt_raw: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Audience {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct RawClaims {
    iss: String,
    aud: Audience,
    sub: String,
    exp: u64,
    iat: u64,
    nonce: String,
    #[serde(default)]
    azp: Option<String>,
    #[serde(default)]
    nbf: Option<u64>,
    #[serde(default)]
    jti: Option<String>,
}

/// Decode a compact identity token into its claims.
///
/// The token must consist of three dot-separated base64url segments, and the
/// middle one must be a JSON object carrying `iss`, `aud`, `sub`, `exp`,
/// `iat` and `nonce`. The signature segment is not checked.
pub fn decode(token_raw: &str) -> Result<IdentityClaims, IdentityError> {
    let segments: Vec<&str> = token_raw.trim().split('.').collect();
    if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
        return Err(IdentityError::MalformedToken(format!(
            "expected 3 non-empty segments, found {}",
            segments.len()
        )));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(segments[1].trim_end_matches('='))
        .map_err(|e| IdentityError::MalformedToken(format!("payload is not base64url: {e}")))?;
    let raw: RawClaims = serde_json::from_slice(&payload)
        .map_err(|e| IdentityError::MalformedToken(format!("payload claims: {e}")))?;

    let aud = match raw.aud {
        Audience::One(aud) => aud,
        Audience::Many(list) => list
            .into_iter()
            .next()
            .ok_or_else(|| IdentityError::MalformedToken("empty aud array".into()))?,
    };

    Ok(IdentityClaims {
        iss: raw.iss,
        aud,
        sub: raw.sub,
        exp: raw.exp,
        iat: raw.iat,
        nonce: raw.nonce,
        azp: raw.azp,
        nbf: raw.nbf,
        jti: raw.jti,
        jwt_raw: token_raw.trim().to_string(),
    })
}

/// Check that the token's nonce is the one committed to by the local
/// ephemeral key.
pub fn verify_nonce(claims: &IdentityClaims, expected: &str) -> Result<(), IdentityError> {
    if claims.nonce != expected {
        tracing::warn!(sub = %claims.sub, "identity token nonce mismatch");
        return Err(IdentityError::NonceMismatch {
            expected: expected.to_string(),
            actual: claims.nonce.clone(),
        });
    }
    Ok(())
}

/// Whether the token has expired at `now`.
pub fn is_expired(claims: &IdentityClaims, now: Timestamp) -> bool {
    Timestamp::new(claims.exp).is_past(now)
}

/// Derive the account address for a raw token and the user's salt.
pub fn jwt_to_address(token_raw: &str, salt: &str) -> Result<AccountAddress, IdentityError> {
    let claims = decode(token_raw)?;
    let address =
        zkvote_crypto::derive_address_for_claims(&claims.iss, &claims.aud, &claims.sub, salt)?;
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkvote_crypto::CryptoError;

    fn token(payload: &str) -> String {
        format!(
            "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.{}.c2lnbmF0dXJl",
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    fn google_payload(aud: &str) -> String {
        format!(
            r#"{{"iss":"https://accounts.google.com","aud":{aud},"sub":"1234567890","exp":2000000000,"iat":1700000000,"nonce":"abc"}}"#
        )
    }

    #[test]
    fn decodes_string_audience() {
        let raw = token(&google_payload(r#""my-client-id""#));
        let claims = decode(&raw).unwrap();
        assert_eq!(claims.iss, "https://accounts.google.com");
        assert_eq!(claims.aud, "my-client-id");
        assert_eq!(claims.sub, "1234567890");
        assert_eq!(claims.nonce, "abc");
        assert_eq!(claims.jwt_raw, raw);
        assert!(claims.azp.is_none());
    }

    #[test]
    fn array_audience_uses_first_entry() {
        let raw = token(&google_payload(r#"["first","second"]"#));
        assert_eq!(decode(&raw).unwrap().aud, "first");
    }

    #[test]
    fn empty_audience_array_is_malformed() {
        let raw = token(&google_payload("[]"));
        assert!(matches!(decode(&raw), Err(IdentityError::MalformedToken(_))));
    }

    #[test]
    fn wrong_segment_count_is_malformed() {
        assert!(matches!(decode("a.b"), Err(IdentityError::MalformedToken(_))));
        assert!(matches!(decode("a.b.c.d"), Err(IdentityError::MalformedToken(_))));
        assert!(matches!(decode(""), Err(IdentityError::MalformedToken(_))));
    }

    #[test]
    fn non_json_payload_is_malformed() {
        let raw = format!("h.{}.s", URL_SAFE_NO_PAD.encode("not json"));
        assert!(matches!(decode(&raw), Err(IdentityError::MalformedToken(_))));
    }

    #[test]
    fn missing_claim_is_malformed() {
        let raw = token(r#"{"iss":"x","aud":"y","exp":1,"iat":1,"nonce":"n"}"#);
        assert!(matches!(decode(&raw), Err(IdentityError::MalformedToken(_))));
    }

    #[test]
    fn padded_payload_is_accepted() {
        let payload = google_payload(r#""a""#);
        let padded = base64::engine::general_purpose::URL_SAFE.encode(&payload);
        let raw = format!("h.{padded}.s");
        assert_eq!(decode(&raw).unwrap().aud, "a");
    }

    #[test]
    fn nonce_check() {
        let claims = decode(&token(&google_payload(r#""a""#))).unwrap();
        assert!(verify_nonce(&claims, "abc").is_ok());
        assert!(matches!(
            verify_nonce(&claims, "other"),
            Err(IdentityError::NonceMismatch { .. })
        ));
    }

    #[test]
    fn expiry() {
        let claims = decode(&token(&google_payload(r#""a""#))).unwrap();
        assert!(!is_expired(&claims, Timestamp::new(1_999_999_999)));
        assert!(is_expired(&claims, Timestamp::new(2_000_000_000)));
    }

    #[test]
    fn address_from_token_matches_known_value() {
        let raw = token(&google_payload(r#""my-client-id""#));
        let addr = jwt_to_address(&raw, "129390038577185583942388216820280642146").unwrap();
        assert_eq!(
            addr.to_string(),
            "0x4b0cc537af5f2159824f4fcab2be5584bfc4c18fb93a8d33df59e5070432ac18"
        );
    }

    #[test]
    fn address_from_token_rejects_bad_salt() {
        let raw = token(&google_payload(r#""my-client-id""#));
        assert!(matches!(
            jwt_to_address(&raw, "0xcafecafe"),
            Err(IdentityError::Derivation(CryptoError::InvalidSalt(_)))
        ));
    }
}
