//! Unsigned identity tokens for tests.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::json;

/// Build a compact token with the given claims. The header and signature
/// segments are fixed placeholders.
pub fn fake_id_token(iss: &str, aud: &str, sub: &str, nonce: &str) -> String {
    let payload = json!({
        "iss": iss,
        "aud": aud,
        "sub": sub,
        "nonce": nonce,
        "iat": 1_700_000_000u64,
        "exp": 4_000_000_000u64,
    });
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload.to_string()),
        URL_SAFE_NO_PAD.encode("unsigned"),
    )
}
