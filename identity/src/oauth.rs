//! OpenID implicit-flow helpers: the provider redirect and the callback.

use serde::{Deserialize, Serialize};

use crate::IdentityError;

/// An OpenID provider the user can log in with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthProvider {
    /// Authorization endpoint, e.g. `https://accounts.google.com/o/oauth2/v2/auth`.
    pub authorization_endpoint: String,
    pub client_id: String,
    pub redirect_uri: String,
}

impl OAuthProvider {
    pub fn google(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            authorization_endpoint: "https://accounts.google.com/o/oauth2/v2/auth".into(),
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
        }
    }
}

/// Build the login URL that asks the provider for an identity token bound to
/// `nonce`.
pub fn authorization_url(provider: &OAuthProvider, nonce: &str) -> String {
    let params = [
        ("client_id", provider.client_id.as_str()),
        ("response_type", "id_token"),
        ("redirect_uri", provider.redirect_uri.as_str()),
        ("scope", "openid"),
        ("nonce", nonce),
    ];
    let query = params
        .iter()
        .map(|(k, v)| format!("{k}={}", percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{query}", provider.authorization_endpoint)
}

/// Extract the `id_token` from a redirect URL, its fragment, or a bare
/// query string.
pub fn token_from_callback(callback: &str) -> Result<String, IdentityError> {
    let params = match callback.split_once('#') {
        Some((_, fragment)) => fragment,
        None => callback
            .split_once('?')
            .map(|(_, query)| query)
            .unwrap_or(callback),
    };
    params
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "id_token")
        .map(|(_, value)| percent_decode(value))
        .filter(|token| !token.is_empty())
        .ok_or(IdentityError::MissingToken)
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|h| u8::from_str_radix(h, 16).ok());
            if let Some(b) = decoded {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
