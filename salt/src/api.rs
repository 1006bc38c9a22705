//! Wire types and client for the internal salt endpoints.
//!
//! `POST /api/userinfo/get/salt` answers with an envelope
//! `{status, statusText, data}`; on success `data` is `{subject, salt}`, on a
//! malformed body the status is 422 and `data` is the empty string.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::{SaltError, SaltProvider, SaltSource, UserSalt, PLACEHOLDER_SALT};

pub const SALT_LOOKUP_PATH: &str = "/api/userinfo/get/salt";
pub const STORE_USER_PATH: &str = "/api/userinfo/store";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Response envelope of the internal API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: u16,
    #[serde(rename = "statusText")]
    pub status_text: String,
    pub data: T,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: 200,
            status_text: "OK".to_string(),
            data,
        }
    }
}

impl ApiEnvelope<String> {
    /// Envelope for a request whose body could not be understood.
    pub fn validation_failure(diagnostic: impl Into<String>) -> Self {
        Self {
            status: 422,
            status_text: diagnostic.into(),
            data: String::new(),
        }
    }
}

/// Body of a salt lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaltLookupRequest {
    pub subject: String,
    pub jwt: String,
}

impl SaltLookupRequest {
    /// Parse and validate a raw request body. `subject` and `jwt` must both
    /// be present and non-empty strings.
    pub fn parse(body: &[u8]) -> Result<Self, SaltError> {
        let request: Self = parse_body(body)?;
        if request.subject.is_empty() {
            return Err(SaltError::RequestValidation("subject is empty".into()));
        }
        if request.jwt.is_empty() {
            return Err(SaltError::RequestValidation("jwt is empty".into()));
        }
        Ok(request)
    }
}

/// Body of a user-record store request. The `jwt` must be the subject's
/// identity token; the service checks its `sub` claim against `subject`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreUserRequest {
    pub subject: String,
    pub salt: String,
    pub jwt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral_public_key: Option<String>,
}

impl StoreUserRequest {
    pub fn parse(body: &[u8]) -> Result<Self, SaltError> {
        let request: Self = parse_body(body)?;
        if request.subject.is_empty() {
            return Err(SaltError::RequestValidation("subject is empty".into()));
        }
        if request.jwt.is_empty() {
            return Err(SaltError::RequestValidation("jwt is empty".into()));
        }
        if zkvote_crypto::parse_decimal(&request.salt).is_none() {
            return Err(SaltError::InvalidSalt(request.salt));
        }
        Ok(request)
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, SaltError> {
    serde_json::from_slice(body).map_err(|e| SaltError::RequestValidation(e.to_string()))
}

/// Records a subject's salt with a salt service.
#[async_trait]
pub trait UserRegistry: Send + Sync {
    async fn store_user(&self, request: &StoreUserRequest) -> Result<(), SaltError>;
}

/// Client for the internal salt endpoints of a running zkvote service.
pub struct SaltApiClient {
    http_client: reqwest::Client,
    base_url: String,
    /// The service's placeholder salt; answers equal to it are reported as
    /// [`SaltSource::Placeholder`].
    placeholder_salt: String,
}

impl SaltApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            placeholder_salt: PLACEHOLDER_SALT.to_string(),
        }
    }

    pub fn with_placeholder_salt(mut self, salt: impl Into<String>) -> Self {
        self.placeholder_salt = salt.into();
        self
    }

    /// Look up the salt for `subject` through the internal endpoint.
    pub async fn lookup(&self, subject: &str, token_raw: &str) -> Result<UserSalt, SaltError> {
        let request = SaltLookupRequest {
            subject: subject.to_string(),
            jwt: token_raw.to_string(),
        };
        let envelope = self.post(SALT_LOOKUP_PATH, &request).await?;
        match envelope.status {
            200 => serde_json::from_value(envelope.data)
                .map_err(|e| SaltError::InvalidResponse(format!("salt lookup data: {e}"))),
            422 => Err(SaltError::RequestValidation(envelope.status_text)),
            503 => Err(SaltError::SaltUnavailable(envelope.status_text)),
            other => Err(SaltError::RequestFailed(format!(
                "status {other}: {}",
                envelope.status_text
            ))),
        }
    }

    /// POST a JSON body and decode the envelope, whatever the HTTP status.
    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiEnvelope<Value>, SaltError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(SaltError::from_reqwest)?;
        let status = response.status();
        response.json().await.map_err(|e| {
            SaltError::InvalidResponse(format!("HTTP status {status}, undecodable envelope: {e}"))
        })
    }
}

#[async_trait]
impl SaltProvider for SaltApiClient {
    async fn salt_with_source(
        &self,
        subject: &str,
        token_raw: &str,
    ) -> Result<(UserSalt, SaltSource), SaltError> {
        let salt = self.lookup(subject, token_raw).await?;
        let source = if salt.salt == self.placeholder_salt {
            SaltSource::Placeholder
        } else {
            SaltSource::Issuer
        };
        Ok((salt, source))
    }
}

#[async_trait]
impl UserRegistry for SaltApiClient {
    /// Write a user's salt into the service's cache. A subject that already
    /// holds a different salt is answered with 409.
    async fn store_user(&self, request: &StoreUserRequest) -> Result<(), SaltError> {
        let envelope = self.post(STORE_USER_PATH, request).await?;
        match envelope.status {
            200 => Ok(()),
            409 => Err(SaltError::Conflict(envelope.status_text)),
            422 => Err(SaltError::RequestValidation(envelope.status_text)),
            other => Err(SaltError::RequestFailed(format!(
                "status {other}: {}",
                envelope.status_text
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_request_requires_both_fields() {
        assert!(SaltLookupRequest::parse(br#"{"subject":"abc","jwt":"a.b.c"}"#).is_ok());
        for body in [
            &br#"{"jwt":"a.b.c"}"#[..],
            br#"{"subject":"abc"}"#,
            br#"{"subject":"","jwt":"a.b.c"}"#,
            br#"{"subject":"abc","jwt":""}"#,
            br#"{"subject":1,"jwt":"a.b.c"}"#,
            b"not json",
            b"",
        ] {
            assert!(
                matches!(
                    SaltLookupRequest::parse(body),
                    Err(SaltError::RequestValidation(_))
                ),
                "{:?} should be rejected",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn store_request_validates_salt() {
        let ok = StoreUserRequest::parse(
            br#"{"subject":"abc","salt":"42","jwt":"a.b.c","ephemeralPublicKey":"pk"}"#,
        )
        .unwrap();
        assert_eq!(ok.ephemeral_public_key.as_deref(), Some("pk"));
        assert!(matches!(
            StoreUserRequest::parse(br#"{"subject":"abc","salt":"0x2a","jwt":"a.b.c"}"#),
            Err(SaltError::InvalidSalt(_))
        ));
    }

    #[test]
    fn store_request_requires_token() {
        for body in [
            &br#"{"subject":"abc","salt":"42"}"#[..],
            br#"{"subject":"abc","salt":"42","jwt":""}"#,
        ] {
            assert!(matches!(
                StoreUserRequest::parse(body),
                Err(SaltError::RequestValidation(_))
            ));
        }
    }

    #[test]
    fn envelope_shapes() {
        let ok = serde_json::to_value(ApiEnvelope::ok(UserSalt {
            subject: "abc".into(),
            salt: "42".into(),
        }))
        .unwrap();
        assert_eq!(ok["status"], 200);
        assert_eq!(ok["statusText"], "OK");
        assert_eq!(ok["data"]["salt"], "42");

        let bad = serde_json::to_value(ApiEnvelope::validation_failure("missing field")).unwrap();
        assert_eq!(bad["status"], 422);
        assert_eq!(bad["data"], "");
    }
}
