//! Client for the remote salt-issuance service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::SaltError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Issues the salt for the subject of an identity token.
#[async_trait]
pub trait SaltIssuer: Send + Sync {
    /// Ask the issuer for the salt of the token's subject.
    async fn issue(&self, token_raw: &str) -> Result<String, SaltError>;
}

#[derive(Serialize)]
struct IssueRequest<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
struct IssueResponse {
    #[serde(default)]
    salt: Option<Value>,
}

/// HTTP salt issuer: `POST {endpoint} {"token": ...}` → `{"salt": ...}`.
pub struct SaltIssuerClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl SaltIssuerClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SaltIssuer for SaltIssuerClient {
    async fn issue(&self, token_raw: &str) -> Result<String, SaltError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&IssueRequest { token: token_raw })
            .send()
            .await
            .map_err(SaltError::from_reqwest)?;

        let status = response.status();
        if status.is_server_error() {
            return Err(SaltError::Unreachable(format!("HTTP status {status}")));
        }
        if !status.is_success() {
            return Err(SaltError::RequestFailed(format!("HTTP status {status}")));
        }

        let body: IssueResponse = response.json().await.map_err(|e| {
            SaltError::InvalidResponse(format!("failed to parse salt response: {e}"))
        })?;
        salt_from_value(body.salt)
    }
}

/// Issuers render the salt either as a JSON string or a bare number.
fn salt_from_value(value: Option<Value>) -> Result<String, SaltError> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        None | Some(Value::Null) | Some(Value::String(_)) => Err(SaltError::MissingSalt),
        Some(other) => Err(SaltError::InvalidResponse(format!(
            "unexpected salt value: {other}"
        ))),
    }
}
