//! HTTP client for the proving service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use zkvote_utils::RetryPolicy;

use crate::{ProofRequest, ProverError, ZkProofArtifact};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Produces proofs for proof requests.
#[async_trait]
pub trait ProofProvider: Send + Sync {
    async fn request_proof(&self, request: &ProofRequest) -> Result<ZkProofArtifact, ProverError>;
}

/// How the endpoint answers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProverMode {
    /// The proving service itself; the body is the artifact.
    #[default]
    Direct,
    /// The internal proof proxy; the body is `{ "zkp": artifact }`.
    Proxy,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProverConfig {
    #[serde(default = "default_prover_url")]
    pub url: String,
    #[serde(default)]
    pub mode: ProverMode,
    /// Proof generation is slow; the per-call timeout is generous.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_prover_url() -> String {
    "https://prover-dev.mystenlabs.com/v1".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            url: default_prover_url(),
            mode: ProverMode::default(),
            timeout_secs: default_timeout_secs(),
            retry: RetryPolicy::default(),
        }
    }
}

pub struct ProverClient {
    http_client: reqwest::Client,
    endpoint: String,
    mode: ProverMode,
    retry: RetryPolicy,
}

impl ProverClient {
    pub fn new(config: &ProverConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            endpoint: config.url.clone(),
            mode: config.mode,
            retry: config.retry.clone(),
        }
    }

    /// Client talking to the proving service directly.
    pub fn direct(endpoint: impl Into<String>) -> Self {
        Self::new(&ProverConfig {
            url: endpoint.into(),
            mode: ProverMode::Direct,
            ..ProverConfig::default()
        })
    }

    /// Client talking to the internal proof proxy.
    pub fn via_proxy(endpoint: impl Into<String>) -> Self {
        Self::new(&ProverConfig {
            url: endpoint.into(),
            mode: ProverMode::Proxy,
            ..ProverConfig::default()
        })
    }

    async fn request_once(&self, request: &ProofRequest) -> Result<ZkProofArtifact, ProverError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(ProverError::from_reqwest)?;

        let status = response.status();
        if status.is_server_error() {
            return Err(ProverError::Unreachable(format!("HTTP status {status}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProverError::Rejected(format!("HTTP status {status}: {body}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProverError::ProofUnavailable(format!("undecodable response: {e}")))?;
        artifact_from_body(self.mode, body)
    }
}

/// Extract the artifact from a response body according to the endpoint mode.
pub(crate) fn artifact_from_body(
    mode: ProverMode,
    body: Value,
) -> Result<ZkProofArtifact, ProverError> {
    let payload = match mode {
        ProverMode::Direct => body,
        ProverMode::Proxy => match body.get("zkp") {
            Some(zkp) if !zkp.is_null() => zkp.clone(),
            _ => {
                return Err(ProverError::ProofUnavailable(
                    "response carries no zkp payload".into(),
                ))
            }
        },
    };
    serde_json::from_value(payload)
        .map_err(|e| ProverError::ProofUnavailable(format!("malformed proof: {e}")))
}

#[async_trait]
impl ProofProvider for ProverClient {
    async fn request_proof(&self, request: &ProofRequest) -> Result<ZkProofArtifact, ProverError> {
        tracing::debug!(
            max_epoch = request.max_epoch,
            endpoint = %self.endpoint,
            "requesting proof"
        );
        let this = self;
        self.retry
            .run("prover", ProverError::is_retryable, move || {
                this.request_once(request)
            })
            .await
            .map_err(|e| match e {
                ProverError::ProofUnavailable(_) => e,
                other => ProverError::ProofUnavailable(other.to_string()),
            })
    }
}
