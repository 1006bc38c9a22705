//! Nullable prover: returns a fixed artifact or fails, records requests.

use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::Notify;
use zkvote_prover::{
    IssBase64Details, ProofPoints, ProofProvider, ProofRequest, ProverError, ZkProofArtifact,
};

pub struct NullProver {
    artifact: Mutex<Option<ZkProofArtifact>>,
    requests: Mutex<Vec<ProofRequest>>,
    /// When set, each request waits for one `release()`.
    gate: Option<Notify>,
}

impl NullProver {
    /// Answers every request with [`NullProver::sample_artifact`].
    pub fn new() -> Self {
        Self {
            artifact: Mutex::new(Some(Self::sample_artifact())),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Fails every request with `ProofUnavailable`.
    pub fn unavailable() -> Self {
        Self {
            artifact: Mutex::new(None),
            ..Self::new()
        }
    }

    /// Like `new`, but each request blocks until `release()` is called.
    pub fn gated() -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::new()
        }
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn sample_artifact() -> ZkProofArtifact {
        ZkProofArtifact {
            proof_points: ProofPoints {
                a: vec!["1".into(), "2".into(), "1".into()],
                b: vec![
                    vec!["3".into(), "4".into()],
                    vec!["5".into(), "6".into()],
                    vec!["1".into(), "0".into()],
                ],
                c: vec!["7".into(), "8".into(), "1".into()],
            },
            iss_base64_details: IssBase64Details {
                value: "wiaXNzIjoiaHR0cHM6Ly9hY2NvdW50cy5nb29nbGUuY29tIiw".into(),
                index_mod_4: 1,
            },
            header_base64: "eyJhbGciOiJSUzI1NiJ9".into(),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProofRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for NullProver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProofProvider for NullProver {
    async fn request_proof(&self, request: &ProofRequest) -> Result<ZkProofArtifact, ProverError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.artifact
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ProverError::ProofUnavailable("null prover has no proof".into()))
    }
}
