//! Proof cache.
//!
//! A proof is valid only for the exact (ephemeral key, max epoch, salt,
//! token) tuple it was produced for. The cache keeps the proof for the most
//! recent tuple and drops it as soon as a request for any other tuple comes
//! in.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use zkvote_types::Epoch;

use crate::{ProofProvider, ProofRequest, ProverError, ZkProofArtifact};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProofCacheKey {
    pub extended_public_key: String,
    pub max_epoch: Epoch,
    pub salt: String,
    /// Blake2b-256 of the raw token, so the token itself is not retained.
    pub token_fingerprint: [u8; 32],
}

impl ProofCacheKey {
    pub fn for_request(request: &ProofRequest) -> Self {
        Self {
            extended_public_key: request.extended_ephemeral_public_key.clone(),
            max_epoch: request.max_epoch,
            salt: request.salt.clone(),
            token_fingerprint: zkvote_crypto::token_fingerprint(&request.jwt),
        }
    }
}

pub struct CachingProver {
    inner: Arc<dyn ProofProvider>,
    entry: Mutex<Option<(ProofCacheKey, ZkProofArtifact)>>,
}

impl CachingProver {
    pub fn new(inner: Arc<dyn ProofProvider>) -> Self {
        Self {
            inner,
            entry: Mutex::new(None),
        }
    }

    fn lookup(&self, key: &ProofCacheKey) -> Option<ZkProofArtifact> {
        let mut entry = self.entry.lock().ok()?;
        let stale = match entry.as_ref() {
            Some((cached_key, artifact)) if cached_key == key => return Some(artifact.clone()),
            Some(_) => true,
            None => false,
        };
        if stale {
            tracing::debug!("proof inputs changed, dropping cached proof");
            *entry = None;
        }
        None
    }

    fn store(&self, key: ProofCacheKey, artifact: ZkProofArtifact) {
        if let Ok(mut entry) = self.entry.lock() {
            *entry = Some((key, artifact));
        }
    }

    pub fn is_cached(&self, request: &ProofRequest) -> bool {
        let key = ProofCacheKey::for_request(request);
        self.entry
            .lock()
            .map(|e| matches!(e.as_ref(), Some((k, _)) if *k == key))
            .unwrap_or(false)
    }

    pub fn invalidate(&self) {
        if let Ok(mut entry) = self.entry.lock() {
            *entry = None;
        }
    }
}

#[async_trait]
impl ProofProvider for CachingProver {
    async fn request_proof(&self, request: &ProofRequest) -> Result<ZkProofArtifact, ProverError> {
        let key = ProofCacheKey::for_request(request);
        if let Some(artifact) = self.lookup(&key) {
            tracing::debug!(max_epoch = request.max_epoch, "proof cache hit");
            return Ok(artifact);
        }
        let artifact = self.inner.request_proof(request).await?;
        self.store(key, artifact.clone());
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IssBase64Details, ProofPoints};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingProver {
        calls: AtomicU32,
    }

    #[async_trait]
    impl ProofProvider for CountingProver {
        async fn request_proof(&self, _: &ProofRequest) -> Result<ZkProofArtifact, ProverError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ZkProofArtifact {
                proof_points: ProofPoints {
                    a: vec![n.to_string()],
                    b: vec![],
                    c: vec![],
                },
                iss_base64_details: IssBase64Details {
                    value: "iss".into(),
                    index_mod_4: 0,
                },
                header_base64: "hdr".into(),
            })
        }
    }

    fn setup() -> (Arc<CountingProver>, CachingProver) {
        let inner = Arc::new(CountingProver {
            calls: AtomicU32::new(0),
        });
        let caching = CachingProver::new(inner.clone());
        (inner, caching)
    }

    fn request() -> ProofRequest {
        ProofRequest::new("123", "a.b.c", "456", 10, "42")
    }

    #[tokio::test]
    async fn identical_inputs_reuse_proof() {
        let (inner, caching) = setup();
        let first = caching.request_proof(&request()).await.unwrap();
        let second = caching.request_proof(&request()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert!(caching.is_cached(&request()));
    }

    #[tokio::test]
    async fn any_changed_input_refetches() {
        let (inner, caching) = setup();
        caching.request_proof(&request()).await.unwrap();

        let mut changed = vec![request(), request(), request(), request()];
        changed[0].extended_ephemeral_public_key = "999".into();
        changed[1].max_epoch = 11;
        changed[2].salt = "43".into();
        changed[3].jwt = "x.y.z".into();

        for (i, req) in changed.iter().enumerate() {
            caching.request_proof(req).await.unwrap();
            assert_eq!(inner.calls.load(Ordering::SeqCst), i as u32 + 2);
        }
        // The original tuple was evicted.
        assert!(!caching.is_cached(&request()));
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let (inner, caching) = setup();
        caching.request_proof(&request()).await.unwrap();
        caching.invalidate();
        caching.request_proof(&request()).await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
