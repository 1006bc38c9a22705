//! Proof acquisition.
//!
//! The proof binds the ephemeral public key, the epoch bound and the
//! randomness committed to in the token nonce to the identity claim and the
//! salt. It is produced by a remote proving service; this crate only asks
//! for it and caches it.

pub mod artifact;
pub mod cache;
pub mod client;
pub mod error;

pub use artifact::{
    IssBase64Details, ProofPoints, ProofRequest, ZkProofArtifact, KEY_CLAIM_NAME,
};
pub use cache::{CachingProver, ProofCacheKey};
pub use client::{ProofProvider, ProverClient, ProverConfig, ProverMode};
pub use error::ProverError;
