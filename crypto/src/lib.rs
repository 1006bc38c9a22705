//! Cryptographic primitives for zkvote.
//!
//! - **Ed25519** for the ephemeral session key (signing and verification)
//! - **Blake2b** for hashing (intent digests, token fingerprints, addresses)
//! - **HMAC-SHA256** for the address seed binding salt, claim and audience
//! - Nonce commitment binding the ephemeral key to the identity token
//! - Decimal big-integer helpers for salts, randomness and extended keys

pub mod address;
pub mod address_seed;
pub mod bigint;
pub mod error;
pub mod hash;
pub mod keys;
pub mod nonce;
pub mod sign;

pub use address::{
    derive_address, derive_address_for_claims, KEY_CLAIM_NAME, ZKLOGIN_SIGNATURE_FLAG,
};
pub use address_seed::{gen_address_seed, AddressSeed};
pub use bigint::{bytes_to_decimal, generate_randomness, parse_decimal};
pub use error::CryptoError;
pub use hash::{blake2b_256, blake2b_256_multi, intent_digest, token_fingerprint};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use nonce::compute_nonce;
pub use sign::{sign_message, verify_signature};
