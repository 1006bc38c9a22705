//! Blake2b hashing for intent digests, token fingerprints and addresses.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

/// Intent prefix prepended to transaction bytes before signing:
/// (scope = transaction data, version = 0, app = ledger).
pub const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Digest that the ephemeral key signs for a transaction.
pub fn intent_digest(tx_bytes: &[u8]) -> [u8; 32] {
    blake2b_256_multi(&[&TRANSACTION_INTENT, tx_bytes])
}

/// Fingerprint of a raw identity token, used as a cache key so the token
/// itself never has to be held in a map.
pub fn token_fingerprint(token_raw: &str) -> [u8; 32] {
    blake2b_256(token_raw.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blake2b_deterministic() {
        assert_eq!(blake2b_256(b"hello zkvote"), blake2b_256(b"hello zkvote"));
    }

    #[test]
    fn blake2b_different_inputs() {
        assert_ne!(blake2b_256(b"hello"), blake2b_256(b"world"));
    }

    #[test]
    fn blake2b_multi_equivalent() {
        let single = blake2b_256(b"helloworld");
        let multi = blake2b_256_multi(&[b"hello", b"world"]);
        assert_eq!(single, multi);
    }

    #[test]
    fn blake2b_empty_known_vector() {
        assert_eq!(
            hex::encode(blake2b_256(b"")),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
    }

    #[test]
    fn intent_digest_prefixes_bytes() {
        assert_eq!(intent_digest(b"tx"), blake2b_256(&[0, 0, 0, b't', b'x']));
    }
}
