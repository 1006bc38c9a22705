//! Decimal big-integer helpers.
//!
//! Salts, JWT randomness and extended public keys travel as decimal strings
//! of arbitrary width; these helpers parse and render them.

use num_bigint::BigUint;
use rand::rngs::OsRng;
use rand::RngCore;

/// Bytes of entropy in freshly generated JWT randomness.
const RANDOMNESS_BYTES: usize = 16;

/// Parse a strictly decimal, non-negative integer string.
///
/// Rejects empty input, signs, whitespace and any non-digit character.
pub fn parse_decimal(raw: &str) -> Option<BigUint> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::parse_bytes(raw.as_bytes(), 10)
}

/// Render big-endian bytes as a decimal integer string.
pub fn bytes_to_decimal(bytes: &[u8]) -> String {
    BigUint::from_bytes_be(bytes).to_str_radix(10)
}

/// Fresh 128-bit randomness for the nonce commitment, as a decimal string.
pub fn generate_randomness() -> String {
    let mut bytes = [0u8; RANDOMNESS_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes_to_decimal(&bytes)
}
