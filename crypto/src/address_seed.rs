//! Address seed: binds a user's salt to one claim of one audience.
//!
//! seed = HMAC-SHA256(key = salt as big-endian bytes,
//!                    msg = len‖claim_name ‖ len‖claim_value ‖ len‖audience)
//!
//! Each field is prefixed with its byte length as a big-endian u32 so that
//! field boundaries cannot be shifted. The proving backend and the address
//! derivation must use the same seed, so the construction is fixed.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;

use crate::bigint::{bytes_to_decimal, parse_decimal};
use crate::CryptoError;

type HmacSha256 = Hmac<Sha256>;

/// 32-byte address seed. Rendered as a decimal integer on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressSeed([u8; 32]);

impl AddressSeed {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Decimal rendering used inside the composite authorization.
    pub fn to_decimal(&self) -> String {
        bytes_to_decimal(&self.0)
    }
}

impl fmt::Display for AddressSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl fmt::Debug for AddressSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AddressSeed({})", self.to_decimal())
    }
}

/// Compute the address seed for `(salt, claim_name, claim_value, audience)`.
///
/// `salt` must be a non-negative decimal integer string.
pub fn gen_address_seed(
    salt: &str,
    claim_name: &str,
    claim_value: &str,
    audience: &str,
) -> Result<AddressSeed, CryptoError> {
    let salt_value = parse_decimal(salt).ok_or_else(|| CryptoError::InvalidSalt(salt.into()))?;

    let mut mac = HmacSha256::new_from_slice(&salt_value.to_bytes_be())
        .map_err(|e| CryptoError::Derivation(e.to_string()))?;
    for field in [claim_name, claim_value, audience] {
        mac.update(&(field.len() as u32).to_be_bytes());
        mac.update(field.as_bytes());
    }

    let mut seed = [0u8; 32];
    seed.copy_from_slice(&mac.finalize().into_bytes());
    Ok(AddressSeed(seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT: &str = "129390038577185583942388216820280642146";

    #[test]
    fn golden_seed_for_known_inputs() {
        let seed = gen_address_seed(SALT, "sub", "1234567890", "my-client-id").unwrap();
        assert_eq!(
            seed.to_decimal(),
            "96750504030486344226536154085641293182921436568496058884560981562500186348579"
        );
        // Repeated invocations agree.
        let again = gen_address_seed(SALT, "sub", "1234567890", "my-client-id").unwrap();
        assert_eq!(seed, again);
    }

    #[test]
    fn every_input_changes_the_seed() {
        let base = gen_address_seed(SALT, "sub", "1234567890", "my-client-id").unwrap();
        let other_salt = gen_address_seed("1", "sub", "1234567890", "my-client-id").unwrap();
        let other_name = gen_address_seed(SALT, "email", "1234567890", "my-client-id").unwrap();
        let other_sub = gen_address_seed(SALT, "sub", "1234567891", "my-client-id").unwrap();
        let other_aud = gen_address_seed(SALT, "sub", "1234567890", "other-client").unwrap();
        for seed in [other_salt, other_name, other_sub, other_aud] {
            assert_ne!(seed, base);
        }
    }

    #[test]
    fn field_boundaries_are_unambiguous() {
        let a = gen_address_seed(SALT, "sub", "ab", "c").unwrap();
        let b = gen_address_seed(SALT, "sub", "a", "bc").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_salt_is_rejected() {
        let err = gen_address_seed("0xcafecafe", "sub", "1", "aud").unwrap_err();
        assert!(matches!(err, CryptoError::InvalidSalt(_)));
    }
}
