//! Account address derivation for zero-knowledge login accounts.
//!
//! address = Blake2b-256(0x05 ‖ len(iss) ‖ iss ‖ address_seed)
//!
//! `0x05` is the signature scheme flag of the composite zero-knowledge
//! authorization; the issuer is length-prefixed with a single byte. The same
//! (issuer, seed) pair always yields the same address.

use zkvote_types::AccountAddress;

use crate::address_seed::{gen_address_seed, AddressSeed};
use crate::{blake2b_256_multi, CryptoError};

/// Signature scheme flag of a zero-knowledge login authorization.
pub const ZKLOGIN_SIGNATURE_FLAG: u8 = 0x05;

/// Claim used as the stable user identifier.
pub const KEY_CLAIM_NAME: &str = "sub";

/// Derive the account address for an issuer and an address seed.
pub fn derive_address(issuer: &str, seed: &AddressSeed) -> Result<AccountAddress, CryptoError> {
    let iss_len =
        u8::try_from(issuer.len()).map_err(|_| CryptoError::IssuerTooLong(issuer.len()))?;
    let hash = blake2b_256_multi(&[
        &[ZKLOGIN_SIGNATURE_FLAG, iss_len],
        issuer.as_bytes(),
        seed.as_bytes(),
    ]);
    Ok(AccountAddress::new(hash))
}

/// Derive the account address straight from identity claims and a salt.
pub fn derive_address_for_claims(
    issuer: &str,
    audience: &str,
    subject: &str,
    salt: &str,
) -> Result<AccountAddress, CryptoError> {
    let seed = gen_address_seed(salt, KEY_CLAIM_NAME, subject, audience)?;
    derive_address(issuer, &seed)
}
