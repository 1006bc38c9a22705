//! Identity token handling for zkvote.
//!
//! Decodes the OpenID identity token returned by the provider (no signature
//! check, the proving service verifies it), checks that its nonce commits to
//! the local ephemeral key, and builds the provider redirect URLs.

pub mod claims;
pub mod error;
pub mod oauth;

pub use claims::{decode, is_expired, jwt_to_address, verify_nonce, IdentityClaims};
pub use error::IdentityError;
pub use oauth::{authorization_url, token_from_callback, OAuthProvider};
