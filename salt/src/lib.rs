//! User salt resolution.
//!
//! The salt is the per-user secret that makes the derived account address
//! unlinkable to the identity claim. It must never change for a subject once
//! issued, so resolved salts are cached by subject and the cache always wins
//! over the remote issuer.

pub mod api;
pub mod cache;
pub mod error;
pub mod issuer;
pub mod resolver;

pub use api::{
    ApiEnvelope, SaltApiClient, SaltLookupRequest, StoreUserRequest, UserRegistry,
    SALT_LOOKUP_PATH, STORE_USER_PATH,
};
pub use cache::{FileSaltCache, MemorySaltCache, SaltCache};
pub use error::SaltError;
pub use issuer::{SaltIssuer, SaltIssuerClient};
pub use resolver::{
    SaltFallback, SaltProvider, SaltResolver, SaltResolverConfig, SaltSource, UserSalt,
    PLACEHOLDER_SALT,
};
