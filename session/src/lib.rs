//! Ephemeral key management and the local session record.
//!
//! A session is one JSON record: the ephemeral keypair with its nonce
//! commitment, created before the login redirect, plus the user data
//! (subject, salt, token) written back once the salt is resolved.

pub mod ephemeral;
pub mod error;
pub mod record;
pub mod store;

pub use ephemeral::EphemeralKeyManager;
pub use error::StoreError;
pub use record::{EphemeralKeyData, SessionRecord, UserRecord};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, SESSION_RECORD_KEY};
