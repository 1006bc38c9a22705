//! Fundamental types for zkvote.
//!
//! This crate defines the value types shared by every other crate in the
//! workspace: ephemeral keys and signatures, ledger addresses and object ids,
//! transaction digests, timestamps and network identifiers.

pub mod address;
pub mod error;
pub mod hash;
pub mod keys;
pub mod network;
pub mod time;

pub use address::{AccountAddress, ObjectId};
pub use error::ZkVoteError;
pub use hash::TxDigest;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use network::NetworkId;
pub use time::{Epoch, Timestamp};
