//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of a session (salt issuer, proving service,
//! ledger node, faucet) is abstracted behind a trait. This crate provides
//! test-friendly implementations that:
//! - Return scripted values
//! - Record every call for assertions
//! - Never touch the network
//!
//! Usage: swap real clients for nullables in tests.

pub mod ledger;
pub mod prover;
pub mod salt;
pub mod token;

pub use ledger::{ExecutionScript, NullFaucet, NullLedger, Submission};
pub use prover::NullProver;
pub use salt::NullSaltIssuer;
pub use token::fake_id_token;
