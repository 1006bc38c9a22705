//! Ledger access for zkvote.
//!
//! A JSON-RPC 2.0 client for the ledger full node (coins, objects, dynamic
//! fields, epoch, gas price, transaction execution) and a faucet client for
//! funding fresh accounts on test networks.

pub mod client;
pub mod error;
pub mod faucet;
pub mod types;

pub use client::{JsonRpcLedgerClient, LedgerClient};
pub use error::LedgerError;
pub use faucet::{FaucetClient, FundingSource};
pub use types::{
    total_balance, Coin, DynamicFieldInfo, DynamicFieldName, ExecuteResponse, ExecutionStatus,
    ObjectData, ObjectDigest, ObjectRef, TransactionEffects, MIST_PER_UNIT, NATIVE_COIN_TYPE,
};
