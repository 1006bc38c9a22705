//! Transactions for zkvote: building the Move call for an action, signing it
//! with the ephemeral key, wrapping the signature in the zero-knowledge
//! authorization and submitting it to the ledger.
//!
//! Actions:
//! - **Mint**: demo `create_weapon(name, damage)` call
//! - **Vote**: `vote(group, voting_pass, candidate)` on the voting package

pub mod authenticator;
pub mod authorizer;
pub mod builder;
pub mod data;
pub mod error;
pub mod intent;

pub use authenticator::{user_signature, ZkLoginAuthenticator, ZkLoginInputs};
pub use authorizer::{AuthorizationContext, SignedTransaction, TransactionAuthorizer};
pub use builder::{GasConfig, TransactionBuilder};
pub use data::{
    Argument, CallArg, Command, GasData, ObjectArg, ProgrammableMoveCall,
    ProgrammableTransaction, TransactionData, TransactionExpiration, TransactionKind,
};
pub use error::TxError;
pub use intent::{MintCall, TransactionIntent, VoteCall};
