//! What the user asked to do.

use serde::{Deserialize, Serialize};
use zkvote_types::{AccountAddress, ObjectId};

/// Demo mint: `{package}::teotest::create_weapon(name, damage)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintCall {
    pub package: ObjectId,
    pub name: String,
    pub damage: u64,
}

impl MintCall {
    pub const MODULE: &'static str = "teotest";
    pub const FUNCTION: &'static str = "create_weapon";
}

/// Group vote: `{package}::vote::vote(group, voting_pass, candidate)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCall {
    pub package: ObjectId,
    pub group: ObjectId,
    pub voting_pass: ObjectId,
    pub candidate: AccountAddress,
}

impl VoteCall {
    pub const MODULE: &'static str = "vote";
    pub const FUNCTION: &'static str = "vote";
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionIntent {
    Mint(MintCall),
    Vote(VoteCall),
}

impl TransactionIntent {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mint(_) => "mint",
            Self::Vote(_) => "vote",
        }
    }
}
