//! Session phases and the observable session snapshot.

use serde::{Deserialize, Serialize};
use zkvote_groups::VotingContext;
use zkvote_ledger::MIST_PER_UNIT;
use zkvote_types::{AccountAddress, TxDigest};

/// Where the session is in its login or action flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    DecodingToken,
    ResolvingSalt,
    DerivingAddress,
    CheckingBalance,
    FundingIfNeeded,
    CheckingVotingEligibility,
    Ready,
    RequestingProof,
    Authorizing,
    Submitted,
    Failed,
}

impl SessionPhase {
    /// Phases from which a mint or vote may start.
    pub fn accepts_actions(self) -> bool {
        matches!(self, Self::Ready | Self::Submitted | Self::Failed)
    }
}

/// A point-in-time copy of the session state.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub in_progress: bool,
    /// The last error, as shown to the user.
    pub error: Option<String>,
    /// Non-fatal problems, e.g. a faucet that did not answer.
    pub notice: Option<String>,
    pub subject: Option<String>,
    pub address: Option<AccountAddress>,
    pub balance_mist: Option<u128>,
    pub voting: VotingContext,
    pub last_digest: Option<TxDigest>,
    pub explorer_url: Option<String>,
}

impl SessionSnapshot {
    /// Balance in whole units.
    pub fn balance(&self) -> Option<f64> {
        self.balance_mist
            .map(|mist| mist as f64 / MIST_PER_UNIT as f64)
    }
}
