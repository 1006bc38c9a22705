//! Builds the transaction payload for an intent.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use zkvote_ledger::{LedgerClient, ObjectData, NATIVE_COIN_TYPE};
use zkvote_types::{AccountAddress, Epoch, ObjectId};

use crate::data::{
    CallArg, GasData, ObjectArg, ProgrammableTransaction, TransactionData, TransactionExpiration,
    TransactionKind,
};
use crate::{TransactionIntent, TxError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasConfig {
    /// Gas budget in base units.
    #[serde(default = "default_budget")]
    pub budget: u64,
    /// Most coins used to pay for gas.
    #[serde(default = "default_max_payment_coins")]
    pub max_payment_coins: usize,
}

fn default_budget() -> u64 {
    50_000_000
}
fn default_max_payment_coins() -> usize {
    16
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            budget: default_budget(),
            max_payment_coins: default_max_payment_coins(),
        }
    }
}

pub struct TransactionBuilder {
    ledger: Arc<dyn LedgerClient>,
    gas: GasConfig,
}

impl TransactionBuilder {
    pub fn new(ledger: Arc<dyn LedgerClient>, gas: GasConfig) -> Self {
        Self { ledger, gas }
    }

    /// Build the payload for `intent`, sent by `sender` and valid through
    /// `max_epoch`.
    pub async fn build(
        &self,
        intent: &TransactionIntent,
        sender: AccountAddress,
        max_epoch: Epoch,
    ) -> Result<TransactionData, TxError> {
        let mut ptb = ProgrammableTransaction::default();
        match intent {
            TransactionIntent::Mint(call) => {
                let name = ptb.input(CallArg::pure(&call.name)?);
                let damage = ptb.input(CallArg::pure(&call.damage)?);
                ptb.move_call(
                    call.package,
                    crate::MintCall::MODULE,
                    crate::MintCall::FUNCTION,
                    vec![name, damage],
                );
            }
            TransactionIntent::Vote(call) => {
                let group = self.object_arg(&call.group, true).await?;
                let pass = self.object_arg(&call.voting_pass, false).await?;
                let group = ptb.input(CallArg::Object(group));
                let pass = ptb.input(CallArg::Object(pass));
                let candidate = ptb.input(CallArg::pure(&call.candidate)?);
                ptb.move_call(
                    call.package,
                    crate::VoteCall::MODULE,
                    crate::VoteCall::FUNCTION,
                    vec![group, pass, candidate],
                );
            }
        }

        let gas_data = self.gas_data(sender).await?;
        Ok(TransactionData {
            kind: TransactionKind::ProgrammableTransaction(ptb),
            sender,
            gas_data,
            expiration: TransactionExpiration::Epoch(max_epoch),
        })
    }

    async fn object_arg(&self, id: &ObjectId, mutable: bool) -> Result<ObjectArg, TxError> {
        let object = self.ledger.get_object(id).await?;
        object_arg_for(&object, mutable)
    }

    async fn gas_data(&self, sender: AccountAddress) -> Result<GasData, TxError> {
        let price = self.ledger.reference_gas_price().await?;
        let mut coins = self.ledger.get_coins(&sender, NATIVE_COIN_TYPE).await?;
        if coins.is_empty() {
            return Err(TxError::Build(format!("{sender} has no coins to pay for gas")));
        }
        coins.sort_by_key(|c| std::cmp::Reverse(c.balance_value().unwrap_or(0)));
        let payment = coins
            .iter()
            .take(self.gas.max_payment_coins.max(1))
            .map(|c| c.object_ref())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(GasData {
            payment,
            owner: sender,
            price,
            budget: self.gas.budget,
        })
    }
}

/// Shared objects are passed by id and initial version, owned ones by
/// reference.
fn object_arg_for(object: &ObjectData, mutable: bool) -> Result<ObjectArg, TxError> {
    match object.initial_shared_version() {
        Some(initial_shared_version) => Ok(ObjectArg::SharedObject {
            id: object.object_id,
            initial_shared_version,
            mutable,
        }),
        None => Ok(ObjectArg::ImmOrOwnedObject(object.object_ref()?)),
    }
}
