//! Nullable ledger and faucet: in-memory objects, scripted execution.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use zkvote_ledger::{
    Coin, DynamicFieldInfo, DynamicFieldName, ExecuteResponse, ExecutionStatus, FundingSource,
    LedgerClient, LedgerError, ObjectData, TransactionEffects, NATIVE_COIN_TYPE,
};
use zkvote_types::{AccountAddress, Epoch, ObjectId, TxDigest};

/// What `execute_transaction` answers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecutionScript {
    Success,
    /// Effects report failure with this reason.
    Failure(String),
    /// The node cannot be reached.
    Unreachable,
}

/// A submitted transaction: base64 bytes and signatures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub tx_bytes: String,
    pub signatures: Vec<String>,
}

struct LedgerState {
    epoch: Epoch,
    gas_price: u64,
    next_id: u64,
    coins: HashMap<AccountAddress, Vec<Coin>>,
    objects: HashMap<ObjectId, ObjectData>,
    owned: HashMap<AccountAddress, Vec<ObjectId>>,
    dynamic_field_objects: HashMap<(ObjectId, String), ObjectData>,
    dynamic_fields: HashMap<ObjectId, Vec<DynamicFieldInfo>>,
    execution: ExecutionScript,
    submissions: Vec<Submission>,
    calls: Vec<&'static str>,
}

impl LedgerState {
    fn fresh_id(&mut self) -> (ObjectId, String) {
        self.next_id += 1;
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&self.next_id.to_be_bytes());
        // Non-zero first byte keeps the base58 digest at 32 bytes.
        let mut digest = [0xAB; 32];
        digest[24..].copy_from_slice(&self.next_id.to_be_bytes());
        (ObjectId::new(bytes), bs58::encode(digest).into_string())
    }

    fn new_object(&mut self, content: serde_json::Value, owner: serde_json::Value, type_: Option<String>) -> ObjectData {
        let (object_id, digest) = self.fresh_id();
        let object = ObjectData {
            object_id,
            version: "1".to_string(),
            digest,
            type_,
            owner: Some(owner),
            content: Some(content),
        };
        self.objects.insert(object_id, object.clone());
        object
    }
}

/// In-memory ledger for tests.
pub struct NullLedger {
    state: Mutex<LedgerState>,
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState {
                epoch: 10,
                gas_price: 1_000,
                next_id: 0,
                coins: HashMap::new(),
                objects: HashMap::new(),
                owned: HashMap::new(),
                dynamic_field_objects: HashMap::new(),
                dynamic_fields: HashMap::new(),
                execution: ExecutionScript::Success,
                submissions: Vec::new(),
                calls: Vec::new(),
            }),
        }
    }

    pub fn set_epoch(&self, epoch: Epoch) {
        self.state.lock().unwrap().epoch = epoch;
    }

    pub fn set_execution(&self, script: ExecutionScript) {
        self.state.lock().unwrap().execution = script;
    }

    /// Give `owner` a new coin worth `mist` base units.
    pub fn fund(&self, owner: &AccountAddress, mist: u64) {
        let mut state = self.state.lock().unwrap();
        let (coin_object_id, digest) = state.fresh_id();
        state.coins.entry(*owner).or_default().push(Coin {
            coin_type: NATIVE_COIN_TYPE.to_string(),
            coin_object_id,
            version: "1".to_string(),
            digest,
            balance: mist.to_string(),
        });
    }

    /// Total base units owned by `owner`.
    pub fn balance(&self, owner: &AccountAddress) -> u128 {
        let state = self.state.lock().unwrap();
        state
            .coins
            .get(owner)
            .map(|coins| coins.iter().map(|c| c.balance.parse::<u128>().unwrap()).sum())
            .unwrap_or(0)
    }

    /// Create a voting group object at a fresh id whose group `index` has
    /// `members`. Returns the group object id.
    pub fn add_voting_group(&self, index: u64, members: &[AccountAddress]) -> ObjectId {
        let mut state = self.state.lock().unwrap();
        let (groups_table, _) = state.fresh_id();
        let (members_table, _) = state.fresh_id();

        let group = state.new_object(
            json!({ "fields": { "groups": { "fields": { "id": { "id": groups_table.to_hex() } } } } }),
            json!({ "Shared": { "initial_shared_version": 1 } }),
            None,
        );

        let entry = state.new_object(
            json!({ "fields": { "value": { "fields": {
                "members": { "fields": { "id": { "id": members_table.to_hex() } } }
            } } } }),
            json!({ "ObjectOwner": groups_table.to_hex() }),
            None,
        );
        state
            .dynamic_field_objects
            .insert((groups_table, index.to_string()), entry);

        let fields = members
            .iter()
            .map(|m| {
                let (object_id, _) = state.fresh_id();
                DynamicFieldInfo {
                    name: DynamicFieldName {
                        type_: "address".to_string(),
                        value: json!(m.to_hex()),
                    },
                    object_id,
                    object_type: None,
                }
            })
            .collect();
        state.dynamic_fields.insert(members_table, fields);
        group.object_id
    }

    /// Give `owner` an object of `struct_type`. Returns its id.
    pub fn give_object(&self, owner: &AccountAddress, struct_type: &str) -> ObjectId {
        let mut state = self.state.lock().unwrap();
        let object = state.new_object(
            json!({ "fields": {} }),
            json!({ "AddressOwner": owner.to_hex() }),
            Some(struct_type.to_string()),
        );
        state.owned.entry(*owner).or_default().push(object.object_id);
        object.object_id
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().unwrap().submissions.clone()
    }

    /// Number of calls made to `method` (trait method name).
    pub fn call_count(&self, method: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| **c == method)
            .count()
    }

    fn record(&self, method: &'static str) {
        self.state.lock().unwrap().calls.push(method);
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for NullLedger {
    async fn get_coins(
        &self,
        owner: &AccountAddress,
        coin_type: &str,
    ) -> Result<Vec<Coin>, LedgerError> {
        self.record("get_coins");
        let state = self.state.lock().unwrap();
        Ok(state
            .coins
            .get(owner)
            .map(|coins| {
                coins
                    .iter()
                    .filter(|c| c.coin_type == coin_type)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_owned_objects(
        &self,
        owner: &AccountAddress,
        struct_type: Option<&str>,
    ) -> Result<Vec<ObjectData>, LedgerError> {
        self.record("get_owned_objects");
        let state = self.state.lock().unwrap();
        let ids = state.owned.get(owner).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| state.objects.get(id))
            .filter(|o| struct_type.map_or(true, |t| o.type_.as_deref() == Some(t)))
            .cloned()
            .collect())
    }

    async fn get_object(&self, id: &ObjectId) -> Result<ObjectData, LedgerError> {
        self.record("get_object");
        let state = self.state.lock().unwrap();
        state
            .objects
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::ObjectNotFound(id.to_hex()))
    }

    async fn get_dynamic_field_object(
        &self,
        parent: &ObjectId,
        name: &DynamicFieldName,
    ) -> Result<ObjectData, LedgerError> {
        self.record("get_dynamic_field_object");
        let key = match &name.value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let state = self.state.lock().unwrap();
        state
            .dynamic_field_objects
            .get(&(*parent, key))
            .cloned()
            .ok_or_else(|| LedgerError::ObjectNotFound(format!("{parent}[{}]", name.value)))
    }

    async fn get_dynamic_fields(
        &self,
        parent: &ObjectId,
    ) -> Result<Vec<DynamicFieldInfo>, LedgerError> {
        self.record("get_dynamic_fields");
        let state = self.state.lock().unwrap();
        Ok(state.dynamic_fields.get(parent).cloned().unwrap_or_default())
    }

    async fn current_epoch(&self) -> Result<Epoch, LedgerError> {
        self.record("current_epoch");
        Ok(self.state.lock().unwrap().epoch)
    }

    async fn reference_gas_price(&self) -> Result<u64, LedgerError> {
        self.record("reference_gas_price");
        Ok(self.state.lock().unwrap().gas_price)
    }

    async fn execute_transaction(
        &self,
        tx_bytes_b64: &str,
        signatures: &[String],
    ) -> Result<ExecuteResponse, LedgerError> {
        self.record("execute_transaction");
        let mut state = self.state.lock().unwrap();
        let status = match state.execution.clone() {
            ExecutionScript::Unreachable => {
                return Err(LedgerError::Unreachable("null ledger is down".into()))
            }
            ExecutionScript::Success => ExecutionStatus {
                status: "success".to_string(),
                error: None,
            },
            ExecutionScript::Failure(reason) => ExecutionStatus {
                status: "failure".to_string(),
                error: Some(reason),
            },
        };
        state.submissions.push(Submission {
            tx_bytes: tx_bytes_b64.to_string(),
            signatures: signatures.to_vec(),
        });
        let digest = TxDigest::new(format!("NullTx{}", state.submissions.len()));
        Ok(ExecuteResponse {
            digest,
            effects: Some(TransactionEffects { status }),
        })
    }
}

/// Nullable faucet: records recipients and, when attached to a
/// [`NullLedger`], credits them.
pub struct NullFaucet {
    ledger: Option<Arc<NullLedger>>,
    amount: u64,
    fail: bool,
    recipients: Mutex<Vec<AccountAddress>>,
}

impl NullFaucet {
    /// Credits `amount` base units on `ledger` per request.
    pub fn crediting(ledger: Arc<NullLedger>, amount: u64) -> Self {
        Self {
            ledger: Some(ledger),
            amount,
            fail: false,
            recipients: Mutex::new(Vec::new()),
        }
    }

    /// Rejects every request.
    pub fn failing() -> Self {
        Self {
            ledger: None,
            amount: 0,
            fail: true,
            recipients: Mutex::new(Vec::new()),
        }
    }

    pub fn recipients(&self) -> Vec<AccountAddress> {
        self.recipients.lock().unwrap().clone()
    }
}

#[async_trait]
impl FundingSource for NullFaucet {
    async fn request_funds(&self, recipient: &AccountAddress) -> Result<(), LedgerError> {
        self.recipients.lock().unwrap().push(*recipient);
        if self.fail {
            return Err(LedgerError::Faucet("null faucet refuses".into()));
        }
        if let Some(ledger) = &self.ledger {
            ledger.fund(recipient, self.amount);
        }
        Ok(())
    }
}
