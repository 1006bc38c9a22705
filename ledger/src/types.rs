//! Ledger JSON-RPC response types.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use zkvote_types::{AccountAddress, ObjectId, TxDigest};

use crate::LedgerError;

/// Type tag of the native coin.
pub const NATIVE_COIN_TYPE: &str = "0x2::sui::SUI";

/// Base units per whole coin.
pub const MIST_PER_UNIT: u64 = 1_000_000_000;

/// 32-byte object digest, base58 on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectDigest(pub [u8; 32]);

impl FromStr for ObjectDigest {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| LedgerError::InvalidResponse(format!("object digest {s}: {e}")))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            LedgerError::InvalidResponse(format!("object digest has {} bytes", b.len()))
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for ObjectDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for ObjectDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectDigest({self})")
    }
}

impl Serialize for ObjectDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            // Length-prefixed byte vector, matching the ledger's own encoding.
            self.0.to_vec().serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for ObjectDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            let v = Vec::<u8>::deserialize(deserializer)?;
            let arr: [u8; 32] = v
                .try_into()
                .map_err(|_| serde::de::Error::custom("object digest must be 32 bytes"))?;
            Ok(Self(arr))
        }
    }
}

/// Reference to a specific version of an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub object_id: ObjectId,
    pub version: u64,
    pub digest: ObjectDigest,
}

fn parse_version(raw: &str) -> Result<u64, LedgerError> {
    raw.parse()
        .map_err(|_| LedgerError::InvalidResponse(format!("invalid object version: {raw}")))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub coin_type: String,
    pub coin_object_id: ObjectId,
    pub version: String,
    pub digest: String,
    /// Balance in base units (MIST), as a decimal string.
    pub balance: String,
}

impl Coin {
    pub fn balance_value(&self) -> Result<u64, LedgerError> {
        self.balance
            .parse()
            .map_err(|_| LedgerError::InvalidResponse(format!("invalid balance: {}", self.balance)))
    }

    pub fn object_ref(&self) -> Result<ObjectRef, LedgerError> {
        Ok(ObjectRef {
            object_id: self.coin_object_id,
            version: parse_version(&self.version)?,
            digest: self.digest.parse()?,
        })
    }
}

/// Sum of coin balances in base units.
pub fn total_balance(coins: &[Coin]) -> Result<u128, LedgerError> {
    coins
        .iter()
        .try_fold(0u128, |acc, c| Ok(acc + u128::from(c.balance_value()?)))
}

/// Page of a paginated JSON-RPC listing.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<Value>,
    #[serde(default)]
    pub has_next_page: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    pub object_id: ObjectId,
    pub version: String,
    pub digest: String,
    #[serde(default, rename = "type")]
    pub type_: Option<String>,
    #[serde(default)]
    pub owner: Option<Value>,
    #[serde(default)]
    pub content: Option<Value>,
}

impl ObjectData {
    pub fn object_ref(&self) -> Result<ObjectRef, LedgerError> {
        Ok(ObjectRef {
            object_id: self.object_id,
            version: parse_version(&self.version)?,
            digest: self.digest.parse()?,
        })
    }

    /// Initial shared version, when the object is shared.
    pub fn initial_shared_version(&self) -> Option<u64> {
        let v = self.owner.as_ref()?.pointer("/Shared/initial_shared_version")?;
        v.as_u64().or_else(|| v.as_str()?.parse().ok())
    }

    /// `content.fields`, where Move struct fields live.
    pub fn fields(&self) -> Option<&Value> {
        self.content.as_ref()?.get("fields")
    }
}

/// Envelope of object lookups: `{data}` or `{error}`.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ObjectResponse {
    #[serde(default)]
    pub data: Option<ObjectData>,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DynamicFieldName {
    #[serde(rename = "type")]
    pub type_: String,
    pub value: Value,
}

impl DynamicFieldName {
    pub fn u64(value: u64) -> Self {
        Self {
            type_: "u64".to_string(),
            value: Value::String(value.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFieldInfo {
    pub name: DynamicFieldName,
    pub object_id: ObjectId,
    #[serde(default)]
    pub object_type: Option<String>,
}

impl DynamicFieldInfo {
    /// The field name as an address, for address-keyed tables.
    pub fn name_as_address(&self) -> Option<AccountAddress> {
        self.name.value.as_str()?.parse().ok()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEffects {
    pub status: ExecutionStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub digest: TxDigest,
    #[serde(default)]
    pub effects: Option<TransactionEffects>,
}

impl ExecuteResponse {
    /// `Ok(())` when effects report success, the failure reason otherwise.
    pub fn outcome(&self) -> Result<(), String> {
        match &self.effects {
            Some(effects) if effects.status.is_success() => Ok(()),
            Some(effects) => Err(effects
                .status
                .error
                .clone()
                .unwrap_or_else(|| format!("execution status {}", effects.status.status))),
            None => Err("no effects returned".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coin(balance: &str) -> Coin {
        Coin {
            coin_type: NATIVE_COIN_TYPE.into(),
            coin_object_id: ObjectId::new([1u8; 32]),
            version: "7".into(),
            digest: bs58::encode([9u8; 32]).into_string(),
            balance: balance.into(),
        }
    }

    #[test]
    fn total_balance_sums_coins() {
        let coins = vec![coin("1000000000"), coin("500000000")];
        assert_eq!(total_balance(&coins).unwrap(), 1_500_000_000);
        assert_eq!(total_balance(&[]).unwrap(), 0);
    }

    #[test]
    fn bad_balance_is_reported() {
        assert!(total_balance(&[coin("lots")]).is_err());
    }

    #[test]
    fn coin_object_ref() {
        let r = coin("1").object_ref().unwrap();
        assert_eq!(r.version, 7);
        assert_eq!(r.digest.0, [9u8; 32]);
    }

    #[test]
    fn digest_rejects_wrong_length() {
        let short = bs58::encode([1u8; 8]).into_string();
        assert!(short.parse::<ObjectDigest>().is_err());
        assert!("0OIl".parse::<ObjectDigest>().is_err());
    }

    #[test]
    fn execute_outcome() {
        let ok: ExecuteResponse = serde_json::from_value(json!({
            "digest": "Dig1",
            "effects": {"status": {"status": "success"}}
        }))
        .unwrap();
        assert!(ok.outcome().is_ok());

        let failed: ExecuteResponse = serde_json::from_value(json!({
            "digest": "Dig2",
            "effects": {"status": {"status": "failure", "error": "MoveAbort(vote, 3)"}}
        }))
        .unwrap();
        assert_eq!(failed.outcome().unwrap_err(), "MoveAbort(vote, 3)");

        let bare: ExecuteResponse = serde_json::from_value(json!({"digest": "Dig3"})).unwrap();
        assert!(bare.outcome().is_err());
    }

    #[test]
    fn shared_version_from_owner() {
        let obj: ObjectData = serde_json::from_value(json!({
            "objectId": "0x5",
            "version": "12",
            "digest": bs58::encode([2u8; 32]).into_string(),
            "owner": {"Shared": {"initial_shared_version": 3}}
        }))
        .unwrap();
        assert_eq!(obj.initial_shared_version(), Some(3));
        assert_eq!(obj.object_ref().unwrap().version, 12);
    }

    #[test]
    fn dynamic_field_name_as_address() {
        let info: DynamicFieldInfo = serde_json::from_value(json!({
            "name": {"type": "address", "value": "0xabc"},
            "objectId": "0x1"
        }))
        .unwrap();
        assert_eq!(
            info.name_as_address().unwrap().to_string(),
            format!("0x{:0>64}", "abc")
        );
    }
}
