//! JSON-RPC 2.0 client for the ledger full node.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use zkvote_types::{AccountAddress, Epoch, ObjectId};

use crate::types::{ObjectResponse, Page};
use crate::{Coin, DynamicFieldInfo, DynamicFieldName, ExecuteResponse, LedgerError, ObjectData};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Upper bound on pages fetched by a single paginated listing.
const MAX_PAGES: usize = 50;

/// Read and write access to the ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// All coins of `coin_type` owned by `owner`.
    async fn get_coins(
        &self,
        owner: &AccountAddress,
        coin_type: &str,
    ) -> Result<Vec<Coin>, LedgerError>;

    /// Objects owned by `owner`, optionally restricted to a Move struct type.
    async fn get_owned_objects(
        &self,
        owner: &AccountAddress,
        struct_type: Option<&str>,
    ) -> Result<Vec<ObjectData>, LedgerError>;

    async fn get_object(&self, id: &ObjectId) -> Result<ObjectData, LedgerError>;

    async fn get_dynamic_field_object(
        &self,
        parent: &ObjectId,
        name: &DynamicFieldName,
    ) -> Result<ObjectData, LedgerError>;

    async fn get_dynamic_fields(&self, parent: &ObjectId)
        -> Result<Vec<DynamicFieldInfo>, LedgerError>;

    async fn current_epoch(&self) -> Result<Epoch, LedgerError>;

    async fn reference_gas_price(&self) -> Result<u64, LedgerError>;

    /// Execute a signed transaction and wait for its effects. Never retried.
    async fn execute_transaction(
        &self,
        tx_bytes_b64: &str,
        signatures: &[String],
    ) -> Result<ExecuteResponse, LedgerError>;
}

pub struct JsonRpcLedgerClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcLedgerClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a JSON-RPC request and return its `result`.
    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(LedgerError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(LedgerError::RequestFailed(format!(
                "node returned HTTP {} for {method}",
                response.status()
            )));
        }

        let mut json: Value = response
            .json()
            .await
            .map_err(|e| LedgerError::InvalidResponse(format!("invalid JSON response: {e}")))?;

        if let Some(err) = json.get("error") {
            return Err(LedgerError::Rpc {
                code: err.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: err
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            });
        }

        json.get_mut("result")
            .map(Value::take)
            .ok_or_else(|| LedgerError::InvalidResponse(format!("{method}: missing result")))
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, LedgerError> {
        let result = self.rpc_call(method, params).await?;
        serde_json::from_value(result)
            .map_err(|e| LedgerError::InvalidResponse(format!("{method}: {e}")))
    }

    /// Follow `nextCursor` until the listing is exhausted. `params` receives
    /// the cursor and returns the full parameter array.
    async fn paginate<T: DeserializeOwned>(
        &self,
        method: &str,
        params: impl Fn(Value) -> Value + Send + Sync,
    ) -> Result<Vec<T>, LedgerError> {
        let mut items = Vec::new();
        let mut cursor = Value::Null;
        for _ in 0..MAX_PAGES {
            let page: Page<T> = self.call(method, params(cursor)).await?;
            items.extend(page.data);
            match page.next_cursor {
                Some(next) if page.has_next_page && !next.is_null() => cursor = next,
                _ => return Ok(items),
            }
        }
        tracing::warn!(method, pages = MAX_PAGES, "listing truncated");
        Ok(items)
    }

    fn object_from_response(id: &str, response: ObjectResponse) -> Result<ObjectData, LedgerError> {
        match response.data {
            Some(data) => Ok(data),
            None => Err(LedgerError::ObjectNotFound(match response.error {
                Some(err) => format!("{id}: {err}"),
                None => id.to_string(),
            })),
        }
    }
}

fn object_options() -> Value {
    json!({ "showType": true, "showOwner": true, "showContent": true })
}

/// Numeric results arrive either as JSON numbers or decimal strings.
fn u64_from_value(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| value.as_str()?.parse().ok())
}

#[async_trait]
impl LedgerClient for JsonRpcLedgerClient {
    async fn get_coins(
        &self,
        owner: &AccountAddress,
        coin_type: &str,
    ) -> Result<Vec<Coin>, LedgerError> {
        let owner = owner.to_hex();
        self.paginate("suix_getCoins", |cursor| json!([owner, coin_type, cursor, null]))
            .await
    }

    async fn get_owned_objects(
        &self,
        owner: &AccountAddress,
        struct_type: Option<&str>,
    ) -> Result<Vec<ObjectData>, LedgerError> {
        let owner = owner.to_hex();
        let query = match struct_type {
            Some(t) => json!({ "filter": { "StructType": t }, "options": object_options() }),
            None => json!({ "options": object_options() }),
        };
        let responses: Vec<ObjectResponse> = self
            .paginate("suix_getOwnedObjects", |cursor| {
                json!([owner, query, cursor, null])
            })
            .await?;
        Ok(responses.into_iter().filter_map(|r| r.data).collect())
    }

    async fn get_object(&self, id: &ObjectId) -> Result<ObjectData, LedgerError> {
        let response: ObjectResponse = self
            .call("sui_getObject", json!([id.to_hex(), object_options()]))
            .await?;
        Self::object_from_response(&id.to_hex(), response)
    }

    async fn get_dynamic_field_object(
        &self,
        parent: &ObjectId,
        name: &DynamicFieldName,
    ) -> Result<ObjectData, LedgerError> {
        let response: ObjectResponse = self
            .call("suix_getDynamicFieldObject", json!([parent.to_hex(), name]))
            .await?;
        Self::object_from_response(&format!("{parent}[{}]", name.value), response)
    }

    async fn get_dynamic_fields(
        &self,
        parent: &ObjectId,
    ) -> Result<Vec<DynamicFieldInfo>, LedgerError> {
        let parent = parent.to_hex();
        self.paginate("suix_getDynamicFields", |cursor| json!([parent, cursor, null]))
            .await
    }

    async fn current_epoch(&self) -> Result<Epoch, LedgerError> {
        let state = self
            .rpc_call("suix_getLatestSuiSystemState", json!([]))
            .await?;
        state
            .get("epoch")
            .and_then(u64_from_value)
            .ok_or_else(|| LedgerError::InvalidResponse("system state has no epoch".into()))
    }

    async fn reference_gas_price(&self) -> Result<u64, LedgerError> {
        let price = self.rpc_call("suix_getReferenceGasPrice", json!([])).await?;
        u64_from_value(&price)
            .ok_or_else(|| LedgerError::InvalidResponse(format!("invalid gas price: {price}")))
    }

    async fn execute_transaction(
        &self,
        tx_bytes_b64: &str,
        signatures: &[String],
    ) -> Result<ExecuteResponse, LedgerError> {
        let response: ExecuteResponse = self
            .call(
                "sui_executeTransactionBlock",
                json!([
                    tx_bytes_b64,
                    signatures,
                    { "showEffects": true },
                    "WaitForLocalExecution"
                ]),
            )
            .await?;
        tracing::info!(digest = %response.digest, "transaction executed");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_results_accept_strings() {
        assert_eq!(u64_from_value(&json!(750)), Some(750));
        assert_eq!(u64_from_value(&json!("1000")), Some(1000));
        assert_eq!(u64_from_value(&json!("x")), None);
    }

    #[test]
    fn missing_object_maps_to_not_found() {
        let response: ObjectResponse =
            serde_json::from_value(json!({"error": {"code": "notExists"}})).unwrap();
        assert!(matches!(
            JsonRpcLedgerClient::object_from_response("0x1", response),
            Err(LedgerError::ObjectNotFound(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_node() {
        let client =
            JsonRpcLedgerClient::with_timeout("http://127.0.0.1:9", Duration::from_millis(500));
        assert!(matches!(
            client.current_epoch().await,
            Err(LedgerError::Unreachable(_))
        ));
    }
}
