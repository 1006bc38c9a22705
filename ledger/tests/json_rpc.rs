//! JSON-RPC client tests against an in-process mock full node.

use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use zkvote_ledger::{total_balance, DynamicFieldName, JsonRpcLedgerClient, LedgerClient, LedgerError};
use zkvote_types::{AccountAddress, ObjectId};

// ── Helpers ──────────────────────────────────────────────────────────────

const DIGEST: &str = "4vJ9JU1bJJE96FWSJKvHsmmFADCg4gpZQff4P3bkLKi";

async fn mock_node(Json(req): Json<Value>) -> Json<Value> {
    let id = req["id"].clone();
    let params = &req["params"];
    let result = match req["method"].as_str().unwrap_or_default() {
        "suix_getLatestSuiSystemState" => json!({ "epoch": "42" }),
        "suix_getReferenceGasPrice" => json!("750"),
        "suix_getCoins" => {
            // Two pages: the first cursor is null, the second "page2".
            if params[2].is_null() {
                json!({
                    "data": [coin("0x11", "1000000000")],
                    "nextCursor": "page2",
                    "hasNextPage": true
                })
            } else {
                json!({
                    "data": [coin("0x12", "250000000")],
                    "nextCursor": null,
                    "hasNextPage": false
                })
            }
        }
        "sui_getObject" => {
            if params[0] == json!(format!("0x{:0>64}", "dead")) {
                json!({ "error": { "code": "notExists" } })
            } else {
                json!({ "data": {
                    "objectId": params[0],
                    "version": "3",
                    "digest": DIGEST,
                    "content": { "fields": { "answer": 42 } }
                }})
            }
        }
        "sui_executeTransactionBlock" => {
            assert_eq!(params[2], json!({ "showEffects": true }));
            json!({
                "digest": "TxDig",
                "effects": { "status": { "status": "failure", "error": "InsufficientGas" } }
            })
        }
        "suix_getDynamicFieldObject" => {
            assert_eq!(params[1], json!({ "type": "u64", "value": "0" }));
            json!({ "data": { "objectId": "0x77", "version": "1", "digest": DIGEST } })
        }
        other => {
            return Json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": format!("method not found: {other}") }
            }))
        }
    };
    Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
}

fn coin(id: &str, balance: &str) -> Value {
    json!({
        "coinType": "0x2::sui::SUI",
        "coinObjectId": id,
        "version": "5",
        "digest": DIGEST,
        "balance": balance
    })
}

async fn start_node() -> JsonRpcLedgerClient {
    let app = Router::new().route("/", post(mock_node));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    JsonRpcLedgerClient::new(format!("http://{addr}/"))
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reads_epoch_and_gas_price() {
    let client = start_node().await;
    assert_eq!(client.current_epoch().await.unwrap(), 42);
    assert_eq!(client.reference_gas_price().await.unwrap(), 750);
}

#[tokio::test]
async fn coins_follow_pagination() {
    let client = start_node().await;
    let coins = client
        .get_coins(&AccountAddress::ZERO, "0x2::sui::SUI")
        .await
        .unwrap();
    assert_eq!(coins.len(), 2);
    assert_eq!(total_balance(&coins).unwrap(), 1_250_000_000);
    assert_eq!(coins[0].object_ref().unwrap().version, 5);
}

#[tokio::test]
async fn object_lookup_and_not_found() {
    let client = start_node().await;
    let obj = client.get_object(&"0x1".parse().unwrap()).await.unwrap();
    assert_eq!(obj.fields().unwrap()["answer"], 42);

    let missing: ObjectId = "0xdead".parse().unwrap();
    assert!(matches!(
        client.get_object(&missing).await,
        Err(LedgerError::ObjectNotFound(_))
    ));
}

#[tokio::test]
async fn dynamic_field_by_u64_name() {
    let client = start_node().await;
    let obj = client
        .get_dynamic_field_object(&"0x5".parse().unwrap(), &DynamicFieldName::u64(0))
        .await
        .unwrap();
    assert_eq!(obj.object_id.to_string(), format!("0x{:0>64}", "77"));
}

#[tokio::test]
async fn execution_failure_is_reported_in_outcome() {
    let client = start_node().await;
    let response = client
        .execute_transaction("AAAA", &["sig".to_string()])
        .await
        .unwrap();
    assert_eq!(response.digest.as_str(), "TxDig");
    assert_eq!(response.outcome().unwrap_err(), "InsufficientGas");
}

#[tokio::test]
async fn rpc_error_is_surfaced() {
    let client = start_node().await;
    let err = client
        .get_dynamic_fields(&"0x5".parse().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Rpc { code: -32601, .. }));
}
