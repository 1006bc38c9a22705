//! Faucet client for funding fresh accounts on test networks.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use zkvote_types::AccountAddress;

use crate::LedgerError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Something that can top up an account.
#[async_trait]
pub trait FundingSource: Send + Sync {
    async fn request_funds(&self, recipient: &AccountAddress) -> Result<(), LedgerError>;
}

pub struct FaucetClient {
    http: reqwest::Client,
    url: String,
}

impl FaucetClient {
    pub fn new(url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl FundingSource for FaucetClient {
    /// `POST {"FixedAmountRequest": {"recipient": "0x..."}}`.
    async fn request_funds(&self, recipient: &AccountAddress) -> Result<(), LedgerError> {
        let body = json!({ "FixedAmountRequest": { "recipient": recipient.to_hex() } });
        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Faucet(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LedgerError::Faucet(format!("HTTP status {status}: {text}")));
        }
        tracing::info!(recipient = %recipient, "faucet funding requested");
        Ok(())
    }
}
