//! Network identifier.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ZkVoteError;

/// Identifies which ledger network a session talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    Mainnet,
    Testnet,
    Devnet,
    /// Local development node.
    Localnet,
}

impl NetworkId {
    /// Default full-node JSON-RPC endpoint for this network.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://fullnode.mainnet.sui.io:443",
            Self::Testnet => "https://fullnode.testnet.sui.io:443",
            Self::Devnet => "https://fullnode.devnet.sui.io:443",
            Self::Localnet => "http://127.0.0.1:9000",
        }
    }

    /// Default faucet endpoint, if the network has one.
    pub fn default_faucet_url(&self) -> Option<&'static str> {
        match self {
            Self::Mainnet => None,
            Self::Testnet => Some("https://faucet.testnet.sui.io/v1/gas"),
            Self::Devnet => Some("https://faucet.devnet.sui.io/v1/gas"),
            Self::Localnet => Some("http://127.0.0.1:9123/gas"),
        }
    }

    /// Explorer link for a transaction digest.
    pub fn explorer_url(&self, digest: &str) -> String {
        format!(
            "https://suiexplorer.com/txblock/{digest}?network={}",
            self.as_str()
        )
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Devnet => "devnet",
            Self::Localnet => "localnet",
        }
    }
}

impl FromStr for NetworkId {
    type Err = ZkVoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "devnet" => Ok(Self::Devnet),
            "localnet" | "local" => Ok(Self::Localnet),
            other => Err(ZkVoteError::UnknownNetwork(other.to_string())),
        }
    }
}
