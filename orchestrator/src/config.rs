//! Session configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use zkvote_groups::VotingConfig;
use zkvote_identity::OAuthProvider;
use zkvote_prover::ProverConfig;
use zkvote_salt::SaltResolverConfig;
use zkvote_transactions::{GasConfig, MintCall};
use zkvote_types::{NetworkId, ObjectId};

use crate::SessionError;

/// Configuration for one login session and the collaborators it talks to.
///
/// Loaded from TOML via [`SessionConfig::from_toml_file`] or built in code.
/// Every field has a default, so an empty file is a valid configuration.
///
/// The default endpoints name the public network services, but transaction
/// bytes are bincode-encoded and the nonce and address seed use Blake2b and
/// HMAC-SHA256. Services expecting BCS and Poseidon will reject them; point
/// the URLs at a node, prover and salt service that share these encodings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Ledger network the session runs against.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Full-node JSON-RPC endpoint. Defaults to the network's public node.
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Per-call timeout for ledger requests.
    #[serde(default = "default_ledger_timeout_secs")]
    pub ledger_timeout_secs: u64,

    /// Request test funds when the account is empty.
    #[serde(default = "default_true")]
    pub enable_faucet: bool,

    /// Faucet endpoint. Defaults to the network's faucet, if any.
    #[serde(default)]
    pub faucet_url: Option<String>,

    /// Epochs the ephemeral key stays valid for.
    #[serde(default = "default_epoch_window")]
    pub epoch_window: u64,

    /// Where the session record lives.
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,

    /// Remote salt issuer.
    #[serde(default = "default_salt_issuer_url")]
    pub salt_issuer_url: String,

    /// Internal salt endpoint base URL. When set, salts are looked up there
    /// instead of resolving them in-process.
    #[serde(default)]
    pub salt_service_url: Option<String>,

    /// Persist resolved salts here. In-memory when unset.
    #[serde(default)]
    pub salt_cache_file: Option<PathBuf>,

    #[serde(default)]
    pub salt: SaltResolverConfig,

    #[serde(default)]
    pub prover: ProverConfig,

    #[serde(default)]
    pub gas: GasConfig,

    #[serde(default)]
    pub mint: MintConfig,

    #[serde(default)]
    pub voting: VotingConfig,

    /// OpenID provider for the login redirect.
    #[serde(default)]
    pub oauth: Option<OAuthProvider>,
}

/// The demo mint call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintConfig {
    #[serde(default = "default_mint_package")]
    pub package: ObjectId,
    #[serde(default = "default_mint_name")]
    pub name: String,
    #[serde(default = "default_mint_damage")]
    pub damage: u64,
}

impl MintConfig {
    pub fn call(&self) -> MintCall {
        MintCall {
            package: self.package,
            name: self.name.clone(),
            damage: self.damage,
        }
    }
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            package: default_mint_package(),
            name: default_mint_name(),
            damage: default_mint_damage(),
        }
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_network() -> NetworkId {
    NetworkId::Testnet
}

fn default_ledger_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_epoch_window() -> u64 {
    2
}

fn default_session_file() -> PathBuf {
    PathBuf::from("./zkvote_session.json")
}

fn default_salt_issuer_url() -> String {
    "http://salt.api-devnet.mystenlabs.com/get_salt".to_string()
}

fn default_mint_package() -> ObjectId {
    "0xf8294cd69d69d867c5a187a60e7095711ba237fad6718ea371bf4fbafbc5bb4b"
        .parse()
        .expect("mint package constant is a valid object id")
}

fn default_mint_name() -> String {
    "Zero Knowledge Proof Axe 9000".to_string()
}

fn default_mint_damage() -> u64 {
    66
}

// ── Impl ───────────────────────────────────────────────────────────────

impl SessionConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, SessionError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SessionError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, SessionError> {
        toml::from_str(s).map_err(|e| SessionError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("SessionConfig is always serializable to TOML")
    }

    pub fn rpc_url(&self) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| self.network.default_rpc_url().to_string())
    }

    /// The faucet to use, or `None` when funding is disabled or the network
    /// has none.
    pub fn faucet_url(&self) -> Option<String> {
        if !self.enable_faucet {
            return None;
        }
        self.faucet_url
            .clone()
            .or_else(|| self.network.default_faucet_url().map(str::to_string))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            rpc_url: None,
            ledger_timeout_secs: default_ledger_timeout_secs(),
            enable_faucet: default_true(),
            faucet_url: None,
            epoch_window: default_epoch_window(),
            session_file: default_session_file(),
            salt_issuer_url: default_salt_issuer_url(),
            salt_service_url: None,
            salt_cache_file: None,
            salt: SaltResolverConfig::default(),
            prover: ProverConfig::default(),
            gas: GasConfig::default(),
            mint: MintConfig::default(),
            voting: VotingConfig::default(),
            oauth: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkvote_salt::{SaltFallback, PLACEHOLDER_SALT};

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = SessionConfig {
            oauth: Some(OAuthProvider::google("client", "http://localhost:3000/auth")),
            ..SessionConfig::default()
        };
        let toml_str = config.to_toml_string();
        let parsed = SessionConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = SessionConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.network, NetworkId::Testnet);
        assert_eq!(config.epoch_window, 2);
        assert_eq!(config.salt.fallback, SaltFallback::AvailabilityOverConsistency);
        assert_eq!(config.salt.placeholder_salt, PLACEHOLDER_SALT);
        assert_eq!(config.prover.timeout_secs, 60);
        assert_eq!(config.mint.damage, 66);
        assert_eq!(config.rpc_url(), "https://fullnode.testnet.sui.io:443");
        assert!(config.oauth.is_none());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            network = "devnet"
            epoch_window = 5

            [salt]
            fallback = "consistency_over_availability"

            [prover]
            url = "http://localhost:3000/api/zkp/get"
            mode = "proxy"
        "#;
        let config = SessionConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.network, NetworkId::Devnet);
        assert_eq!(config.epoch_window, 5);
        assert_eq!(config.salt.fallback, SaltFallback::ConsistencyOverAvailability);
        assert_eq!(config.prover.mode, zkvote_prover::ProverMode::Proxy);
        assert_eq!(config.prover.timeout_secs, 60); // default
    }

    #[test]
    fn faucet_follows_network_unless_disabled() {
        let mut config = SessionConfig {
            network: NetworkId::Mainnet,
            ..SessionConfig::default()
        };
        assert_eq!(config.faucet_url(), None);

        config.network = NetworkId::Devnet;
        assert_eq!(
            config.faucet_url().as_deref(),
            Some("https://faucet.devnet.sui.io/v1/gas")
        );

        config.enable_faucet = false;
        assert_eq!(config.faucet_url(), None);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = SessionConfig::from_toml_str("epoch_window = \"soon\"").unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));
    }
}
