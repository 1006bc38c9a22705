//! Internal API service configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use zkvote_prover::ProverConfig;
use zkvote_salt::SaltResolverConfig;

use crate::RpcError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Remote salt issuer the lookup endpoint falls through to.
    #[serde(default = "default_salt_issuer_url")]
    pub salt_issuer_url: String,

    /// Persist the salt cache here. In-memory when unset.
    #[serde(default)]
    pub salt_cache_file: Option<PathBuf>,

    #[serde(default)]
    pub salt: SaltResolverConfig,

    /// Prover the proof proxy forwards to. Must be a direct endpoint.
    #[serde(default)]
    pub prover: ProverConfig,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_listen_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_salt_issuer_url() -> String {
    "http://salt.api-devnet.mystenlabs.com/get_salt".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServiceConfig {
    pub fn from_toml_file(path: &str) -> Result<Self, RpcError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| RpcError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, RpcError> {
        toml::from_str(s).map_err(|e| RpcError::Config(e.to_string()))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            salt_issuer_url: default_salt_issuer_url(),
            salt_cache_file: None,
            salt: SaltResolverConfig::default(),
            prover: ProverConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = ServiceConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.listen_addr, "127.0.0.1:3000");
    }

    #[test]
    fn nested_tables_override() {
        let config = ServiceConfig::from_toml_str(
            r#"
            listen_addr = "0.0.0.0:8080"
            salt_cache_file = "/var/lib/zkvote/salts.json"

            [salt.retry]
            max_attempts = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.salt.retry.max_attempts, 5);
        assert_eq!(config.salt.retry.initial_interval_ms, 200);
        assert_eq!(
            config.salt_cache_file,
            Some(PathBuf::from("/var/lib/zkvote/salts.json"))
        );
    }
}
