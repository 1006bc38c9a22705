//! Daemon configuration file: logging plus the session and service tables.

use serde::{Deserialize, Serialize};
use std::path::Path;

use zkvote_orchestrator::SessionConfig;
use zkvote_rpc::ServiceConfig;
use zkvote_utils::LogFormat;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Login session settings (`login`, `callback`, `mint`, `vote`).
    #[serde(default)]
    pub session: SessionConfig,

    /// Internal API settings (`serve`).
    #[serde(default)]
    pub service: ServiceConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            session: SessionConfig::default(),
            service: ServiceConfig::default(),
        }
    }
}

impl DaemonConfig {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkvote_types::NetworkId;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = DaemonConfig::from_toml_str("").unwrap();
        assert_eq!(config.session, SessionConfig::default());
        assert_eq!(config.service, ServiceConfig::default());
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn tables_reach_their_sections() {
        let config = DaemonConfig::from_toml_str(
            r#"
            log_format = "json"

            [session]
            network = "devnet"

            [session.oauth]
            authorization_endpoint = "https://accounts.google.com/o/oauth2/v2/auth"
            client_id = "client"
            redirect_uri = "http://localhost:3000/auth"

            [service]
            listen_addr = "0.0.0.0:3000"
            "#,
        )
        .unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.session.network, NetworkId::Devnet);
        assert_eq!(config.session.oauth.unwrap().client_id, "client");
        assert_eq!(config.service.listen_addr, "0.0.0.0:3000");
    }
}
