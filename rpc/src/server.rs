//! Axum-based server for the internal API.

use std::sync::Arc;

use zkvote_prover::{ProverClient, ProverMode};
use zkvote_salt::{FileSaltCache, MemorySaltCache, SaltCache, SaltIssuerClient, SaltResolver};

use crate::{build_router, ApiMetrics, ApiState, RpcError, ServiceConfig};

pub struct RpcServer {
    config: ServiceConfig,
}

impl RpcServer {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    /// Wire the salt resolver and prover client from the configuration.
    pub fn state(&self) -> Result<ApiState, RpcError> {
        let config = &self.config;
        let cache: Arc<dyn SaltCache> = match &config.salt_cache_file {
            Some(path) => Arc::new(FileSaltCache::open(path.clone())?),
            None => Arc::new(MemorySaltCache::new()),
        };
        let resolver = SaltResolver::new(
            cache.clone(),
            Arc::new(SaltIssuerClient::new(config.salt_issuer_url.clone())),
            config.salt.clone(),
        );

        if config.prover.mode == ProverMode::Proxy {
            tracing::warn!(url = %config.prover.url, "proof proxy is forwarding to another proxy");
        }

        Ok(ApiState {
            salts: Arc::new(resolver),
            cache,
            prover: Arc::new(ProverClient::new(&config.prover)),
            metrics: Arc::new(ApiMetrics::new()),
        })
    }

    /// Bind and serve until the process is stopped.
    pub async fn start(&self) -> Result<(), RpcError> {
        let app = build_router(self.state()?);
        let addr = &self.config.listen_addr;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| RpcError::Bind {
                addr: addr.clone(),
                reason: e.to_string(),
            })?;
        tracing::info!(%addr, prover = %self.config.prover.url, "internal API listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
