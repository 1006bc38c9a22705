//! Prometheus metrics for the internal API.
//!
//! [`ApiMetrics`] owns a dedicated [`Registry`]; `GET /metrics` encodes it
//! in the Prometheus text exposition format.

use prometheus::{
    register_int_counter_with_registry, Encoder, IntCounter, Opts, Registry, TextEncoder,
};

use crate::RpcError;

pub struct ApiMetrics {
    pub registry: Registry,

    /// Salt lookups answered with a salt.
    pub salt_lookups: IntCounter,
    /// Salt lookups rejected for a malformed body.
    pub salt_lookup_rejections: IntCounter,
    /// Salt lookups that could not produce a salt.
    pub salt_lookup_failures: IntCounter,
    /// User records written into the salt cache.
    pub users_stored: IntCounter,
    /// Store requests refused (malformed, wrong subject, conflicting salt).
    pub user_store_rejections: IntCounter,
    /// Proof requests forwarded to the prover.
    pub proof_requests: IntCounter,
    /// Forwarded proof requests that returned no proof.
    pub proof_failures: IntCounter,
}

fn counter(registry: &Registry, name: &str, help: &str) -> IntCounter {
    register_int_counter_with_registry!(Opts::new(name, help), registry)
        .unwrap_or_else(|e| panic!("failed to register {name} counter: {e}"))
}

impl ApiMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let salt_lookups = counter(
            &registry,
            "zkvote_salt_lookups_total",
            "Salt lookups answered with a salt",
        );
        let salt_lookup_rejections = counter(
            &registry,
            "zkvote_salt_lookup_rejections_total",
            "Salt lookups rejected for a malformed body",
        );
        let salt_lookup_failures = counter(
            &registry,
            "zkvote_salt_lookup_failures_total",
            "Salt lookups that could not produce a salt",
        );
        let users_stored = counter(
            &registry,
            "zkvote_users_stored_total",
            "User records written into the salt cache",
        );
        let user_store_rejections = counter(
            &registry,
            "zkvote_user_store_rejections_total",
            "Store requests refused",
        );
        let proof_requests = counter(
            &registry,
            "zkvote_proof_requests_total",
            "Proof requests forwarded to the prover",
        );
        let proof_failures = counter(
            &registry,
            "zkvote_proof_failures_total",
            "Forwarded proof requests that returned no proof",
        );

        Self {
            registry,
            salt_lookups,
            salt_lookup_rejections,
            salt_lookup_failures,
            users_stored,
            user_store_rejections,
            proof_requests,
            proof_failures,
        }
    }

    /// Encode every metric in the text exposition format.
    pub fn encode(&self) -> Result<String, RpcError> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| RpcError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| RpcError::Metrics(e.to_string()))
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}
