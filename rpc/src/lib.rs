//! Internal HTTP API for zkvote.
//!
//! Endpoints:
//! - `POST /api/userinfo/get/salt`: salt lookup, enveloped
//! - `POST /api/userinfo/store`: write a subject's salt into the cache
//! - `POST /api/zkp/get`: proof proxy
//! - `GET /health`, `GET /metrics`

pub mod config;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod server;

pub use config::ServiceConfig;
pub use error::RpcError;
pub use metrics::ApiMetrics;
pub use routes::{build_router, ApiState, PROOF_PATH};
pub use server::RpcServer;
