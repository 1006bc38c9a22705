//! Shared utilities for zkvote.

pub mod logging;
pub mod retry;

pub use logging::{init_tracing, LogFormat};
pub use retry::RetryPolicy;
