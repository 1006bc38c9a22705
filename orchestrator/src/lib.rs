//! Session orchestration for zkvote.
//!
//! A [`SessionOrchestrator`] owns one login session. It runs the load flow
//! (token → salt → address → balance → voting group) and the mint and vote
//! actions (proof → authorization → submission), and exposes the outcome as
//! a [`SessionSnapshot`].

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod state;

pub use config::{MintConfig, SessionConfig};
pub use error::SessionError;
pub use orchestrator::{SessionDeps, SessionOrchestrator, SessionSettings};
pub use state::{SessionPhase, SessionSnapshot};
