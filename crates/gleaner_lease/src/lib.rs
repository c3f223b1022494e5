//! Credential leasing and retry orchestration.
//!
//! This crate holds the blocking heart of Gleaner. The [`LeasingEngine`]
//! claims (credential, category) entries from the shared rate ledger,
//! waiting out cooldowns and foreign leases when nothing is free. The
//! [`RetryOrchestrator`] wraps actual remote calls: it applies the leased
//! credential through the client adapter, interprets upstream failures, and
//! rotates to a different credential when the current one hits its limit.
//!
//! Configuration is TOML-based with bundled defaults; see [`GleanerConfig`].

mod config;
mod engine;
mod orchestrator;

pub use config::{GleanerConfig, LeaseConfig};
pub use engine::LeasingEngine;
pub use orchestrator::RetryOrchestrator;
