//! Gleaner - Shared-Credential Leasing for Rate-Limited APIs
//!
//! Gleaner lets a fleet of worker processes collect data from rate-limited
//! external APIs through a pool of interchangeable credentials, each subject
//! to independent per-operation-category limits. A durable rate ledger is
//! the single source of truth; workers lease (credential, category) entries
//! from it, wait when nothing is free, and rotate credentials automatically
//! when upstream reports a rate-limit violation mid-call.
//!
//! # Features
//!
//! - **Transactional leasing**: `FOR UPDATE SKIP LOCKED` claims guarantee an
//!   entry is held by exactly one worker at a time
//! - **Cooldown tracking**: upstream reset times are recorded exactly and
//!   waited out, per credential and category
//! - **Bounded retries**: rate-limited calls rotate to another credential,
//!   with an explicit, configurable retry ceiling
//! - **Fail fast**: unrecognized upstream errors surface immediately with
//!   full context instead of being retried blindly
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use gleaner::{
//!     GleanerConfig, LeasingEngine, PostgresRateLedger, RetryOrchestrator,
//!     establish_pool,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GleanerConfig::load()?;
//!     let ledger = Arc::new(PostgresRateLedger::new(establish_pool(10)?));
//!     let adapter = Arc::new(MyAdapter::new());
//!
//!     let engine = Arc::new(LeasingEngine::new(ledger, adapter, config.lease.clone()));
//!     let orchestrator = RetryOrchestrator::new(engine);
//!
//!     let category = config.category_for("users/show").expect("mapped operation");
//!     let response = orchestrator.execute(&category, &op).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Gleaner is organized as a workspace with focused crates:
//!
//! - `gleaner_core` - Core data types (Credential, LedgerEntry, etc.)
//! - `gleaner_interface` - CredentialStore, RateLedger, and ClientAdapter traits
//! - `gleaner_error` - Error types
//! - `gleaner_lease` - Leasing engine, retry orchestration, configuration
//! - `gleaner_database` - PostgreSQL ledger and store
//!
//! This crate (`gleaner`) re-exports everything for convenience.

// Re-export core crates (always available)
pub use gleaner_core::*;
pub use gleaner_error::*;
pub use gleaner_interface::*;
pub use gleaner_lease::*;

// Re-export persistence based on features
#[cfg(feature = "database")]
pub use gleaner_database::*;

pub mod telemetry;
