//! PostgreSQL integration for Gleaner.
//!
//! This crate implements the [`gleaner_interface::CredentialStore`] and
//! [`gleaner_interface::RateLedger`] traits on top of Diesel and PostgreSQL.
//! Row locking (`FOR UPDATE SKIP LOCKED`) inside the claim transaction is
//! the synchronization primitive that lets many worker processes share one
//! ledger safely.

mod connection;
mod credential_store;
mod models;
mod ops;
mod rate_ledger;
pub mod schema;

pub use connection::{PgPool, establish_connection, establish_pool, run_migrations};
pub use credential_store::PostgresCredentialStore;
pub use models::{CredentialRow, NewCredentialRow, NewRateLedgerRow, RateLedgerRow};
pub use rate_ledger::PostgresRateLedger;
