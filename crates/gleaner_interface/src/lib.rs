//! Trait definitions for the Gleaner credential-leasing library.
//!
//! This crate provides the seams between the leasing core and its
//! collaborators: the durable credential store, the shared rate ledger, and
//! the client adapter that performs the actual remote calls.

mod traits;
mod types;

pub use traits::{ClientAdapter, CredentialStore, RateLedger};
pub use types::{ApplyOutcome, CallOutcome, LeaseGrant, UsageSnapshot};
