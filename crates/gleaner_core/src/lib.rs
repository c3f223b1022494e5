//! Core data types for the Gleaner credential-leasing library.
//!
//! This crate provides the foundation data types shared across the Gleaner
//! workspace: credentials, operation categories, ledger entries, and the
//! selection ordering strategy.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod category;
mod credential;
mod entry;
mod selection;

pub use category::OperationCategory;
pub use credential::Credential;
pub use entry::LedgerEntry;
pub use selection::SelectionOrder;
