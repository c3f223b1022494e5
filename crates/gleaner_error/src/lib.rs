//! Error types for the Gleaner library.
//!
//! This crate provides the foundation error types used throughout the Gleaner
//! workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use gleaner_error::{ConfigError, GleanerResult};
//!
//! fn load_settings() -> GleanerResult<String> {
//!     Err(ConfigError::new("missing [lease] section"))?
//! }
//!
//! match load_settings() {
//!     Ok(settings) => println!("Loaded: {}", settings),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod lease;
mod ledger;
mod upstream;

pub use config::ConfigError;
pub use error::{GleanerError, GleanerErrorKind, GleanerResult};
pub use lease::{LeaseError, LeaseErrorKind};
pub use ledger::{LedgerError, LedgerErrorKind};
pub use upstream::{UpstreamError, UpstreamErrorKind};
