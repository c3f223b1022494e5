//! Leasing engine error types.

/// Lease error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum LeaseErrorKind {
    /// The category has no usable ledger entries at all
    #[display("no usable credentials for category '{}'", _0)]
    NoCredentials(String),
    /// The retry budget for a call was spent without success
    #[display(
        "retries exhausted after {attempts} attempts for category '{category}': {last_error}"
    )]
    RetriesExhausted {
        /// Operation category the call was made against
        category: String,
        /// Number of attempts performed before giving up
        attempts: u32,
        /// The upstream error that ended the final attempt
        last_error: String,
    },
}

/// Lease error with source location tracking.
///
/// # Examples
///
/// ```
/// use gleaner_error::{LeaseError, LeaseErrorKind};
///
/// let err = LeaseError::new(LeaseErrorKind::NoCredentials("search".into()));
/// assert!(format!("{}", err).contains("no usable credentials"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Lease Error: {} at line {} in {}", kind, line, file)]
pub struct LeaseError {
    /// The kind of error that occurred
    pub kind: LeaseErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl LeaseError {
    /// Create a new LeaseError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: LeaseErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
