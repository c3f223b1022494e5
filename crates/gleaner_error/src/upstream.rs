//! Upstream service error types.
//!
//! Errors reported by the remote service through the client adapter. Only the
//! variants that survive the orchestrator's internal handling are surfaced to
//! callers, always with the category and credential that produced them.

use chrono::{DateTime, Utc};

/// Upstream error conditions.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum UpstreamErrorKind {
    /// Rate limit hit; upstream supplied the reset time
    #[display(
        "rate limit exceeded for credential {credential_id} in category '{category}', resets at {reset_time}"
    )]
    RateLimited {
        /// Operation category the call was made against
        category: String,
        /// Credential that hit the limit
        credential_id: i32,
        /// Upstream-reported reset time
        reset_time: DateTime<Utc>,
    },
    /// Upstream overloaded or transiently failing, no reset time given
    #[display("transient upstream error for credential {credential_id} in category '{category}': {detail}")]
    Transient {
        /// Operation category the call was made against
        category: String,
        /// Credential in use when the error occurred
        credential_id: i32,
        /// Original error detail
        detail: String,
    },
    /// Unrecognized upstream failure; never retried
    #[display(
        "unrecognized upstream error for credential {credential_id} in category '{category}': {detail}"
    )]
    Unrecognized {
        /// Operation category the call was made against
        category: String,
        /// Credential in use when the error occurred
        credential_id: i32,
        /// Original error detail
        detail: String,
    },
}

/// Upstream error with source location tracking.
///
/// # Examples
///
/// ```
/// use gleaner_error::{UpstreamError, UpstreamErrorKind};
///
/// let err = UpstreamError::new(UpstreamErrorKind::Unrecognized {
///     category: "search".into(),
///     credential_id: 3,
///     detail: "HTTP 418".into(),
/// });
/// assert!(format!("{}", err).contains("HTTP 418"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Upstream Error: {} at line {} in {}", kind, line, file)]
pub struct UpstreamError {
    /// The kind of error that occurred
    pub kind: UpstreamErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl UpstreamError {
    /// Create a new UpstreamError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: UpstreamErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
