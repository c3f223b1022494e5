//! Rate ledger error types.

/// Ledger error conditions.
///
/// Any transaction failure against the ledger aborts the current attempt;
/// no partial state is ever committed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum LedgerErrorKind {
    /// Connection failed
    #[display("Ledger connection error: {}", _0)]
    Connection(String),
    /// Connection pool checkout failed
    #[display("Ledger pool error: {}", _0)]
    Pool(String),
    /// Query execution failed
    #[display("Ledger query error: {}", _0)]
    Query(String),
    /// Transaction aborted and rolled back
    #[display("Ledger transaction error: {}", _0)]
    Transaction(String),
    /// No ledger row for the requested (credential, category) pair
    #[display("Ledger entry not found for credential {} in category '{}'", _0, _1)]
    EntryNotFound(i32, String),
    /// Migration error
    #[display("Migration error: {}", _0)]
    Migration(String),
}

/// Ledger error with source location tracking.
///
/// # Examples
///
/// ```
/// use gleaner_error::{LedgerError, LedgerErrorKind};
///
/// let err = LedgerError::new(LedgerErrorKind::EntryNotFound(7, "search".into()));
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Ledger Error: {} at line {} in {}", kind, line, file)]
pub struct LedgerError {
    /// The kind of error that occurred
    pub kind: LedgerErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl LedgerError {
    /// Create a new LedgerError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: LedgerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

// Diesel error conversions (only available with database feature)
#[cfg(feature = "database")]
impl From<diesel::result::Error> for LedgerError {
    fn from(err: diesel::result::Error) -> Self {
        LedgerError::new(LedgerErrorKind::Query(err.to_string()))
    }
}

#[cfg(feature = "database")]
impl From<diesel::ConnectionError> for LedgerError {
    fn from(err: diesel::ConnectionError) -> Self {
        LedgerError::new(LedgerErrorKind::Connection(err.to_string()))
    }
}

#[cfg(feature = "database")]
impl From<diesel::r2d2::PoolError> for LedgerError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        LedgerError::new(LedgerErrorKind::Pool(err.to_string()))
    }
}
