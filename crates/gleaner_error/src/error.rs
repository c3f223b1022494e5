//! Top-level error wrapper types.

use crate::{ConfigError, LeaseError, LedgerError, UpstreamError};

/// This is the foundation error enum, with one variant per error family.
///
/// # Examples
///
/// ```
/// use gleaner_error::{ConfigError, GleanerError};
///
/// let config_err = ConfigError::new("ttl_seconds must be positive");
/// let err: GleanerError = config_err.into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum GleanerErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Rate ledger error
    #[from(LedgerError)]
    Ledger(LedgerError),
    /// Leasing engine error
    #[from(LeaseError)]
    Lease(LeaseError),
    /// Upstream service error
    #[from(UpstreamError)]
    Upstream(UpstreamError),
}

/// Gleaner error with kind discrimination.
///
/// # Examples
///
/// ```
/// use gleaner_error::{GleanerResult, LeaseError, LeaseErrorKind};
///
/// fn pick_credential() -> GleanerResult<()> {
///     Err(LeaseError::new(LeaseErrorKind::NoCredentials("followers".into())))?
/// }
///
/// match pick_credential() {
///     Ok(_) => println!("Acquired"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Gleaner Error: {}", _0)]
pub struct GleanerError(Box<GleanerErrorKind>);

impl GleanerError {
    /// Create a new error from a kind.
    pub fn new(kind: GleanerErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GleanerErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to GleanerErrorKind
impl<T> From<T> for GleanerError
where
    T: Into<GleanerErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Gleaner operations.
///
/// # Examples
///
/// ```
/// use gleaner_error::{GleanerResult, LedgerError, LedgerErrorKind};
///
/// fn touch_ledger() -> GleanerResult<()> {
///     Err(LedgerError::new(LedgerErrorKind::Pool("timed out".into())))?
/// }
/// ```
pub type GleanerResult<T> = std::result::Result<T, GleanerError>;
