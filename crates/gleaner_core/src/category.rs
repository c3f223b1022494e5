//! Operation category types.

use serde::{Deserialize, Serialize};

/// A logical grouping of remote operations sharing one independent rate limit.
///
/// Upstream services limit each category separately, so the same credential
/// can be exhausted for one category while remaining usable for another.
/// Categories are deployment-specific strings resolved from configuration,
/// never hard-coded operation names.
///
/// # Examples
///
/// ```
/// use gleaner_core::OperationCategory;
///
/// let search = OperationCategory::new("search");
/// assert_eq!(search.as_str(), "search");
/// assert_eq!(format!("{}", search), "search");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("{}", _0)]
pub struct OperationCategory(String);

impl OperationCategory {
    /// Create a category from its configured name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The category name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OperationCategory {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for OperationCategory {
    fn from(name: String) -> Self {
        Self(name)
    }
}
