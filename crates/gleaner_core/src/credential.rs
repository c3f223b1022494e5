//! Credential types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A distinct set of access keys usable to authenticate calls to the
/// external service.
///
/// The secret material is opaque to the core; whatever shape the client
/// adapter needs (a bare API key, an OAuth token tuple) travels through as
/// JSON. Credentials are created at bootstrap and never deleted, only
/// invalidated, so past leases remain attributable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Store identifier
    pub id: i32,
    /// Upstream account the credential belongs to
    pub account: String,
    /// Opaque secret material consumed by the client adapter
    pub secret: serde_json::Value,
    /// Whether the credential is still usable
    pub is_valid: bool,
    /// When the credential was ingested
    pub created_at: DateTime<Utc>,
    /// When the credential was invalidated, if it ever was
    pub invalidated_at: Option<DateTime<Utc>>,
}
