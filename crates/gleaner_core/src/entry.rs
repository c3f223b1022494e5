//! Rate ledger entry types.

use crate::OperationCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the rate ledger: the leasing and cooldown state of a single
/// (credential, category) pair.
///
/// Exactly one entry exists per pair. An entry never moves backward through
/// its lifecycle by mutation; `checkin_due` and `reset_time` only become
/// stale as real time advances past them. The one sanctioned exception is
/// `mark_cooldown`, which pulls `checkin_due` back to "now" so a cooling
/// entry does not also appear leased.
///
/// Fresh entries carry the Unix epoch in both timestamp fields and are
/// therefore immediately available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Credential this entry belongs to
    pub credential_id: i32,
    /// Operation category this entry tracks
    pub category: OperationCategory,
    /// Leased until this instant; in the past when not leased
    pub checkin_due: DateTime<Utc>,
    /// Cooling down until this instant; in the past when not cooling
    pub reset_time: DateTime<Utc>,
    /// Last upstream-reported request quota, informational
    pub quota_limit: Option<i64>,
    /// Last upstream-reported remaining requests, informational
    pub quota_remaining: Option<i64>,
    /// Whether the entry (and its credential) is still usable
    pub is_valid: bool,
}

impl LedgerEntry {
    /// Whether this entry can be leased at `now`.
    ///
    /// An entry is available iff it is valid, its lease has expired, and any
    /// upstream cooldown has passed.
    pub fn is_available_at(&self, now: DateTime<Utc>) -> bool {
        self.is_valid && now > self.checkin_due && now > self.reset_time
    }

    /// Whether this entry is held by some worker at `now`.
    pub fn is_leased_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.checkin_due
    }

    /// Whether this entry is unleased but still cooling down at `now`.
    pub fn is_cooling_at(&self, now: DateTime<Utc>) -> bool {
        now > self.checkin_due && now <= self.reset_time
    }
}
