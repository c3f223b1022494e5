//! Database row models for credentials and the rate ledger.

use crate::schema::{credentials, rate_ledger};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use gleaner_core::{Credential, LedgerEntry, OperationCategory};

/// A stored credential row.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = credentials)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CredentialRow {
    pub id: i32,
    pub account: String,
    pub secret: serde_json::Value,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
    pub invalidated_at: Option<DateTime<Utc>>,
}

/// New credential for insertion.
///
/// Bootstrap ingestion lives outside this crate; the insertable row types
/// are public so that tooling (and tests) can seed the store.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = credentials)]
pub struct NewCredentialRow {
    pub account: String,
    pub secret: serde_json::Value,
}

/// A rate ledger row, one per (credential, category) pair.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = rate_ledger)]
#[diesel(primary_key(credential_id, category))]
#[diesel(belongs_to(CredentialRow, foreign_key = credential_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RateLedgerRow {
    pub credential_id: i32,
    pub category: String,
    pub checkin_due: DateTime<Utc>,
    pub reset_time: DateTime<Utc>,
    pub quota_limit: Option<i64>,
    pub quota_remaining: Option<i64>,
    pub is_valid: bool,
    pub updated_at: DateTime<Utc>,
}

/// New ledger row for insertion.
///
/// Timestamps default to the epoch sentinel in the database, so a fresh row
/// is immediately available.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rate_ledger)]
pub struct NewRateLedgerRow {
    pub credential_id: i32,
    pub category: String,
}

impl From<CredentialRow> for Credential {
    fn from(row: CredentialRow) -> Self {
        Credential {
            id: row.id,
            account: row.account,
            secret: row.secret,
            is_valid: row.is_valid,
            created_at: row.created_at,
            invalidated_at: row.invalidated_at,
        }
    }
}

impl From<RateLedgerRow> for LedgerEntry {
    fn from(row: RateLedgerRow) -> Self {
        LedgerEntry {
            credential_id: row.credential_id,
            category: OperationCategory::new(row.category),
            checkin_due: row.checkin_due,
            reset_time: row.reset_time,
            quota_limit: row.quota_limit,
            quota_remaining: row.quota_remaining,
            is_valid: row.is_valid,
        }
    }
}
