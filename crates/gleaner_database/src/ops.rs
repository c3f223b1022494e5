//! Blocking Diesel operations shared by the repository types.
//!
//! Every function here takes `&mut PgConnection` and runs on the calling
//! thread; the async repositories move them onto the Tokio blocking pool.
//! State changes commit as a single transaction or not at all.

use crate::models::{CredentialRow, RateLedgerRow};
use crate::schema::{credentials, rate_ledger};
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::Double;
use gleaner_core::SelectionOrder;
use gleaner_error::{LedgerError, LedgerErrorKind};
use gleaner_interface::{LeaseGrant, UsageSnapshot};
use std::time::Duration;

diesel::define_sql_function! {
    /// PostgreSQL `random()`, used for randomized claim ordering.
    fn random() -> Double;
}

/// Select one available entry for `category` and lease it for `ttl`.
///
/// The candidate row is read with `FOR UPDATE SKIP LOCKED` inside the same
/// transaction that writes the new `checkin_due`, so the read-decide-write
/// sequence holds the row lock end to end and no two workers can claim the
/// same entry. Rows another worker has locked are skipped, not waited on.
pub(crate) fn claim(
    conn: &mut PgConnection,
    category: &str,
    order: SelectionOrder,
    ttl: Duration,
) -> Result<Option<LeaseGrant>, LedgerError> {
    let ttl = chrono::Duration::from_std(ttl)
        .map_err(|e| LedgerError::new(LedgerErrorKind::Transaction(format!("invalid ttl: {e}"))))?;

    conn.transaction::<_, LedgerError, _>(|conn| {
        let now = Utc::now();

        let candidate: Option<RateLedgerRow> = match order {
            SelectionOrder::Sequential => rate_ledger::table
                .filter(rate_ledger::category.eq(category))
                .filter(rate_ledger::is_valid.eq(true))
                .filter(rate_ledger::checkin_due.lt(now))
                .filter(rate_ledger::reset_time.lt(now))
                .filter(rate_ledger::credential_id.eq_any(valid_credential_ids()))
                .order(rate_ledger::credential_id.asc())
                .for_update()
                .skip_locked()
                .first(conn)
                .optional()?,
            SelectionOrder::Random => rate_ledger::table
                .filter(rate_ledger::category.eq(category))
                .filter(rate_ledger::is_valid.eq(true))
                .filter(rate_ledger::checkin_due.lt(now))
                .filter(rate_ledger::reset_time.lt(now))
                .filter(rate_ledger::credential_id.eq_any(valid_credential_ids()))
                .order(random())
                .for_update()
                .skip_locked()
                .first(conn)
                .optional()?,
        };

        let Some(row) = candidate else {
            return Ok(None);
        };

        let leased: RateLedgerRow =
            diesel::update(rate_ledger::table.find((row.credential_id, row.category)))
                .set((
                    rate_ledger::checkin_due.eq(now + ttl),
                    rate_ledger::updated_at.eq(now),
                ))
                .get_result(conn)?;

        let credential: CredentialRow = credentials::table.find(leased.credential_id).first(conn)?;

        Ok(Some(LeaseGrant {
            credential: credential.into(),
            entry: leased.into(),
        }))
    })
}

/// Among unleased entries still cooling down, the one whose cooldown ends
/// first.
pub(crate) fn earliest_cooldown(
    conn: &mut PgConnection,
    category: &str,
) -> Result<Option<RateLedgerRow>, LedgerError> {
    let now = Utc::now();

    rate_ledger::table
        .filter(rate_ledger::category.eq(category))
        .filter(rate_ledger::is_valid.eq(true))
        .filter(rate_ledger::checkin_due.lt(now))
        .filter(rate_ledger::reset_time.gt(now))
        .filter(rate_ledger::credential_id.eq_any(valid_credential_ids()))
        .order(rate_ledger::reset_time.asc())
        .first(conn)
        .optional()
        .map_err(Into::into)
}

/// Among all valid entries for the category, the one whose lease expires
/// first.
pub(crate) fn earliest_checkin(
    conn: &mut PgConnection,
    category: &str,
) -> Result<Option<RateLedgerRow>, LedgerError> {
    rate_ledger::table
        .filter(rate_ledger::category.eq(category))
        .filter(rate_ledger::is_valid.eq(true))
        .filter(rate_ledger::credential_id.eq_any(valid_credential_ids()))
        .order(rate_ledger::checkin_due.asc())
        .first(conn)
        .optional()
        .map_err(Into::into)
}

/// Record an upstream-signaled cooldown.
///
/// Sets `reset_time` to the exact upstream value and releases the lease by
/// pulling `checkin_due` back to now; a cooling entry must not also appear
/// leased. A single UPDATE, atomic on its own.
pub(crate) fn mark_cooldown(
    conn: &mut PgConnection,
    credential_id: i32,
    category: &str,
    reset_time: DateTime<Utc>,
) -> Result<(), LedgerError> {
    let now = Utc::now();

    let updated = diesel::update(rate_ledger::table.find((credential_id, category)))
        .set((
            rate_ledger::reset_time.eq(reset_time),
            rate_ledger::checkin_due.eq(now),
            rate_ledger::updated_at.eq(now),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(LedgerError::new(LedgerErrorKind::EntryNotFound(
            credential_id,
            category.to_string(),
        )));
    }

    Ok(())
}

/// Persist the last-seen upstream quota counters for an entry.
pub(crate) fn record_usage(
    conn: &mut PgConnection,
    credential_id: i32,
    category: &str,
    usage: UsageSnapshot,
) -> Result<(), LedgerError> {
    let updated = diesel::update(rate_ledger::table.find((credential_id, category)))
        .set((
            rate_ledger::quota_limit.eq(usage.limit),
            rate_ledger::quota_remaining.eq(usage.remaining),
            rate_ledger::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(LedgerError::new(LedgerErrorKind::EntryNotFound(
            credential_id,
            category.to_string(),
        )));
    }

    Ok(())
}

/// Mark a credential and all of its ledger entries invalid, in one
/// transaction. Already-invalid credentials keep their original
/// `invalidated_at`; invalidation history is append-only.
pub(crate) fn invalidate_credential(
    conn: &mut PgConnection,
    credential_id: i32,
) -> Result<(), LedgerError> {
    conn.transaction::<_, LedgerError, _>(|conn| {
        let now = Utc::now();

        diesel::update(
            credentials::table
                .find(credential_id)
                .filter(credentials::is_valid.eq(true)),
        )
        .set((
            credentials::is_valid.eq(false),
            credentials::invalidated_at.eq(now),
        ))
        .execute(conn)?;

        diesel::update(rate_ledger::table.filter(rate_ledger::credential_id.eq(credential_id)))
            .set((
                rate_ledger::is_valid.eq(false),
                rate_ledger::updated_at.eq(now),
            ))
            .execute(conn)?;

        Ok(())
    })
}

/// Number of valid entries configured for a category.
pub(crate) fn credential_count(
    conn: &mut PgConnection,
    category: &str,
) -> Result<usize, LedgerError> {
    let count: i64 = rate_ledger::table
        .filter(rate_ledger::category.eq(category))
        .filter(rate_ledger::is_valid.eq(true))
        .filter(rate_ledger::credential_id.eq_any(valid_credential_ids()))
        .count()
        .get_result(conn)?;

    Ok(count as usize)
}

/// Every credential, valid and invalid.
pub(crate) fn list_credentials(conn: &mut PgConnection) -> Result<Vec<CredentialRow>, LedgerError> {
    credentials::table
        .order(credentials::id.asc())
        .load(conn)
        .map_err(Into::into)
}

type ValidCredentialIds = diesel::dsl::Select<
    diesel::dsl::Filter<credentials::table, diesel::dsl::Eq<credentials::is_valid, bool>>,
    credentials::id,
>;

/// Subquery selecting the ids of valid credentials.
fn valid_credential_ids() -> ValidCredentialIds {
    credentials::table
        .filter(credentials::is_valid.eq(true))
        .select(credentials::id)
}
