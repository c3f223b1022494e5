//! PostgreSQL implementation of the rate ledger.

use crate::connection::PgPool;
use crate::ops;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gleaner_core::{LedgerEntry, OperationCategory, SelectionOrder};
use gleaner_error::{GleanerError, GleanerResult, LedgerError, LedgerErrorKind};
use gleaner_interface::{LeaseGrant, RateLedger, UsageSnapshot};
use std::time::Duration;
use tracing::instrument;

/// Rate ledger backed by PostgreSQL row locking.
///
/// Many worker processes share one ledger; `SELECT ... FOR UPDATE SKIP
/// LOCKED` inside each claim transaction is what guarantees an entry is
/// leased by exactly one of them. Connections come from an r2d2 pool and
/// the blocking Diesel work runs on the Tokio blocking thread pool.
///
/// # Example
/// ```no_run
/// use gleaner_database::{PostgresRateLedger, establish_pool};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = establish_pool(10)?;
/// let ledger = PostgresRateLedger::new(pool);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PostgresRateLedger {
    pool: PgPool,
}

impl PostgresRateLedger {
    /// Create a new ledger over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run a blocking ledger operation on the Tokio blocking pool.
    async fn run<T, F>(&self, op: F) -> GleanerResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut diesel::pg::PgConnection) -> Result<T, LedgerError> + Send + 'static,
    {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| LedgerError::new(LedgerErrorKind::Pool(e.to_string())))?;
            op(&mut conn)
        })
        .await
        .map_err(|e| {
            GleanerError::from(LedgerError::new(LedgerErrorKind::Query(e.to_string())))
        })?
        .map_err(Into::into)
    }
}

#[async_trait]
impl RateLedger for PostgresRateLedger {
    #[instrument(skip(self), fields(%category))]
    async fn claim(
        &self,
        category: &OperationCategory,
        order: SelectionOrder,
        ttl: Duration,
    ) -> GleanerResult<Option<LeaseGrant>> {
        let category = category.as_str().to_string();
        self.run(move |conn| ops::claim(conn, &category, order, ttl))
            .await
    }

    #[instrument(skip(self), fields(%category))]
    async fn earliest_cooldown(
        &self,
        category: &OperationCategory,
    ) -> GleanerResult<Option<LedgerEntry>> {
        let category = category.as_str().to_string();
        self.run(move |conn| {
            ops::earliest_cooldown(conn, &category).map(|row| row.map(Into::into))
        })
        .await
    }

    #[instrument(skip(self), fields(%category))]
    async fn earliest_checkin(
        &self,
        category: &OperationCategory,
    ) -> GleanerResult<Option<LedgerEntry>> {
        let category = category.as_str().to_string();
        self.run(move |conn| {
            ops::earliest_checkin(conn, &category).map(|row| row.map(Into::into))
        })
        .await
    }

    #[instrument(skip(self), fields(%category))]
    async fn mark_cooldown(
        &self,
        credential_id: i32,
        category: &OperationCategory,
        reset_time: DateTime<Utc>,
    ) -> GleanerResult<()> {
        let category = category.as_str().to_string();
        self.run(move |conn| ops::mark_cooldown(conn, credential_id, &category, reset_time))
            .await
    }

    #[instrument(skip(self), fields(%category))]
    async fn record_usage(
        &self,
        credential_id: i32,
        category: &OperationCategory,
        usage: UsageSnapshot,
    ) -> GleanerResult<()> {
        let category = category.as_str().to_string();
        self.run(move |conn| ops::record_usage(conn, credential_id, &category, usage))
            .await
    }

    #[instrument(skip(self))]
    async fn invalidate_credential(&self, credential_id: i32) -> GleanerResult<()> {
        self.run(move |conn| ops::invalidate_credential(conn, credential_id))
            .await
    }

    #[instrument(skip(self), fields(%category))]
    async fn credential_count(&self, category: &OperationCategory) -> GleanerResult<usize> {
        let category = category.as_str().to_string();
        self.run(move |conn| ops::credential_count(conn, &category))
            .await
    }
}
