//! PostgreSQL implementation of the credential store.

use crate::connection::PgPool;
use crate::ops;
use async_trait::async_trait;
use gleaner_core::Credential;
use gleaner_error::{GleanerError, GleanerResult, LedgerError, LedgerErrorKind};
use gleaner_interface::CredentialStore;
use tracing::instrument;

/// Credential store backed by the same PostgreSQL database as the ledger.
///
/// Credentials are never deleted. Invalidation flips the validity flag on
/// the credential and every one of its ledger rows in one transaction, so
/// past leases stay attributable.
#[derive(Clone)]
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    /// Create a new store over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    #[instrument(skip(self))]
    async fn list(&self) -> GleanerResult<Vec<Credential>> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| LedgerError::new(LedgerErrorKind::Pool(e.to_string())))?;
            ops::list_credentials(&mut conn)
                .map(|rows| rows.into_iter().map(Into::into).collect())
        })
        .await
        .map_err(|e| {
            GleanerError::from(LedgerError::new(LedgerErrorKind::Query(e.to_string())))
        })?
        .map_err(Into::into)
    }

    #[instrument(skip(self))]
    async fn invalidate(&self, credential_id: i32) -> GleanerResult<()> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| LedgerError::new(LedgerErrorKind::Pool(e.to_string())))?;
            ops::invalidate_credential(&mut conn, credential_id)
        })
        .await
        .map_err(|e| {
            GleanerError::from(LedgerError::new(LedgerErrorKind::Query(e.to_string())))
        })?
        .map_err(Into::into)
    }
}
