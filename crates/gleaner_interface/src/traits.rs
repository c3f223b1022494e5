//! Trait definitions for the credential store, rate ledger, and client adapter.

use crate::{ApplyOutcome, CallOutcome, LeaseGrant, UsageSnapshot};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gleaner_core::{Credential, LedgerEntry, OperationCategory, SelectionOrder};
use gleaner_error::GleanerResult;
use std::time::Duration;

/// Durable set of credentials and their validity flags.
///
/// Credentials are created at bootstrap, outside this core. Invalidation is
/// append-only history, never a physical delete.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// List every credential, valid and invalid.
    async fn list(&self) -> GleanerResult<Vec<Credential>>;

    /// Mark a credential invalid, together with all of its ledger entries,
    /// in one transaction.
    async fn invalidate(&self, credential_id: i32) -> GleanerResult<()>;
}

/// Durable per-(credential, category) leasing and cooldown state, the single
/// source of truth shared by every worker process.
///
/// Implementations must back each operation with a transaction; the ledger's
/// row locking is the only synchronization primitive between workers. No
/// operation may ever leave a partial state committed.
#[async_trait]
pub trait RateLedger: Send + Sync {
    /// Select an available entry for `category` and lease it, atomically.
    ///
    /// An entry is available when `now` is strictly past both its
    /// `checkin_due` and its `reset_time` and both the entry and its
    /// credential are valid. The selecting read must hold the row lock
    /// until the lease write commits, so that no two workers can claim the
    /// same entry. Returns `None` when nothing is available right now.
    async fn claim(
        &self,
        category: &OperationCategory,
        order: SelectionOrder,
        ttl: Duration,
    ) -> GleanerResult<Option<LeaseGrant>>;

    /// Among unleased entries still cooling down, the one whose cooldown
    /// ends first.
    async fn earliest_cooldown(
        &self,
        category: &OperationCategory,
    ) -> GleanerResult<Option<LedgerEntry>>;

    /// Among all valid entries for the category, the one whose lease expires
    /// first. Used when every entry is currently leased.
    async fn earliest_checkin(
        &self,
        category: &OperationCategory,
    ) -> GleanerResult<Option<LedgerEntry>>;

    /// Record an upstream-signaled cooldown: set `reset_time` to the exact
    /// upstream value and release the lease by resetting `checkin_due` to
    /// now. A cooling entry must not also appear leased.
    async fn mark_cooldown(
        &self,
        credential_id: i32,
        category: &OperationCategory,
        reset_time: DateTime<Utc>,
    ) -> GleanerResult<()>;

    /// Persist the last-seen upstream quota counters for an entry.
    /// Informational only.
    async fn record_usage(
        &self,
        credential_id: i32,
        category: &OperationCategory,
        usage: UsageSnapshot,
    ) -> GleanerResult<()>;

    /// Mark a credential and all of its entries invalid, in one transaction.
    async fn invalidate_credential(&self, credential_id: i32) -> GleanerResult<()>;

    /// Number of valid entries configured for a category; the natural bound
    /// for per-call retries.
    async fn credential_count(&self, category: &OperationCategory) -> GleanerResult<usize>;
}

/// The wire-level client consumed by the core.
///
/// The core is polymorphic over this contract and never inspects protocol
/// details. `Op` is an opaque description of one remote operation;
/// `Response` is whatever the adapter parses out of a successful call.
#[async_trait]
pub trait ClientAdapter: Send + Sync {
    /// Opaque remote operation description.
    type Op: Send + Sync;
    /// Parsed response payload.
    type Response: Send;

    /// Authenticate the client with `credential` and make it the active one.
    ///
    /// Returns [`ApplyOutcome::Invalid`] when upstream permanently rejects
    /// the credential. Errors are reserved for infrastructure failures in
    /// the adapter itself.
    async fn apply(&self, credential: &Credential) -> GleanerResult<ApplyOutcome>;

    /// Perform one remote call with the currently applied credential and
    /// classify the result.
    async fn call(&self, op: &Self::Op) -> CallOutcome<Self::Response>;
}
