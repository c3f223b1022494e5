//! Core type definitions for the Gleaner interface.

use chrono::{DateTime, Utc};
use gleaner_core::{Credential, LedgerEntry};
use serde::{Deserialize, Serialize};

/// A freshly claimed ledger entry joined with its credential.
///
/// Produced by [`crate::RateLedger::claim`]; the entry reflects the state
/// committed by the claim transaction (its `checkin_due` already carries the
/// new lease TTL).
#[derive(Debug, Clone, PartialEq)]
pub struct LeaseGrant {
    /// The credential the worker may now apply
    pub credential: Credential,
    /// The leased ledger entry
    pub entry: LedgerEntry,
}

/// Outcome of applying a credential to the upstream client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The credential authenticated and the client is ready to call
    Ready,
    /// Upstream permanently rejected the credential
    Invalid(String),
}

/// Upstream rate-limit counters observed on a successful call.
///
/// Services report these alongside responses (rate-limit response headers);
/// the ledger records them for operators, never for leasing decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Request quota for the current window, if reported
    pub limit: Option<i64>,
    /// Requests remaining in the current window, if reported
    pub remaining: Option<i64>,
}

/// Outcome of one remote call attempt, classified by the adapter.
///
/// The adapter owns wire-protocol knowledge; the core only ever sees this
/// classification. Anything the adapter does not positively recognize must
/// be reported as `Unrecognized` so the orchestrator fails fast instead of
/// retrying blindly.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome<R> {
    /// The call succeeded
    Success {
        /// Response payload
        response: R,
        /// Rate-limit counters, when upstream reported them
        usage: Option<UsageSnapshot>,
    },
    /// Upstream signaled the rate limit was hit
    RateLimited {
        /// Upstream-reported instant at which the limit resets
        reset_time: DateTime<Utc>,
    },
    /// Upstream overloaded or transiently failing; no reset time given
    Transient {
        /// Original error detail
        detail: String,
    },
    /// Unrecognized upstream failure; never retried
    Unrecognized {
        /// Original error detail
        detail: String,
    },
}
