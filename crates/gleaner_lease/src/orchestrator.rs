//! Call execution with credential rotation and bounded retries.

use crate::LeasingEngine;
use gleaner_core::OperationCategory;
use gleaner_error::{
    GleanerResult, LeaseError, LeaseErrorKind, UpstreamError, UpstreamErrorKind,
};
use gleaner_interface::{CallOutcome, ClientAdapter};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Wraps actual remote calls: applies the leased credential, interprets
/// upstream errors, updates the ledger, and rotates to a different
/// credential when the current one hits its rate limit.
///
/// Retrying is an explicit bounded loop, never recursion. The budget covers
/// retries beyond the initial attempt and defaults to the number of distinct
/// credentials configured for the category, so a rate-limited call gets one
/// chance on each other credential. With a single credential that means one
/// chance after its cooldown passes.
///
/// # Example
///
/// ```rust,ignore
/// use gleaner_lease::RetryOrchestrator;
///
/// let orchestrator = RetryOrchestrator::new(engine);
/// let response = orchestrator.execute(&"search".into(), &op).await?;
/// ```
pub struct RetryOrchestrator<A> {
    engine: Arc<LeasingEngine<A>>,
}

impl<A: ClientAdapter> RetryOrchestrator<A> {
    /// Create a new orchestrator over a leasing engine.
    pub fn new(engine: Arc<LeasingEngine<A>>) -> Self {
        Self { engine }
    }

    /// The leasing engine this orchestrator draws credentials from.
    pub fn engine(&self) -> &Arc<LeasingEngine<A>> {
        &self.engine
    }

    /// Perform `op` against the upstream service, leasing and rotating
    /// credentials as needed.
    ///
    /// Rate-limit responses mark the entry's cooldown and move to another
    /// credential; transient failures back off a fixed interval and retry on
    /// the same one. Both consume the shared retry budget. Unrecognized
    /// failures never retry: the error surfaces immediately with the
    /// category, credential, and original detail, and the lease is retained
    /// until its natural TTL expiry.
    #[instrument(skip(self, op), fields(%category))]
    pub async fn execute(
        &self,
        category: &OperationCategory,
        op: &A::Op,
    ) -> GleanerResult<A::Response> {
        let config = self.engine.config();
        let retry_budget = match config.max_retries {
            Some(budget) => budget.max(1),
            None => {
                let count = self.engine.ledger().credential_count(category).await?;
                (count as u32).max(1)
            }
        };

        let mut failures = 0u32;
        loop {
            let credential = self.engine.checkout(category).await?;

            match self.engine.adapter().call(op).await {
                CallOutcome::Success { response, usage } => {
                    if let Some(usage) = usage {
                        // Counters are informational; a successful call never
                        // fails because they could not be written.
                        if let Err(e) = self
                            .engine
                            .ledger()
                            .record_usage(credential.id, category, usage)
                            .await
                        {
                            warn!(
                                credential = credential.id,
                                error = %e,
                                "failed to record usage counters"
                            );
                        }
                    }
                    debug!(credential = credential.id, "call succeeded");
                    return Ok(response);
                }

                CallOutcome::RateLimited { reset_time } => {
                    warn!(
                        credential = credential.id,
                        %reset_time,
                        "rate limit exceeded, marking cooldown"
                    );
                    self.engine
                        .ledger()
                        .mark_cooldown(credential.id, category, reset_time)
                        .await?;
                    self.engine.release(category).await;

                    failures += 1;
                    if failures > retry_budget {
                        let last = UpstreamErrorKind::RateLimited {
                            category: category.to_string(),
                            credential_id: credential.id,
                            reset_time,
                        };
                        return Err(exhausted(category, failures, &last).into());
                    }
                }

                CallOutcome::Transient { detail } => {
                    warn!(
                        credential = credential.id,
                        %detail,
                        "transient upstream error, backing off"
                    );

                    failures += 1;
                    if failures > retry_budget {
                        let last = UpstreamErrorKind::Transient {
                            category: category.to_string(),
                            credential_id: credential.id,
                            detail,
                        };
                        return Err(exhausted(category, failures, &last).into());
                    }
                    tokio::time::sleep(config.transient_backoff()).await;
                }

                CallOutcome::Unrecognized { detail } => {
                    // Fail fast: unrecognized failures are not retried, and
                    // the lease stays in place until its TTL expires.
                    return Err(UpstreamError::new(UpstreamErrorKind::Unrecognized {
                        category: category.to_string(),
                        credential_id: credential.id,
                        detail,
                    })
                    .into());
                }
            }
        }
    }
}

/// Build the surfaced error for a spent retry budget.
fn exhausted(
    category: &OperationCategory,
    attempts: u32,
    last: &UpstreamErrorKind,
) -> LeaseError {
    LeaseError::new(LeaseErrorKind::RetriesExhausted {
        category: category.to_string(),
        attempts,
        last_error: last.to_string(),
    })
}
