//! The leasing engine: claim, wait, validate, repeat.

use crate::LeaseConfig;
use gleaner_core::{Credential, OperationCategory};
use gleaner_error::{GleanerResult, LeaseError, LeaseErrorKind};
use gleaner_interface::{ApplyOutcome, ClientAdapter, RateLedger};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Process-local lease bookkeeping.
///
/// `held` maps each category to the credential this process has leased for
/// it; `applied` is the credential currently authenticated on the adapter.
/// Neither survives a crash: the ledger entry simply expires by TTL.
#[derive(Debug, Default)]
struct LeaseState {
    held: HashMap<OperationCategory, Credential>,
    applied: Option<i32>,
}

/// Selects, locks, and leases an available credential for a requested
/// operation category, blocking until one frees up.
///
/// All cross-process coordination happens in the ledger's transactions; the
/// engine's own state only tracks what this process holds. Waiting is
/// sleep-based: upstream-dictated when entries are cooling down, heuristic
/// (lease expiry plus bounded random jitter) when every entry is leased by
/// other workers.
///
/// # Example
///
/// ```rust,ignore
/// use gleaner_lease::{LeasingEngine, LeaseConfig};
///
/// let engine = LeasingEngine::new(ledger, adapter, LeaseConfig::default());
/// let credential = engine.acquire(&"search".into()).await?;
/// // credential is applied on the adapter and leased in the ledger
/// ```
pub struct LeasingEngine<A> {
    ledger: Arc<dyn RateLedger>,
    adapter: Arc<A>,
    config: LeaseConfig,
    state: Mutex<LeaseState>,
}

impl<A: ClientAdapter> LeasingEngine<A> {
    /// Create a new leasing engine.
    ///
    /// Configuration is passed in explicitly; the engine reads nothing from
    /// process-global state.
    pub fn new(ledger: Arc<dyn RateLedger>, adapter: Arc<A>, config: LeaseConfig) -> Self {
        Self {
            ledger,
            adapter,
            config,
            state: Mutex::new(LeaseState::default()),
        }
    }

    /// The shared rate ledger this engine claims from.
    pub fn ledger(&self) -> &Arc<dyn RateLedger> {
        &self.ledger
    }

    /// The client adapter credentials are applied through.
    pub fn adapter(&self) -> &Arc<A> {
        &self.adapter
    }

    /// The leasing configuration.
    pub fn config(&self) -> &LeaseConfig {
        &self.config
    }

    /// Acquire a credential for `category`, blocking until one is available.
    ///
    /// Claims an available entry, applies its credential through the
    /// adapter, and records the lease locally. Credentials the upstream
    /// rejects on apply are invalidated and selection starts over. When
    /// nothing is claimable the engine sleeps until the nearest cooldown or
    /// lease expiry and re-queries; losing that race to another worker just
    /// means another round through the loop.
    ///
    /// The loop carries no iteration bound; it represents "wait until a
    /// resource is free". Only a category with no usable entries errors, with
    /// [`LeaseErrorKind::NoCredentials`]. Cancellation is the caller's
    /// concern.
    #[instrument(skip(self), fields(%category))]
    pub async fn acquire(&self, category: &OperationCategory) -> GleanerResult<Credential> {
        loop {
            if let Some(grant) = self
                .ledger
                .claim(category, self.config.order, self.config.ttl())
                .await?
            {
                let credential = grant.credential;
                match self.adapter.apply(&credential).await? {
                    ApplyOutcome::Ready => {
                        debug!(credential = credential.id, "leased credential");
                        let mut state = self.state.lock().await;
                        state.applied = Some(credential.id);
                        state.held.insert(category.clone(), credential.clone());
                        return Ok(credential);
                    }
                    ApplyOutcome::Invalid(reason) => {
                        warn!(
                            credential = credential.id,
                            %reason,
                            "credential rejected on apply, invalidating"
                        );
                        self.ledger.invalidate_credential(credential.id).await?;
                        self.forget_credential(credential.id).await;
                        continue;
                    }
                }
            }

            // Nothing claimable. Entries cooling down resolve first; if none
            // are, every entry is leased and the nearest check-in wins.
            if let Some(entry) = self.ledger.earliest_cooldown(category).await? {
                let wait = until(entry.reset_time);
                debug!(
                    credential = entry.credential_id,
                    wait_ms = wait.as_millis() as u64,
                    "all candidates cooling down, waiting for earliest reset"
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            if let Some(entry) = self.ledger.earliest_checkin(category).await? {
                let wait = until(entry.checkin_due) + self.jitter();
                debug!(
                    credential = entry.credential_id,
                    wait_ms = wait.as_millis() as u64,
                    "all candidates leased, waiting for earliest check-in"
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            return Err(LeaseError::new(LeaseErrorKind::NoCredentials(
                category.to_string(),
            ))
            .into());
        }
    }

    /// Return the credential to use for `category`, acquiring one if needed.
    ///
    /// A lease this process already holds is reused directly; if another
    /// credential has been applied since (the process is juggling multiple
    /// categories), the held one is re-applied first, which is cheap and
    /// local. Without a held lease this falls through to [`Self::acquire`].
    #[instrument(skip(self), fields(%category))]
    pub async fn checkout(&self, category: &OperationCategory) -> GleanerResult<Credential> {
        let held = {
            let state = self.state.lock().await;
            state
                .held
                .get(category)
                .cloned()
                .map(|credential| (credential, state.applied))
        };

        if let Some((credential, applied)) = held {
            if applied == Some(credential.id) {
                return Ok(credential);
            }

            match self.adapter.apply(&credential).await? {
                ApplyOutcome::Ready => {
                    debug!(credential = credential.id, "re-applied held credential");
                    let mut state = self.state.lock().await;
                    state.applied = Some(credential.id);
                    return Ok(credential);
                }
                ApplyOutcome::Invalid(reason) => {
                    warn!(
                        credential = credential.id,
                        %reason,
                        "held credential rejected on re-apply, invalidating"
                    );
                    self.ledger.invalidate_credential(credential.id).await?;
                    self.forget_credential(credential.id).await;
                }
            }
        }

        self.acquire(category).await
    }

    /// The credential this process holds for `category`, if any.
    pub async fn held(&self, category: &OperationCategory) -> Option<Credential> {
        self.state.lock().await.held.get(category).cloned()
    }

    /// Drop the local lease for `category`.
    ///
    /// Purely local bookkeeping: the ledger entry keeps whatever state the
    /// caller gave it (a cooldown mark, or a lease left to expire by TTL).
    pub async fn release(&self, category: &OperationCategory) {
        self.state.lock().await.held.remove(category);
    }

    /// Drop every local trace of a credential that turned out invalid.
    async fn forget_credential(&self, credential_id: i32) {
        let mut state = self.state.lock().await;
        state.held.retain(|_, held| held.id != credential_id);
        if state.applied == Some(credential_id) {
            state.applied = None;
        }
    }

    /// Random delay up to the configured cap, so workers waiting on the same
    /// check-in don't wake and re-query the ledger simultaneously.
    fn jitter(&self) -> Duration {
        let cap = self.config.max_jitter_ms;
        if cap == 0 {
            return Duration::ZERO;
        }
        let mut rng = rand::thread_rng();
        Duration::from_millis(rng.gen_range(0..=cap))
    }
}

/// Time from now until `instant`, or zero if it already passed.
fn until(instant: DateTime<Utc>) -> Duration {
    (instant - Utc::now()).to_std().unwrap_or(Duration::ZERO)
}
