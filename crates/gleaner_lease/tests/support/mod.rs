//! In-memory test doubles for the ledger and the client adapter.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gleaner_core::{Credential, LedgerEntry, OperationCategory, SelectionOrder};
use gleaner_error::GleanerResult;
use gleaner_interface::{
    ApplyOutcome, CallOutcome, ClientAdapter, LeaseGrant, RateLedger, UsageSnapshot,
};
use rand::seq::IteratorRandom;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Rate ledger double holding everything under one mutex, so each operation
/// is atomic the way a database transaction would be.
pub struct MemoryLedger {
    state: Mutex<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    credentials: BTreeMap<i32, Credential>,
    entries: BTreeMap<(i32, String), LedgerEntry>,
    usage_events: Vec<(i32, String, UsageSnapshot)>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
        }
    }

    /// Add a credential with one fresh (epoch-sentinel) entry per category.
    pub fn add_credential(&self, id: i32, categories: &[&str]) {
        let mut state = self.state.lock().unwrap();
        state.credentials.insert(
            id,
            Credential {
                id,
                account: format!("account-{id}"),
                secret: serde_json::json!({ "api_key": format!("key-{id}") }),
                is_valid: true,
                created_at: Utc::now(),
                invalidated_at: None,
            },
        );
        for category in categories {
            state.entries.insert(
                (id, category.to_string()),
                LedgerEntry {
                    credential_id: id,
                    category: OperationCategory::new(*category),
                    checkin_due: DateTime::<Utc>::UNIX_EPOCH,
                    reset_time: DateTime::<Utc>::UNIX_EPOCH,
                    quota_limit: None,
                    quota_remaining: None,
                    is_valid: true,
                },
            );
        }
    }

    /// Snapshot of one entry, for assertions.
    pub fn entry(&self, credential_id: i32, category: &str) -> LedgerEntry {
        self.state.lock().unwrap().entries[&(credential_id, category.to_string())].clone()
    }

    /// Whether a credential is still valid.
    pub fn credential_is_valid(&self, credential_id: i32) -> bool {
        self.state.lock().unwrap().credentials[&credential_id].is_valid
    }

    /// Pretend some other worker holds the entry until `checkin_due`.
    pub fn set_checkin_due(&self, credential_id: i32, category: &str, checkin_due: DateTime<Utc>) {
        let mut state = self.state.lock().unwrap();
        state
            .entries
            .get_mut(&(credential_id, category.to_string()))
            .expect("entry exists")
            .checkin_due = checkin_due;
    }

    /// Pretend upstream put the entry in cooldown until `reset_time`.
    pub fn set_reset_time(&self, credential_id: i32, category: &str, reset_time: DateTime<Utc>) {
        let mut state = self.state.lock().unwrap();
        state
            .entries
            .get_mut(&(credential_id, category.to_string()))
            .expect("entry exists")
            .reset_time = reset_time;
    }

    /// Usage snapshots recorded so far, in order.
    pub fn usage_events(&self) -> Vec<(i32, String, UsageSnapshot)> {
        self.state.lock().unwrap().usage_events.clone()
    }
}

#[async_trait]
impl RateLedger for MemoryLedger {
    async fn claim(
        &self,
        category: &OperationCategory,
        order: SelectionOrder,
        ttl: Duration,
    ) -> GleanerResult<Option<LeaseGrant>> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();

        let mut available: Vec<(i32, String)> = state
            .entries
            .values()
            .filter(|entry| {
                entry.category == *category
                    && entry.is_available_at(now)
                    && state.credentials[&entry.credential_id].is_valid
            })
            .map(|entry| (entry.credential_id, entry.category.as_str().to_string()))
            .collect();
        available.sort();

        let key = match order {
            SelectionOrder::Sequential => available.into_iter().next(),
            SelectionOrder::Random => available.into_iter().choose(&mut rand::thread_rng()),
        };

        let Some(key) = key else {
            return Ok(None);
        };

        let entry = state.entries.get_mut(&key).expect("entry exists");
        entry.checkin_due = now + chrono::Duration::from_std(ttl).expect("ttl fits");
        let entry = entry.clone();
        let credential = state.credentials[&entry.credential_id].clone();

        Ok(Some(LeaseGrant { credential, entry }))
    }

    async fn earliest_cooldown(
        &self,
        category: &OperationCategory,
    ) -> GleanerResult<Option<LedgerEntry>> {
        let state = self.state.lock().unwrap();
        let now = Utc::now();

        Ok(state
            .entries
            .values()
            .filter(|entry| {
                entry.category == *category
                    && entry.is_valid
                    && state.credentials[&entry.credential_id].is_valid
                    && entry.checkin_due < now
                    && entry.reset_time > now
            })
            .min_by_key(|entry| entry.reset_time)
            .cloned())
    }

    async fn earliest_checkin(
        &self,
        category: &OperationCategory,
    ) -> GleanerResult<Option<LedgerEntry>> {
        let state = self.state.lock().unwrap();

        Ok(state
            .entries
            .values()
            .filter(|entry| {
                entry.category == *category
                    && entry.is_valid
                    && state.credentials[&entry.credential_id].is_valid
            })
            .min_by_key(|entry| entry.checkin_due)
            .cloned())
    }

    async fn mark_cooldown(
        &self,
        credential_id: i32,
        category: &OperationCategory,
        reset_time: DateTime<Utc>,
    ) -> GleanerResult<()> {
        let mut state = self.state.lock().unwrap();
        let entry = state
            .entries
            .get_mut(&(credential_id, category.as_str().to_string()))
            .expect("entry exists");
        entry.reset_time = reset_time;
        entry.checkin_due = Utc::now();
        Ok(())
    }

    async fn record_usage(
        &self,
        credential_id: i32,
        category: &OperationCategory,
        usage: UsageSnapshot,
    ) -> GleanerResult<()> {
        let mut state = self.state.lock().unwrap();
        let entry = state
            .entries
            .get_mut(&(credential_id, category.as_str().to_string()))
            .expect("entry exists");
        entry.quota_limit = usage.limit;
        entry.quota_remaining = usage.remaining;
        state
            .usage_events
            .push((credential_id, category.as_str().to_string(), usage));
        Ok(())
    }

    async fn invalidate_credential(&self, credential_id: i32) -> GleanerResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(credential) = state.credentials.get_mut(&credential_id) {
            credential.is_valid = false;
            credential.invalidated_at = Some(Utc::now());
        }
        for entry in state.entries.values_mut() {
            if entry.credential_id == credential_id {
                entry.is_valid = false;
            }
        }
        Ok(())
    }

    async fn credential_count(&self, category: &OperationCategory) -> GleanerResult<usize> {
        let state = self.state.lock().unwrap();

        Ok(state
            .entries
            .values()
            .filter(|entry| {
                entry.category == *category
                    && entry.is_valid
                    && state.credentials[&entry.credential_id].is_valid
            })
            .count())
    }
}

/// A remote operation as the adapter sees it; opaque to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestOp(pub &'static str);

/// Client adapter double with scripted outcomes.
///
/// Apply outcomes are scripted per credential (defaulting to `Ready`); call
/// outcomes are consumed in order (defaulting to a plain success). Every
/// apply and call is recorded for assertions.
pub struct ScriptedAdapter {
    apply_outcomes: Mutex<HashMap<i32, VecDeque<ApplyOutcome>>>,
    call_outcomes: Mutex<VecDeque<CallOutcome<String>>>,
    applied: Mutex<Vec<i32>>,
    calls: Mutex<Vec<i32>>,
    current: Mutex<Option<i32>>,
}

impl ScriptedAdapter {
    pub fn new() -> Self {
        Self {
            apply_outcomes: Mutex::new(HashMap::new()),
            call_outcomes: Mutex::new(VecDeque::new()),
            applied: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            current: Mutex::new(None),
        }
    }

    /// Script the next apply outcome for one credential.
    pub fn push_apply(&self, credential_id: i32, outcome: ApplyOutcome) {
        self.apply_outcomes
            .lock()
            .unwrap()
            .entry(credential_id)
            .or_default()
            .push_back(outcome);
    }

    /// Script the next call outcome.
    pub fn push_call(&self, outcome: CallOutcome<String>) {
        self.call_outcomes.lock().unwrap().push_back(outcome);
    }

    /// Credential ids in apply order.
    pub fn applied(&self) -> Vec<i32> {
        self.applied.lock().unwrap().clone()
    }

    /// Credential ids active at each call, in call order.
    pub fn calls(&self) -> Vec<i32> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClientAdapter for ScriptedAdapter {
    type Op = TestOp;
    type Response = String;

    async fn apply(&self, credential: &Credential) -> GleanerResult<ApplyOutcome> {
        let outcome = self
            .apply_outcomes
            .lock()
            .unwrap()
            .get_mut(&credential.id)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(ApplyOutcome::Ready);

        self.applied.lock().unwrap().push(credential.id);
        if outcome == ApplyOutcome::Ready {
            *self.current.lock().unwrap() = Some(credential.id);
        }
        Ok(outcome)
    }

    async fn call(&self, _op: &TestOp) -> CallOutcome<String> {
        let credential = self.current.lock().unwrap().expect("a credential is applied");
        self.calls.lock().unwrap().push(credential);

        self.call_outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| CallOutcome::Success {
                response: "ok".to_string(),
                usage: None,
            })
    }
}
