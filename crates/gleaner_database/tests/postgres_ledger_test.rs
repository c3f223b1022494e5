//! Integration tests for the PostgreSQL ledger.
//!
//! These run against a live database and are ignored by default; point
//! `DATABASE_URL` at a disposable PostgreSQL instance and run with
//! `cargo test -- --ignored`. Each test works in its own category so the
//! tests do not interfere with one another.

use chrono::{Duration as ChronoDuration, Utc};
use diesel::prelude::*;
use gleaner_core::{OperationCategory, SelectionOrder};
use gleaner_database::schema::{credentials, rate_ledger};
use gleaner_database::{
    CredentialRow, NewCredentialRow, NewRateLedgerRow, PostgresRateLedger, establish_connection,
    establish_pool, run_migrations,
};
use gleaner_interface::{RateLedger, UsageSnapshot};
use std::time::Duration;

/// Insert a credential with one fresh ledger row per category, returning
/// the generated id.
fn seed_credential(conn: &mut PgConnection, account: &str, categories: &[&str]) -> i32 {
    let row: CredentialRow = diesel::insert_into(credentials::table)
        .values(NewCredentialRow {
            account: account.to_string(),
            secret: serde_json::json!({ "api_key": account }),
        })
        .get_result(conn)
        .unwrap();

    for category in categories {
        diesel::insert_into(rate_ledger::table)
            .values(NewRateLedgerRow {
                credential_id: row.id,
                category: category.to_string(),
            })
            .execute(conn)
            .unwrap();
    }

    row.id
}

fn setup(categories: &[&str], accounts: usize) -> (PostgresRateLedger, Vec<i32>) {
    let mut conn = establish_connection().unwrap();
    run_migrations(&mut conn).unwrap();

    let ids = (0..accounts)
        .map(|n| seed_credential(&mut conn, &format!("it-{}-{n}", categories[0]), categories))
        .collect();

    let pool = establish_pool(5).unwrap();
    (PostgresRateLedger::new(pool), ids)
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn claim_leases_the_lowest_credential_first() {
    let (ledger, ids) = setup(&["it_claim"], 2);
    let category = OperationCategory::new("it_claim");

    let grant = ledger
        .claim(&category, SelectionOrder::Sequential, Duration::from_secs(3600))
        .await
        .unwrap()
        .expect("an entry is available");

    assert_eq!(grant.credential.id, ids[0]);
    assert!(grant.entry.checkin_due > Utc::now() + ChronoDuration::seconds(3000));

    // The first entry is leased now; the next claim falls through to the
    // second credential.
    let grant = ledger
        .claim(&category, SelectionOrder::Sequential, Duration::from_secs(3600))
        .await
        .unwrap()
        .expect("second entry is available");
    assert_eq!(grant.credential.id, ids[1]);

    // Both leased: nothing left to claim.
    let none = ledger
        .claim(&category, SelectionOrder::Sequential, Duration::from_secs(3600))
        .await
        .unwrap();
    assert!(none.is_none());
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn concurrent_claims_never_hand_out_the_same_entry() {
    let (ledger, _) = setup(&["it_concurrent"], 2);
    let category = OperationCategory::new("it_concurrent");
    let ledger_a = ledger.clone();
    let ledger_b = ledger.clone();
    let category_a = category.clone();
    let category_b = category.clone();

    let (first, second) = tokio::join!(
        tokio::spawn(async move {
            ledger_a
                .claim(&category_a, SelectionOrder::Sequential, Duration::from_secs(3600))
                .await
                .unwrap()
                .expect("one entry each")
        }),
        tokio::spawn(async move {
            ledger_b
                .claim(&category_b, SelectionOrder::Sequential, Duration::from_secs(3600))
                .await
                .unwrap()
                .expect("one entry each")
        }),
    );

    let (first, second) = (first.unwrap(), second.unwrap());
    assert_ne!(first.credential.id, second.credential.id, "no double-lease");
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn mark_cooldown_sets_the_exact_reset_and_releases_the_lease() {
    let (ledger, ids) = setup(&["it_cooldown"], 1);
    let category = OperationCategory::new("it_cooldown");

    ledger
        .claim(&category, SelectionOrder::Sequential, Duration::from_secs(3600))
        .await
        .unwrap()
        .expect("entry available");

    let reset_time = Utc::now() + ChronoDuration::seconds(30);
    ledger
        .mark_cooldown(ids[0], &category, reset_time)
        .await
        .unwrap();

    // Cooling, not leased: the earliest-cooldown query sees it and a fresh
    // claim does not.
    let entry = ledger
        .earliest_cooldown(&category)
        .await
        .unwrap()
        .expect("entry is cooling down");
    assert_eq!(entry.reset_time, reset_time);
    assert!(entry.checkin_due <= Utc::now());

    let none = ledger
        .claim(&category, SelectionOrder::Sequential, Duration::from_secs(3600))
        .await
        .unwrap();
    assert!(none.is_none());
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn earliest_checkin_orders_by_lease_expiry() {
    let (ledger, ids) = setup(&["it_checkin"], 2);
    let category = OperationCategory::new("it_checkin");

    ledger
        .claim(&category, SelectionOrder::Sequential, Duration::from_secs(3600))
        .await
        .unwrap()
        .expect("first entry");
    ledger
        .claim(&category, SelectionOrder::Sequential, Duration::from_secs(7200))
        .await
        .unwrap()
        .expect("second entry");

    let entry = ledger
        .earliest_checkin(&category)
        .await
        .unwrap()
        .expect("entries exist");
    assert_eq!(entry.credential_id, ids[0], "shorter lease expires first");
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn invalidated_credentials_are_never_claimed() {
    let (ledger, ids) = setup(&["it_invalid"], 2);
    let category = OperationCategory::new("it_invalid");

    ledger.invalidate_credential(ids[0]).await.unwrap();

    assert_eq!(ledger.credential_count(&category).await.unwrap(), 1);

    let grant = ledger
        .claim(&category, SelectionOrder::Sequential, Duration::from_secs(3600))
        .await
        .unwrap()
        .expect("valid entry remains");
    assert_eq!(grant.credential.id, ids[1]);
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn record_usage_persists_the_counters() {
    let (ledger, ids) = setup(&["it_usage"], 1);
    let category = OperationCategory::new("it_usage");

    ledger
        .record_usage(
            ids[0],
            &category,
            UsageSnapshot {
                limit: Some(900),
                remaining: Some(874),
            },
        )
        .await
        .unwrap();

    let entry = ledger
        .earliest_checkin(&category)
        .await
        .unwrap()
        .expect("entry exists");
    assert_eq!(entry.quota_limit, Some(900));
    assert_eq!(entry.quota_remaining, Some(874));
}
