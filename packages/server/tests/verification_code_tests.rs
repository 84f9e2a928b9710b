//! Storage-level tests for code redemption: expiry boundaries, selection
//! among several outstanding codes, concurrent redemption and purging.

mod common;

use chrono::{Duration, Utc};
use common::{unique_email, unique_phone, TestHarness};
use companion_core::common::Contact;
use companion_core::domains::account::Account;
use companion_core::domains::auth::actions::{issue_code_at, verify_code_at};
use companion_core::domains::auth::models::VerificationCode;
use companion_core::domains::auth::AuthError;
use companion_core::kernel::scheduled_tasks::{run_code_purge, run_code_purge_before};
use companion_core::kernel::TestDependencies;
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn test_expiry_boundary(ctx: &TestHarness) {
    let (deps, delivery) = ctx.deps(TestDependencies::new());
    let issued_at = Utc::now() - Duration::hours(1);

    // One second before expiry succeeds
    let early = Contact::parse(&unique_email()).unwrap();
    issue_code_at(early.clone(), issued_at, &deps).await.unwrap();
    let code = delivery.last_code_for(early.as_str()).unwrap();
    let before_expiry = issued_at + Duration::minutes(10) - Duration::seconds(1);
    assert!(verify_code_at(early, &code, before_expiry, &deps).await.is_ok());

    // One second after expiry fails
    let late = Contact::parse(&unique_email()).unwrap();
    issue_code_at(late.clone(), issued_at, &deps).await.unwrap();
    let code = delivery.last_code_for(late.as_str()).unwrap();
    let after_expiry = issued_at + Duration::minutes(10) + Duration::seconds(1);
    let result = verify_code_at(late.clone(), &code, after_expiry, &deps).await;
    assert!(matches!(result, Err(AuthError::InvalidOrExpiredCode)));

    // Exactly at expiry is already expired
    let at_expiry = issued_at + Duration::minutes(10);
    let result = verify_code_at(late, &code, at_expiry, &deps).await;
    assert!(matches!(result, Err(AuthError::InvalidOrExpiredCode)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_outstanding_codes_coexist(ctx: &TestHarness) {
    let (deps, delivery) = ctx.deps(TestDependencies::new());
    let contact = Contact::parse(&unique_phone()).unwrap();
    let now = Utc::now();

    issue_code_at(contact.clone(), now - Duration::minutes(2), &deps)
        .await
        .unwrap();
    let first = delivery.last_code_for(contact.as_str()).unwrap();
    issue_code_at(contact.clone(), now - Duration::minutes(1), &deps)
        .await
        .unwrap();

    assert_eq!(
        VerificationCode::count_outstanding(contact.as_str(), now, &ctx.db_pool)
            .await
            .unwrap(),
        2
    );

    // The older code is still accepted
    verify_code_at(contact.clone(), &first, now, &deps)
        .await
        .unwrap();
    assert_eq!(
        VerificationCode::count_outstanding(contact.as_str(), now, &ctx.db_pool)
            .await
            .unwrap(),
        1
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_newest_matching_code_is_consumed(ctx: &TestHarness) {
    let contact = unique_email();
    let now = Utc::now();
    let expires_at = now + Duration::minutes(10);

    let older = VerificationCode::create(&contact, "111111", now - Duration::minutes(5), expires_at, &ctx.db_pool)
        .await
        .unwrap();
    let newer = VerificationCode::create(&contact, "111111", now - Duration::minutes(1), expires_at, &ctx.db_pool)
        .await
        .unwrap();

    let redeemed = VerificationCode::redeem(&contact, "111111", now, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(redeemed.id, newer.id);
    assert!(redeemed.is_used);
    assert_eq!(redeemed.used_at.map(|t| t.timestamp()), Some(now.timestamp()));

    let older = VerificationCode::find_by_id(older.id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert!(!older.is_used);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_concurrent_redemption_succeeds_once(ctx: &TestHarness) {
    let (deps, delivery) = ctx.deps(TestDependencies::new());
    let contact = Contact::parse(&unique_email()).unwrap();

    issue_code_at(contact.clone(), Utc::now(), &deps).await.unwrap();
    let code = delivery.last_code_for(contact.as_str()).unwrap();

    let attempts = (0..8).map(|_| {
        let deps = deps.clone();
        let contact = contact.clone();
        let code = code.clone();
        tokio::spawn(async move { verify_code_at(contact, &code, Utc::now(), &deps).await })
    });

    let mut successes = 0;
    for handle in attempts.collect::<Vec<_>>() {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AuthError::InvalidOrExpiredCode) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(successes, 1);

    let account = Account::find_by_contact(&contact, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert!(account.is_verified);
    assert_eq!(account.email.as_deref(), Some(contact.as_str()));
    assert_eq!(account.phone, None);
    assert_eq!(account.auth_provider, "email");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_purge_removes_only_stale_codes(ctx: &TestHarness) {
    let contact = unique_email();
    let now = Utc::now();

    let stale = VerificationCode::create(
        &contact,
        "222222",
        now - Duration::days(3),
        now - Duration::days(3) + Duration::minutes(10),
        &ctx.db_pool,
    )
    .await
    .unwrap();
    let recently_expired = VerificationCode::create(
        &contact,
        "333333",
        now - Duration::hours(2),
        now - Duration::hours(1),
        &ctx.db_pool,
    )
    .await
    .unwrap();
    let live = VerificationCode::create(
        &contact,
        "444444",
        now,
        now + Duration::minutes(10),
        &ctx.db_pool,
    )
    .await
    .unwrap();

    run_code_purge(&ctx.db_pool, Duration::hours(24)).await.unwrap();

    assert!(VerificationCode::find_by_id(stale.id, &ctx.db_pool)
        .await
        .unwrap()
        .is_none());
    assert!(VerificationCode::find_by_id(recently_expired.id, &ctx.db_pool)
        .await
        .unwrap()
        .is_some());
    assert!(VerificationCode::find_by_id(live.id, &ctx.db_pool)
        .await
        .unwrap()
        .is_some());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_purge_before_explicit_cutoff(ctx: &TestHarness) {
    // Inside the 24h window so the retention-based purge leaves both rows alone
    let contact = unique_email();
    let now = Utc::now();
    let cutoff = now - Duration::hours(20);

    let before = VerificationCode::create(
        &contact,
        "555555",
        now - Duration::hours(23),
        cutoff - Duration::seconds(1),
        &ctx.db_pool,
    )
    .await
    .unwrap();
    let after = VerificationCode::create(
        &contact,
        "666666",
        now - Duration::hours(23),
        cutoff + Duration::seconds(1),
        &ctx.db_pool,
    )
    .await
    .unwrap();

    assert!(VerificationCode::count_stale(cutoff, &ctx.db_pool).await.unwrap() >= 1);
    let deleted = run_code_purge_before(&ctx.db_pool, cutoff).await.unwrap();
    assert!(deleted >= 1);

    assert!(VerificationCode::find_by_id(before.id, &ctx.db_pool)
        .await
        .unwrap()
        .is_none());
    assert!(VerificationCode::find_by_id(after.id, &ctx.db_pool)
        .await
        .unwrap()
        .is_some());
}
