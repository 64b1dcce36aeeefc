//! Tests of the entitlement adjustment service: atomic bounded counters, lazily created rows.

mod support;

use bazaar_payment_engine::{
    db_types::EntitlementField,
    traits::{EntitlementApiError, FulfillmentDatabase},
    EntitlementApi,
};
use support::{prepare_test_env, random_db_url};

#[tokio::test]
async fn decrement_at_zero_fails_and_changes_nothing() {
    let db = prepare_test_env(&random_db_url()).await;
    let api = EntitlementApi::new(db);

    let err = api.adjust("alice", EntitlementField::ProductSlots, -1).await.unwrap_err();
    assert!(matches!(err, EntitlementApiError::InsufficientBalance {
        field: EntitlementField::ProductSlots,
        delta: -1
    }));

    let record = api.balance("alice").await.unwrap();
    assert_eq!(record.product_slots, 0);
}

#[tokio::test]
async fn increment_lazily_creates_the_record() {
    let db = prepare_test_env(&random_db_url()).await;
    let api = EntitlementApi::new(db.clone());

    let new_value = api.adjust("bob", EntitlementField::ProductSlots, 1).await.unwrap();
    assert_eq!(new_value, 1);

    // Visible to a subsequent read, and the other fields start from their zero defaults.
    let record = db.fetch_entitlements("bob").await.unwrap();
    assert_eq!(record.product_slots, 1);
    assert!(!record.brand_page);
    assert_eq!(record.popup_extra_slots, 0);
}

#[tokio::test]
async fn counters_are_independent() {
    let db = prepare_test_env(&random_db_url()).await;
    let api = EntitlementApi::new(db);

    api.adjust("carol", EntitlementField::PopupExtraSlots, 1).await.unwrap();
    let err = api.adjust("carol", EntitlementField::ProductSlots, -1).await.unwrap_err();
    assert!(matches!(err, EntitlementApiError::InsufficientBalance { .. }));

    let record = api.balance("carol").await.unwrap();
    assert_eq!(record.popup_extra_slots, 1);
    assert_eq!(record.product_slots, 0);
}

#[tokio::test]
async fn concurrent_decrements_cannot_overdraw() {
    let db = prepare_test_env(&random_db_url()).await;
    let api = EntitlementApi::new(db);
    api.adjust("dave", EntitlementField::ProductSlots, 1).await.unwrap();

    // Two overlapping consumers of the last slot: the conditional update lets exactly one
    // through, no matter how the calls interleave.
    let a = api.adjust("dave", EntitlementField::ProductSlots, -1);
    let b = api.adjust("dave", EntitlementField::ProductSlots, -1);
    let (a, b) = tokio::join!(a, b);

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert_eq!(*[a, b].iter().find(|r| r.is_ok()).unwrap().as_ref().unwrap(), 0);

    let record = api.balance("dave").await.unwrap();
    assert_eq!(record.product_slots, 0);
}

#[tokio::test]
async fn release_then_consume_round_trips() {
    let db = prepare_test_env(&random_db_url()).await;
    let api = EntitlementApi::new(db);

    api.adjust("erin", EntitlementField::ProductSlots, 1).await.unwrap();
    assert_eq!(api.adjust("erin", EntitlementField::ProductSlots, -1).await.unwrap(), 0);
    assert_eq!(api.adjust("erin", EntitlementField::ProductSlots, 1).await.unwrap(), 1);
}
