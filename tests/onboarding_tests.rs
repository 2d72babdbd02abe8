mod common;

use std::time::Duration;

use common::{spawn_mock_remote, ALICE, BOB};
use vela::gates::OnboardingState;
use vela::services::OnboardingCache;
use vela::supabase::SupabaseClient;

const RECONCILE_DELAY: Duration = Duration::from_millis(200);

async fn client_and_mock() -> (SupabaseClient, common::MockRemote) {
    let (mock, base_url) = spawn_mock_remote().await;
    let client = SupabaseClient::new(&base_url, "service-key", Duration::from_secs(5)).unwrap();
    (client, mock)
}

#[tokio::test]
async fn test_frequent_hits_do_not_postpone_reconcile() {
    let (client, mock) = client_and_mock().await;
    let cache = OnboardingCache::new();

    cache.set(ALICE, true).await;
    mock.set_onboarded(ALICE, false);

    // Hits every 50ms for well over the reconcile delay.
    let mut last = OnboardingState::Checking;
    for _ in 0..14 {
        last = cache.resolve(&client, ALICE, RECONCILE_DELAY).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    assert_eq!(last, OnboardingState::NotOnboarded);
    assert_eq!(cache.get(ALICE).await, Some(false));
}

#[tokio::test]
async fn test_finished_reconcile_is_forgotten() {
    let (client, _mock) = client_and_mock().await;
    let cache = OnboardingCache::new();

    cache.set(BOB, true).await;
    cache
        .schedule_reconcile(client, BOB, Duration::from_millis(10))
        .await;
    assert_eq!(cache.tracked_reconciles().await, 1);

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(cache.get(BOB).await, Some(false));
    assert!(!cache.reconcile_pending(BOB).await);
    assert_eq!(cache.tracked_reconciles().await, 0);
}

#[tokio::test]
async fn test_invalidate_during_inflight_reconcile_keeps_flag_cleared() {
    let (client, mock) = client_and_mock().await;
    let cache = OnboardingCache::new();
    mock.set_latency(Duration::from_millis(300));

    cache.set(ALICE, true).await;
    cache.schedule_reconcile(client, ALICE, Duration::ZERO).await;

    // The profile fetch is now in flight.
    tokio::time::sleep(Duration::from_millis(100)).await;
    cache.invalidate(ALICE).await;

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(cache.get(ALICE).await, None);
    assert_eq!(cache.tracked_reconciles().await, 0);
}

#[tokio::test]
async fn test_replaced_reconcile_does_not_write() {
    let (client, mock) = client_and_mock().await;
    let cache = OnboardingCache::new();
    mock.set_latency(Duration::from_millis(200));

    cache.set(ALICE, true).await;
    cache
        .schedule_reconcile(client.clone(), ALICE, Duration::ZERO)
        .await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    // A newer check replaces the in-flight one; only the newer one may write.
    mock.set_onboarded(ALICE, false);
    cache
        .schedule_reconcile(client, ALICE, Duration::from_secs(60))
        .await;

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(cache.get(ALICE).await, Some(true));
    assert!(cache.reconcile_pending(ALICE).await);
}
