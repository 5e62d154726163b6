use std::sync::Arc;

use runflight::coord::RunCoordinator;
use runflight::errors::RunError;
use runflight::signal::AbortSignal;
use runflight_test_utils::fake_backend::FakeProcessBackend;
use runflight_test_utils::init_tracing;

#[tokio::test]
async fn memoized_signal_less_run_spawns_once() {
    init_tracing();

    let backend = Arc::new(FakeProcessBackend::succeeding());
    let coordinator = RunCoordinator::with_backend("memo", "true", backend.clone());
    let memo = coordinator.memoize();

    memo.run(None).await.expect("first run");
    memo.run(None).await.expect("second run");

    assert_eq!(backend.spawn_count(), 1);
}

#[tokio::test]
async fn repeated_memoize_shares_one_cache() {
    init_tracing();

    let backend = Arc::new(FakeProcessBackend::succeeding());
    let coordinator = RunCoordinator::with_backend("memo-twice", "true", backend.clone());

    coordinator.memoize().run(None).await.expect("first run");
    coordinator.memoize().run(None).await.expect("second run");

    assert_eq!(backend.spawn_count(), 1);
}

#[tokio::test]
async fn memoized_slot_is_separate_from_signal_slots() {
    init_tracing();

    let backend = Arc::new(FakeProcessBackend::succeeding());
    let coordinator = RunCoordinator::with_backend("memo-keys", "true", backend.clone());
    let memo = coordinator.memoize();
    let signal = AbortSignal::new();

    memo.run(None).await.expect("signal-less run");
    assert_eq!(backend.spawn_count(), 1);

    // A signal-carrying call is keyed by the signal and must not be
    // served from the signal-less slot.
    memo.run(Some(&signal)).await.expect("signal run");
    assert_eq!(backend.spawn_count(), 2);

    // Both slots are now warm.
    memo.run(None).await.expect("cached signal-less run");
    memo.run(Some(&signal)).await.expect("cached signal run");
    assert_eq!(backend.spawn_count(), 2);
}

#[tokio::test]
async fn memoized_failure_is_not_cached() {
    init_tracing();

    let backend = Arc::new(FakeProcessBackend::exiting_with(7));
    let coordinator = RunCoordinator::with_backend("memo-fail", "false", backend.clone());
    let memo = coordinator.memoize();

    let err = memo.run(None).await.expect_err("exit 7");
    assert!(matches!(err, RunError::Process(_)));

    let err = memo.run(None).await.expect_err("exit 7 again");
    assert!(matches!(err, RunError::Process(_)));

    assert_eq!(backend.spawn_count(), 2);
}

#[tokio::test]
async fn memoization_does_not_leak_into_the_plain_coordinator() {
    init_tracing();

    let backend = Arc::new(FakeProcessBackend::succeeding());
    let coordinator = RunCoordinator::with_backend("memo-plain", "true", backend.clone());
    let memo = coordinator.memoize();

    // Warm the signal-less slot through the memoized variant.
    memo.run(None).await.expect("memoized run");
    assert_eq!(backend.spawn_count(), 1);

    // The plain coordinator still runs signal-less calls uncached.
    coordinator.run(None).await.expect("plain run");
    assert_eq!(backend.spawn_count(), 2);

    // And the memoized slot is still warm afterwards.
    memo.run(None).await.expect("still cached");
    assert_eq!(backend.spawn_count(), 2);
}
