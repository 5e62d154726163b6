//! Key derivation and cache slot lifecycle.

use runflight::coord::{Claim, RunCache, RunKey, RunOutcome};
use runflight::errors::ProcessError;
use runflight::signal::AbortSignal;

#[test]
fn signal_keys_follow_identity() {
    let a = AbortSignal::new();
    let b = AbortSignal::new();

    // Clones of one signal share identity; independent signals don't.
    assert_eq!(RunKey::Signal(a.id()), RunKey::Signal(a.clone().id()));
    assert_ne!(RunKey::Signal(a.id()), RunKey::Signal(b.id()));

    // The signal-less slot can never collide with a signal slot.
    assert_ne!(RunKey::Unkeyed, RunKey::Signal(a.id()));
}

#[tokio::test]
async fn cache_claims_one_leader_per_key() {
    let cache = RunCache::new();
    let key = RunKey::Unkeyed;

    let Claim::Leader(tx) = cache.claim(&key) else {
        panic!("first claim should lead");
    };
    let Claim::Joined(mut rx) = cache.claim(&key) else {
        panic!("second claim should join");
    };

    cache.settle(&key, &RunOutcome::Success);
    tx.send(Some(RunOutcome::Success)).expect("joiner listening");

    let slot = rx.wait_for(|slot| slot.is_some()).await.expect("sender alive");
    assert!(slot.as_ref().is_some_and(RunOutcome::is_success));

    assert!(matches!(cache.claim(&key), Claim::Completed));
}

#[test]
fn failed_settle_frees_the_key() {
    let cache = RunCache::new();
    let key = RunKey::Signal(AbortSignal::new().id());

    assert!(matches!(cache.claim(&key), Claim::Leader(_)));
    cache.settle(&key, &RunOutcome::Failed(ProcessError::NonZeroExit { code: 2 }));

    assert!(!cache.contains(&key));
    assert!(matches!(cache.claim(&key), Claim::Leader(_)));
}

#[test]
fn aborted_settle_frees_the_key() {
    let cache = RunCache::new();
    let key = RunKey::Signal(AbortSignal::new().id());

    assert!(matches!(cache.claim(&key), Claim::Leader(_)));
    cache.settle(&key, &RunOutcome::Aborted);

    assert!(!cache.contains(&key));
}

#[test]
fn forget_in_flight_leaves_done_alone() {
    let cache = RunCache::new();
    let key = RunKey::Unkeyed;

    assert!(matches!(cache.claim(&key), Claim::Leader(_)));
    cache.settle(&key, &RunOutcome::Success);

    // Forgetting only targets pending slots; the completion stays.
    cache.forget_in_flight(&key);
    assert!(matches!(cache.claim(&key), Claim::Completed));
}

#[test]
fn forget_in_flight_drops_a_pending_slot() {
    let cache = RunCache::new();
    let key = RunKey::Signal(AbortSignal::new().id());

    assert!(matches!(cache.claim(&key), Claim::Leader(_)));
    cache.forget_in_flight(&key);

    assert!(cache.is_empty());
    assert!(matches!(cache.claim(&key), Claim::Leader(_)));
}
