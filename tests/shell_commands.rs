//! Scenario tests against the real shell backend.

use std::time::{Duration, Instant};

use runflight::coord::RunCoordinator;
use runflight::errors::{ProcessError, RunError};
use runflight::signal::AbortSignal;
use runflight_test_utils::{init_tracing, with_timeout};

#[tokio::test]
async fn exit_zero_resolves() {
    init_tracing();

    let coordinator = RunCoordinator::new("ok", "exit 0");
    with_timeout(coordinator.run(None))
        .await
        .expect("exit 0 should succeed");
}

#[tokio::test]
async fn memoized_rerun_returns_immediately() {
    init_tracing();

    let dir = tempfile::tempdir().expect("tempdir");
    let marker = dir.path().join("ran.txt");
    let cmd = format!("echo ran >> {}", marker.display());

    let memo = RunCoordinator::new("memo", cmd).memoize();
    memo.run(None).await.expect("first run");
    memo.run(None).await.expect("second run");

    // The command only ever ran once.
    let contents = std::fs::read_to_string(&marker).expect("marker written");
    assert_eq!(contents.lines().count(), 1);
}

#[tokio::test]
async fn exit_one_reports_process_error() {
    init_tracing();

    let coordinator = RunCoordinator::new("fail", "exit 1");
    let err = coordinator.run(None).await.expect_err("exit 1 fails");

    match err {
        RunError::Process(ProcessError::NonZeroExit { code }) => assert_eq!(code, 1),
        other => panic!("expected non-zero exit, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_command_reports_process_error() {
    init_tracing();

    let coordinator = RunCoordinator::new("missing", "definitely-not-a-real-command-404");
    let err = coordinator
        .run(None)
        .await
        .expect_err("unknown command fails");
    assert!(matches!(err, RunError::Process(_)));
}

#[tokio::test]
async fn abort_stops_a_sleeping_process() {
    init_tracing();

    let coordinator = RunCoordinator::new("sleeper", "sleep 5");
    let signal = AbortSignal::new();
    signal.abort_after(Duration::from_millis(100));

    let started = Instant::now();
    let err = with_timeout(coordinator.run(Some(&signal)))
        .await
        .expect_err("aborted mid-sleep");

    assert!(matches!(err, RunError::AbortedDuringExecution));
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "abort should interrupt the sleep promptly, took {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn failed_signal_run_can_be_retried_with_a_fresh_signal() {
    init_tracing();

    let coordinator = RunCoordinator::new("flaky", "exit 3");

    let first = AbortSignal::new();
    let err = coordinator
        .run(Some(&first))
        .await
        .expect_err("exit 3 fails");
    assert!(matches!(err, RunError::Process(_)));

    // The failure was not cached; the same key runs again.
    let err = coordinator
        .run(Some(&first))
        .await
        .expect_err("still failing");
    assert!(matches!(err, RunError::Process(_)));
}
