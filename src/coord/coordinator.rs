// src/coord/coordinator.rs

//! The run coordinator: one command, one cache, deduplicated runs.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::errors::{ProcessError, Result, RunError};
use crate::exec::{ExitStatus, ProcessBackend, ShellBackend};
use crate::signal::AbortSignal;

use super::RunOutcome;
use super::cache::{Claim, RunCache};
use super::key::RunKey;

/// Coordinates executions of a single command.
///
/// Each call to [`run`](RunCoordinator::run) either joins an existing
/// record for its key (in-flight or completed) or spawns a fresh process
/// and races its termination against the caller's abort signal. Failed
/// and aborted runs are never cached, so calling `run` again after a
/// failure always spawns a new process.
///
/// Coordinators are cheap to clone; clones share the same identity,
/// command and cache.
#[derive(Clone)]
pub struct RunCoordinator {
    inner: Arc<CoordinatorInner>,
    memoized: bool,
}

struct CoordinatorInner {
    id: String,
    command: String,
    backend: Arc<dyn ProcessBackend>,
    cache: RunCache,
}

impl fmt::Debug for RunCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunCoordinator")
            .field("id", &self.inner.id)
            .field("command", &self.inner.command)
            .field("memoized", &self.memoized)
            .finish_non_exhaustive()
    }
}

impl RunCoordinator {
    /// Create a coordinator that runs `command` through the system
    /// shell.
    pub fn new(id: impl Into<String>, command: impl Into<String>) -> Self {
        Self::with_backend(id, command, Arc::new(ShellBackend))
    }

    /// Create a coordinator with a custom process backend.
    ///
    /// Tests use this to avoid spawning real processes.
    pub fn with_backend(
        id: impl Into<String>,
        command: impl Into<String>,
        backend: Arc<dyn ProcessBackend>,
    ) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                id: id.into(),
                command: command.into(),
                backend,
                cache: RunCache::new(),
            }),
            memoized: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn command(&self) -> &str {
        &self.inner.command
    }

    pub fn is_memoized(&self) -> bool {
        self.memoized
    }

    /// Variant of this coordinator whose signal-less `run` is
    /// idempotent: the first call executes and caches under the
    /// signal-less slot, every later one returns the original result
    /// without re-spawning.
    ///
    /// Calls passing a signal are unaffected. Safe to call repeatedly:
    /// every variant shares the same underlying coordinator and cache.
    pub fn memoize(&self) -> RunCoordinator {
        RunCoordinator {
            inner: Arc::clone(&self.inner),
            memoized: true,
        }
    }

    /// Execute the coordinator's command, or join an execution already
    /// running or completed for the same key.
    ///
    /// Fails with [`RunError::AbortedBeforeStart`] when `signal` is
    /// already triggered at call time (no process is spawned and the
    /// cache is not touched), with [`RunError::AbortedDuringExecution`]
    /// when it triggers mid-run, and with [`RunError::Process`] when the
    /// process itself fails.
    pub async fn run(&self, signal: Option<&AbortSignal>) -> Result<()> {
        if let Some(signal) = signal {
            if signal.is_aborted() {
                debug!(
                    coordinator = %self.inner.id,
                    signal = %signal.id(),
                    "signal already aborted; not spawning"
                );
                return Err(RunError::AbortedBeforeStart);
            }
        }

        let Some(key) = self.key_for(signal) else {
            // Signal-less run on a non-memoized coordinator: never cached.
            return self.execute(signal).await.into_result();
        };

        match self.inner.cache.claim(&key) {
            Claim::Completed => {
                debug!(coordinator = %self.inner.id, ?key, "returning cached completion");
                Ok(())
            }
            Claim::Joined(mut rx) => {
                debug!(coordinator = %self.inner.id, ?key, "joining in-flight run");

                let settled = match rx.wait_for(|slot| slot.is_some()).await {
                    Ok(slot) => slot.as_ref().cloned(),
                    Err(_) => None,
                };

                match settled {
                    Some(outcome) => outcome.into_result(),
                    // The leading caller went away without settling: the
                    // run was torn down before a terminal process event.
                    None => Err(RunError::AbortedDuringExecution),
                }
            }
            Claim::Leader(tx) => {
                let guard = SlotGuard::new(&self.inner.cache, key);
                let outcome = self.execute(signal).await;
                guard.settle(&outcome);

                // Joiners may have dropped out; send errors are fine.
                let _ = tx.send(Some(outcome.clone()));

                outcome.into_result()
            }
        }
    }

    fn key_for(&self, signal: Option<&AbortSignal>) -> Option<RunKey> {
        match signal {
            Some(signal) => Some(RunKey::Signal(signal.id())),
            None if self.memoized => Some(RunKey::Unkeyed),
            None => None,
        }
    }

    /// Spawn one process and race its termination against the signal.
    async fn execute(&self, signal: Option<&AbortSignal>) -> RunOutcome {
        info!(coordinator = %self.inner.id, cmd = %self.inner.command, "starting run");

        let mut child = match self.inner.backend.spawn(&self.inner.command) {
            Ok(child) => child,
            Err(err) => {
                error!(coordinator = %self.inner.id, error = %err, "failed to spawn process");
                return RunOutcome::Failed(err);
            }
        };

        // The abort subscription lives only inside this race: it is
        // installed before the first poll of `wait` and dropped on the
        // first terminal event, whichever branch wins.
        let outcome = match signal {
            Some(signal) => {
                tokio::select! {
                    res = child.wait() => self.exit_outcome(res),
                    _ = signal.aborted() => {
                        info!(
                            coordinator = %self.inner.id,
                            signal = %signal.id(),
                            "abort signal triggered; killing process"
                        );
                        child.kill().await;
                        RunOutcome::Aborted
                    }
                }
            }
            None => {
                let res = child.wait().await;
                self.exit_outcome(res)
            }
        };

        // Cleanup on every exit path; a no-op once the process is dead.
        child.kill().await;

        outcome
    }

    fn exit_outcome(&self, res: std::result::Result<ExitStatus, ProcessError>) -> RunOutcome {
        match res {
            Ok(status) if status.success() => {
                info!(coordinator = %self.inner.id, "process exited successfully");
                RunOutcome::Success
            }
            Ok(ExitStatus::Code(code)) => {
                warn!(coordinator = %self.inner.id, exit_code = code, "process exited with failure status");
                RunOutcome::Failed(ProcessError::NonZeroExit { code })
            }
            Ok(ExitStatus::Signaled) => {
                warn!(coordinator = %self.inner.id, "process terminated without an exit status");
                RunOutcome::Failed(ProcessError::Terminated)
            }
            Err(err) => {
                error!(coordinator = %self.inner.id, error = %err, "process error");
                RunOutcome::Failed(err)
            }
        }
    }
}

/// Removes the pending slot if the leading caller never settles it
/// (its future was dropped mid-run). Failures are never cached, and an
/// abandoned run counts as one.
struct SlotGuard<'a> {
    cache: &'a RunCache,
    key: RunKey,
    armed: bool,
}

impl<'a> SlotGuard<'a> {
    fn new(cache: &'a RunCache, key: RunKey) -> Self {
        Self {
            cache,
            key,
            armed: true,
        }
    }

    fn settle(mut self, outcome: &RunOutcome) {
        self.cache.settle(&self.key, outcome);
        self.armed = false;
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.cache.forget_in_flight(&self.key);
        }
    }
}
