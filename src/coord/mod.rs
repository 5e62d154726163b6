// src/coord/mod.rs

//! Run coordination core.
//!
//! This module ties together:
//! - the cache key derivation (one slot per distinct signal object, plus
//!   one extra slot for memoized signal-less runs)
//! - the memoization cache with its in-flight/completed slots
//! - the coordinator that spawns one process per run attempt and races
//!   its termination against the abort signal
//!
//! The cache lives in [`cache`], keys in [`key`], and the orchestration
//! in [`coordinator`].

use crate::errors::{ProcessError, Result, RunError};

/// Terminal outcome of one run attempt, shared with every joined caller.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The process exited with a success status.
    Success,
    /// The abort signal fired while the process was executing.
    Aborted,
    /// The process failed to spawn, errored, or exited non-zero.
    Failed(ProcessError),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success)
    }

    /// Convert into the result delivered to callers.
    pub fn into_result(self) -> Result<()> {
        match self {
            RunOutcome::Success => Ok(()),
            RunOutcome::Aborted => Err(RunError::AbortedDuringExecution),
            RunOutcome::Failed(err) => Err(RunError::Process(err)),
        }
    }
}

pub mod cache;
pub mod coordinator;
pub mod key;

pub use cache::{Claim, RunCache, RunSlot};
pub use coordinator::RunCoordinator;
pub use key::RunKey;
