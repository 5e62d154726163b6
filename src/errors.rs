// src/errors.rs

//! Crate-wide error types.
//!
//! Both enums are `Clone`: a run can have several callers joined on it,
//! and each one receives the same terminal outcome.

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Terminal outcome of a failed run.
///
/// All variants are non-retryable by the coordinator itself; the caller
/// may call `run` again, which is safe because failed outcomes are never
/// cached.
#[derive(Error, Debug, Clone)]
pub enum RunError {
    /// The abort signal was already triggered when `run` was called.
    /// No process was spawned and the cache was not touched.
    #[error("run aborted before the process was started")]
    AbortedBeforeStart,

    /// The abort signal fired after spawn, before the process exited.
    /// The process has been killed and the run is not cached.
    #[error("run aborted while the process was executing")]
    AbortedDuringExecution,

    /// The process failed to spawn, errored while running, or exited
    /// with a failure status. The run is not cached.
    #[error("process error: {0}")]
    Process(#[from] ProcessError),
}

/// Cause of a failed process attempt.
#[derive(Error, Debug, Clone)]
pub enum ProcessError {
    #[error("command exited with status {code}")]
    NonZeroExit { code: i32 },

    #[error("process terminated without an exit status")]
    Terminated,

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: Arc<io::Error>,
    },
}

impl ProcessError {
    /// Wrap an IO error with a short description of what was attempted.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        ProcessError::Io {
            context: context.into(),
            source: Arc::new(source),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, RunError>;
