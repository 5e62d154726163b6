// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! The coordinator talks to a `ProcessBackend` instead of using
//! `tokio::process` directly. This makes it easy to swap in a fake
//! backend in tests while keeping the production implementation in
//! [`process`](super::process).
//!
//! - `ShellBackend` is the default implementation used by `runflight`.
//! - Tests can provide their own `ProcessBackend` that, for example,
//!   records which commands were spawned and completes them on demand.

use std::future::Future;
use std::pin::Pin;

use crate::errors::ProcessError;

/// Exit state of a finished process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// The process exited with this code.
    Code(i32),
    /// The process was terminated without an exit code (e.g. by an OS
    /// signal).
    Signaled,
}

impl ExitStatus {
    pub fn success(self) -> bool {
        matches!(self, ExitStatus::Code(0))
    }
}

/// Trait abstracting how commands are spawned.
///
/// Production code uses [`ShellBackend`](super::ShellBackend); tests can
/// provide their own implementation that doesn't spawn real processes.
pub trait ProcessBackend: Send + Sync {
    /// Start a new process for `command` and return a live handle to it.
    ///
    /// A fresh handle is created for every run attempt; handles are never
    /// reused across runs.
    fn spawn(&self, command: &str) -> Result<Box<dyn ProcessHandle>, ProcessError>;
}

/// A live process started by a [`ProcessBackend`].
pub trait ProcessHandle: Send {
    /// Wait for the process to terminate.
    ///
    /// Resolves at most once, with the exit status or with an error if
    /// waiting on the process fails.
    fn wait(&mut self)
    -> Pin<Box<dyn Future<Output = Result<ExitStatus, ProcessError>> + Send + '_>>;

    /// Terminate the process.
    ///
    /// Idempotent: killing a process that has already exited is a no-op.
    fn kill(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}
