// src/signal.rs

//! Cancellation signals for in-flight runs.
//!
//! An [`AbortSignal`] is the caller-provided side of run cancellation:
//! the caller keeps a handle, passes a clone of it into a coordinator's
//! `run`, and triggers it to stop the process. Clones share identity and
//! trigger state, so handing clones of one signal to several calls
//! deduplicates those calls onto the same run.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

static NEXT_SIGNAL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one signal object.
///
/// Clones of an [`AbortSignal`] share their id; independently created
/// signals never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalId(u64);

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A triggerable cancellation signal.
///
/// - [`is_aborted`](AbortSignal::is_aborted) answers "already triggered?"
///   without waiting.
/// - [`aborted`](AbortSignal::aborted) waits for the trigger; any number
///   of callers can wait independently, and dropping the future detaches
///   that waiter.
/// - [`abort`](AbortSignal::abort) triggers the signal; repeated calls
///   are no-ops.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    id: SignalId,
    token: CancellationToken,
}

impl AbortSignal {
    pub fn new() -> Self {
        let id = SignalId(NEXT_SIGNAL_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            id,
            token: CancellationToken::new(),
        }
    }

    /// Identity of this signal object.
    pub fn id(&self) -> SignalId {
        self.id
    }

    /// Trigger the signal.
    pub fn abort(&self) {
        debug!(signal = %self.id, "abort signal triggered");
        self.token.cancel();
    }

    /// Whether the signal has already been triggered.
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait until the signal is triggered.
    ///
    /// Resolves immediately if it already was.
    pub async fn aborted(&self) {
        self.token.cancelled().await;
    }

    /// Trigger the signal once `delay` has elapsed.
    pub fn abort_after(&self, delay: Duration) {
        let signal = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            signal.abort();
        });
    }
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::new()
    }
}
