// src/coord/cache.rs

//! Memoization cache mapping run keys to outcome slots.
//!
//! The cache is the only state shared between callers. All mutations go
//! through `&self` methods that take the mutex for the whole
//! check-then-modify step, so two near-simultaneous calls for the same
//! key are guaranteed to observe a single record rather than racing to
//! create two.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use super::RunOutcome;
use super::key::RunKey;

/// Receiving side of one in-flight run's eventual outcome.
pub type OutcomeReceiver = watch::Receiver<Option<RunOutcome>>;

/// Sending side held by the caller leading the run.
pub type OutcomeSender = watch::Sender<Option<RunOutcome>>;

/// One cache slot.
///
/// A slot present in the cache means either a run is currently in flight
/// for that key, or it has already completed successfully. Failed and
/// aborted runs are removed, never stored.
#[derive(Clone)]
pub enum RunSlot {
    /// A run has started but not yet terminated; joiners wait on the
    /// receiver for the shared outcome.
    InFlight(OutcomeReceiver),
    /// A run terminated successfully; later calls return immediately.
    Done,
}

impl fmt::Debug for RunSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunSlot::InFlight(_) => f.write_str("InFlight"),
            RunSlot::Done => f.write_str("Done"),
        }
    }
}

/// What a caller holds after claiming a key.
pub enum Claim {
    /// The key already completed successfully.
    Completed,
    /// Another caller is leading a run for this key; wait on the
    /// receiver for its outcome.
    Joined(OutcomeReceiver),
    /// This caller owns the pending slot and must run the process, then
    /// settle the key and publish the outcome on the sender.
    Leader(OutcomeSender),
}

/// Per-coordinator map of run keys to slots.
#[derive(Debug, Default)]
pub struct RunCache {
    slots: Mutex<HashMap<RunKey, RunSlot>>,
}

impl RunCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically look up `key`, inserting a pending slot when absent.
    ///
    /// Exactly one of any number of concurrent callers for the same key
    /// gets [`Claim::Leader`]; the rest join that record.
    pub fn claim(&self, key: &RunKey) -> Claim {
        let mut slots = self.lock();

        match slots.get(key) {
            Some(RunSlot::Done) => Claim::Completed,
            Some(RunSlot::InFlight(rx)) => Claim::Joined(rx.clone()),
            None => {
                let (tx, rx) = watch::channel(None);
                slots.insert(key.clone(), RunSlot::InFlight(rx));
                Claim::Leader(tx)
            }
        }
    }

    /// Record a terminal outcome for `key`.
    ///
    /// Success promotes the slot to [`RunSlot::Done`]; failure and abort
    /// remove the entry so a later call spawns a fresh process.
    pub fn settle(&self, key: &RunKey, outcome: &RunOutcome) {
        let mut slots = self.lock();

        if outcome.is_success() {
            slots.insert(key.clone(), RunSlot::Done);
        } else {
            slots.remove(key);
            debug!(?key, "removed failed run from cache");
        }
    }

    /// Drop a pending slot without settling it (the leading caller went
    /// away). A completed slot is left untouched.
    pub fn forget_in_flight(&self, key: &RunKey) {
        let mut slots = self.lock();

        if matches!(slots.get(key), Some(RunSlot::InFlight(_))) {
            slots.remove(key);
            debug!(?key, "dropped abandoned in-flight run from cache");
        }
    }

    /// Whether `key` currently has a slot (in-flight or completed).
    pub fn contains(&self, key: &RunKey) -> bool {
        self.lock().contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RunKey, RunSlot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
