// src/coord/key.rs

use crate::signal::SignalId;

/// Cache key for one run request.
///
/// - `Signal` keys follow the *identity* of the abort signal passed to
///   `run`: clones of one signal map to the same key, independent
///   signals to different keys.
/// - `Unkeyed` is the single extra slot used by memoized signal-less
///   calls.
///
/// The two variants can never collide, so a "no signal" run and a
/// "signal present but not yet triggered" run always occupy separate
/// slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RunKey {
    /// Slot for memoized signal-less runs.
    Unkeyed,
    /// Slot tied to one specific signal object.
    Signal(SignalId),
}
