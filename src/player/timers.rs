// SPDX-License-Identifier: MPL-2.0
//! Owned, cancellable scheduled tasks.
//!
//! Every timer of the player is an entry in [`Timers`], keyed by its
//! [`TimerKind`]. Rescheduling a kind replaces its previous deadline, which
//! gives "reset and restart" semantics for free. Timers never fire on their
//! own: the owner polls [`Timers::take_due`] from its tick handler, so
//! dropping the owner drops every pending timer with it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Identifies one scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    /// Hides the controls after pointer/keyboard inactivity.
    ControlsIdle,
    /// Fires when no time update arrived for a while.
    BufferStall,
    /// Hides the transient volume overlay.
    VolumeOverlay,
    /// Starts a preview capture for the latest hover position.
    ScrubDebounce,
    /// Abandons a preview capture that never completed.
    CaptureWatchdog,
    /// Background preview capture for one of the pre-warm slots.
    Prewarm(u8),
}

#[derive(Debug, Default)]
pub struct Timers {
    deadlines: HashMap<TimerKind, Instant>,
}

impl Timers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `kind` to fire `delay` after `now`, cancelling any prior instance.
    pub fn reschedule(&mut self, kind: TimerKind, delay: Duration, now: Instant) {
        self.deadlines.insert(kind, now + delay);
    }

    /// Cancels `kind`. Returns true if it was pending.
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        self.deadlines.remove(&kind).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.deadlines.clear();
    }

    /// Cancels every timer matching `predicate`.
    pub fn cancel_where(&mut self, predicate: impl Fn(TimerKind) -> bool) {
        self.deadlines.retain(|kind, _| !predicate(*kind));
    }

    #[must_use]
    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.deadlines.contains_key(&kind)
    }

    #[must_use]
    pub fn deadline(&self, kind: TimerKind) -> Option<Instant> {
        self.deadlines.get(&kind).copied()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Removes and returns every timer due at `now`, earliest deadline first.
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerKind> {
        let mut due: Vec<(Instant, TimerKind)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(kind, deadline)| (*deadline, *kind))
            .collect();
        due.sort();
        for (_, kind) in &due {
            self.deadlines.remove(kind);
        }
        due.into_iter().map(|(_, kind)| kind).collect()
    }
}
