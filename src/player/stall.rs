// SPDX-License-Identifier: MPL-2.0
//! Buffering detection from the absence of progress.
//!
//! Native buffering signals are unreliable, so the player infers a stall when
//! no time update arrived for [`BUFFER_STALL_TIMEOUT`] while playing.

use super::state::Phase;
use super::timers::{TimerKind, Timers};
use crate::config::BUFFER_STALL_TIMEOUT;
use std::time::Instant;

#[derive(Debug, Default)]
pub struct StallDetector {
    waiting_on_buffer: bool,
}

impl StallDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_waiting_on_buffer(&self) -> bool {
        self.waiting_on_buffer
    }

    /// Progress arrived: clear the stall and restart the window.
    pub fn on_time_update(&mut self, timers: &mut Timers, now: Instant) {
        self.waiting_on_buffer = false;
        timers.reschedule(TimerKind::BufferStall, BUFFER_STALL_TIMEOUT, now);
    }

    /// Playback (re)started: progress is expected within the window.
    pub fn arm(&mut self, timers: &mut Timers, now: Instant) {
        timers.reschedule(TimerKind::BufferStall, BUFFER_STALL_TIMEOUT, now);
    }

    /// The stall window elapsed without progress.
    pub fn on_timeout(&mut self, is_playing: bool) {
        if is_playing {
            self.waiting_on_buffer = true;
        }
    }

    pub fn reset(&mut self, timers: &mut Timers) {
        self.waiting_on_buffer = false;
        timers.cancel(TimerKind::BufferStall);
    }

    /// Whether the loading spinner is shown.
    #[must_use]
    pub fn shows_spinner(&self, phase: &Phase, is_playing: bool) -> bool {
        match phase {
            Phase::Failed(_) | Phase::Ended => false,
            Phase::Loading => true,
            Phase::Ready => self.waiting_on_buffer && is_playing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MediaError;
    use crate::test_utils::later;

    #[test]
    fn stall_detected_after_silence_while_playing() {
        let now = Instant::now();
        let mut timers = Timers::new();
        let mut detector = StallDetector::new();

        detector.on_time_update(&mut timers, now);
        assert!(timers.take_due(later(now, 900)).is_empty());
        assert_eq!(timers.take_due(later(now, 1000)), vec![TimerKind::BufferStall]);
        detector.on_timeout(true);

        assert!(detector.is_waiting_on_buffer());
        assert!(detector.shows_spinner(&Phase::Ready, true));
    }

    #[test]
    fn timeout_while_paused_is_not_a_stall() {
        let mut detector = StallDetector::new();
        detector.on_timeout(false);
        assert!(!detector.is_waiting_on_buffer());
    }

    #[test]
    fn next_time_update_clears_stall() {
        let now = Instant::now();
        let mut timers = Timers::new();
        let mut detector = StallDetector::new();
        detector.on_timeout(true);
        detector.on_time_update(&mut timers, now);
        assert!(!detector.is_waiting_on_buffer());
        assert!(timers.is_pending(TimerKind::BufferStall));
    }

    #[test]
    fn spinner_rules() {
        let mut detector = StallDetector::new();
        assert!(detector.shows_spinner(&Phase::Loading, false));
        assert!(!detector.shows_spinner(&Phase::Ready, true));

        detector.on_timeout(true);
        assert!(detector.shows_spinner(&Phase::Ready, true));
        assert!(!detector.shows_spinner(&Phase::Ready, false));
        assert!(!detector.shows_spinner(&Phase::Ended, true));
        assert!(!detector.shows_spinner(&Phase::Failed(MediaError::Corrupted), true));
    }

    #[test]
    fn reset_cancels_timer() {
        let now = Instant::now();
        let mut timers = Timers::new();
        let mut detector = StallDetector::new();
        detector.arm(&mut timers, now);
        detector.on_timeout(true);
        detector.reset(&mut timers);
        assert!(!detector.is_waiting_on_buffer());
        assert!(timers.is_empty());
    }
}
