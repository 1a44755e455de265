// SPDX-License-Identifier: MPL-2.0
//! Scrub preview engine.
//!
//! Hovering the progress bar shows the time under the pointer and, when
//! available, a thumbnail of that moment. Thumbnails come from the secondary
//! [`FrameSource`] and are cached per whole second.
//!
//! At most one capture is in flight. Completions carry the id of their
//! request; anything that does not match the in-flight id is stale and
//! dropped. A watchdog abandons captures that take too long; if one of them
//! completes later, its thumbnail is still cached but never displayed.

use super::media::{CaptureOutcome, CaptureRequest, FrameSource, Thumbnail};
use super::preview_cache::{CacheStats, PreviewCache};
use super::time_units::{hovered_time, second_key};
use super::timers::{TimerKind, Timers};
use crate::config::{
    CAPTURE_WATCHDOG_TIMEOUT, PREVIEW_RELEVANCE_SECS, PREWARM_BASE_DELAY, PREWARM_FRACTIONS,
    PREWARM_JITTER_MAX_MS, PREWARM_RETRY_DELAY, PREWARM_STAGGER, SCRUB_DEBOUNCE,
};
use rand::Rng;
use std::time::{Duration, Instant};

/// What the progress bar shows while hovered.
#[derive(Debug, Clone)]
pub struct HoverState {
    pub hovered_secs: f64,
    /// Pointer offset from the left edge of the bar.
    pub pointer_x: f32,
    pub bar_width: f32,
    pub preview: Option<Thumbnail>,
    /// A capture for the hovered time is pending.
    pub loading: bool,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    id: u64,
    requested_secs: f64,
}

#[derive(Debug)]
pub struct ScrubEngine<F> {
    frames: F,
    enabled: bool,
    cache: PreviewCache,
    hover: Option<HoverState>,
    in_flight: Option<InFlight>,
    /// Timed-out captures the pipeline may still answer.
    abandoned: Vec<InFlight>,
    next_capture_id: u64,
    captures_started: u64,
}

impl<F: FrameSource> ScrubEngine<F> {
    /// Creates an engine. A disabled engine still tracks the hovered time but
    /// never captures.
    pub fn new(frames: F, enabled: bool, cache_capacity: usize) -> Self {
        Self {
            frames,
            enabled,
            cache: PreviewCache::new(cache_capacity),
            hover: None,
            in_flight: None,
            abandoned: Vec::new(),
            next_capture_id: 1,
            captures_started: 0,
        }
    }

    pub fn frames(&self) -> &F {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut F {
        &mut self.frames
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn hover(&self) -> Option<&HoverState> {
        self.hover.as_ref()
    }

    #[must_use]
    pub fn hovered_secs(&self) -> Option<f64> {
        self.hover.as_ref().map(|hover| hover.hovered_secs)
    }

    #[must_use]
    pub fn is_capture_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn captures_started(&self) -> u64 {
        self.captures_started
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    #[must_use]
    pub fn is_cached(&self, secs: f64) -> bool {
        self.cache.contains(second_key(secs))
    }

    // =========================================================================
    // Pointer
    // =========================================================================

    /// Pointer moved over the bar. Degenerate geometry or an unknown
    /// duration leaves the hover state untouched.
    pub fn on_hover(
        &mut self,
        pointer_x: f32,
        bar_width: f32,
        duration_secs: f64,
        timers: &mut Timers,
        now: Instant,
    ) {
        let Some(hovered_secs) = hovered_time(pointer_x, bar_width, duration_secs) else {
            return;
        };
        let hover = self.hover.get_or_insert_with(|| HoverState {
            hovered_secs,
            pointer_x,
            bar_width,
            preview: None,
            loading: false,
        });
        hover.hovered_secs = hovered_secs;
        hover.pointer_x = pointer_x.clamp(0.0, bar_width);
        hover.bar_width = bar_width;

        if !self.enabled {
            return;
        }

        if let Some(thumbnail) = self.cache.get(second_key(hovered_secs)) {
            hover.preview = Some(thumbnail);
            hover.loading = false;
            timers.cancel(TimerKind::ScrubDebounce);
        } else {
            hover.preview = None;
            hover.loading = true;
            timers.reschedule(TimerKind::ScrubDebounce, SCRUB_DEBOUNCE, now);
        }
    }

    pub fn on_leave(&mut self, timers: &mut Timers) {
        self.hover = None;
        timers.cancel(TimerKind::ScrubDebounce);
    }

    /// The pointer settled: capture the hovered second unless busy.
    pub fn on_debounce_fired(&mut self, timers: &mut Timers, now: Instant) {
        if !self.enabled || self.in_flight.is_some() {
            return;
        }
        let Some(target) = self.hovered_secs() else {
            return;
        };
        let key = second_key(target);
        if self.cache.contains(key) {
            if let (Some(thumbnail), Some(hover)) = (self.cache.get(key), self.hover.as_mut()) {
                hover.preview = Some(thumbnail);
                hover.loading = false;
            }
            return;
        }
        if !self.start_capture(target, timers, now) {
            if let Some(hover) = self.hover.as_mut() {
                hover.loading = false;
            }
        }
    }

    // =========================================================================
    // Captures
    // =========================================================================

    fn start_capture(&mut self, target_secs: f64, timers: &mut Timers, now: Instant) -> bool {
        let id = self.next_capture_id;
        self.next_capture_id += 1;

        match self.frames.capture(CaptureRequest { id, target_secs }) {
            Ok(()) => {
                self.in_flight = Some(InFlight {
                    id,
                    requested_secs: target_secs,
                });
                self.captures_started += 1;
                timers.reschedule(TimerKind::CaptureWatchdog, CAPTURE_WATCHDOG_TIMEOUT, now);
                true
            }
            Err(err) => {
                tracing::debug!(%err, target_secs, "preview capture not started");
                false
            }
        }
    }

    /// Handles a capture completion.
    ///
    /// `hovered_now` is the hovered time at completion; the thumbnail is only
    /// displayed when it is still within a second of the requested time.
    /// Successful captures are cached either way.
    pub fn on_capture_complete(
        &mut self,
        outcome: CaptureOutcome,
        hovered_now: Option<f64>,
        timers: &mut Timers,
        now: Instant,
    ) {
        match self.in_flight {
            Some(flight) if flight.id == outcome.id => {}
            _ => {
                self.on_late_capture(outcome);
                return;
            }
        }
        self.in_flight = None;
        timers.cancel(TimerKind::CaptureWatchdog);

        let requested_key = second_key(outcome.requested_secs);
        let relevant = hovered_now
            .is_some_and(|hovered| (hovered - outcome.requested_secs).abs() <= PREVIEW_RELEVANCE_SECS);

        match outcome.result {
            Ok(thumbnail) => {
                self.cache.insert(requested_key, thumbnail.clone());
                if relevant {
                    if let Some(hover) = self.hover.as_mut() {
                        hover.preview = Some(thumbnail);
                        hover.loading = false;
                    }
                }
            }
            Err(err) => {
                tracing::debug!(%err, requested = outcome.requested_secs, "preview capture failed");
                if relevant {
                    if let Some(hover) = self.hover.as_mut() {
                        hover.loading = false;
                    }
                }
            }
        }

        // The pointer moved on while busy: catch up with its position.
        if let Some(hovered) = self.hovered_secs() {
            let hovered_key = second_key(hovered);
            if self.enabled && hovered_key != requested_key && !self.cache.contains(hovered_key) {
                if let Some(hover) = self.hover.as_mut() {
                    hover.loading = true;
                }
                timers.reschedule(TimerKind::ScrubDebounce, SCRUB_DEBOUNCE, now);
            }
        }
    }

    /// Caches the result of an abandoned capture; drops anything else.
    fn on_late_capture(&mut self, outcome: CaptureOutcome) {
        let Some(index) = self
            .abandoned
            .iter()
            .position(|flight| flight.id == outcome.id)
        else {
            tracing::debug!(id = outcome.id, "dropping stale preview capture");
            return;
        };
        let flight = self.abandoned.swap_remove(index);
        if let Ok(thumbnail) = outcome.result {
            tracing::debug!(id = flight.id, "caching late preview capture");
            self.cache.insert(second_key(flight.requested_secs), thumbnail);
        }
    }

    /// The in-flight capture never completed: give up on it.
    pub fn on_watchdog_fired(&mut self) {
        if let Some(flight) = self.in_flight.take() {
            tracing::warn!(
                id = flight.id,
                requested = flight.requested_secs,
                "preview capture timed out"
            );
            self.abandoned.push(flight);
            if let Some(hover) = self.hover.as_mut() {
                hover.loading = false;
            }
        }
    }

    // =========================================================================
    // Pre-warm
    // =========================================================================

    /// Schedules background captures at fixed fractions of the duration,
    /// staggered and jittered so they do not compete with playback start.
    pub fn schedule_prewarm(&mut self, timers: &mut Timers, now: Instant) {
        if !self.enabled {
            return;
        }
        let mut rng = rand::rng();
        for slot in 0..PREWARM_FRACTIONS.len() {
            let jitter = Duration::from_millis(rng.random_range(0..=PREWARM_JITTER_MAX_MS));
            let stagger = PREWARM_STAGGER * u32::try_from(slot).unwrap_or(u32::MAX);
            let delay = PREWARM_BASE_DELAY + stagger + jitter;
            let slot = u8::try_from(slot).unwrap_or(u8::MAX);
            timers.reschedule(TimerKind::Prewarm(slot), delay, now);
        }
    }

    /// A pre-warm slot is due. Busy pipelines retry shortly after.
    pub fn on_prewarm_fired(
        &mut self,
        slot: u8,
        duration_secs: f64,
        timers: &mut Timers,
        now: Instant,
    ) {
        if !self.enabled || !duration_secs.is_finite() || duration_secs <= 0.0 {
            return;
        }
        let Some(fraction) = PREWARM_FRACTIONS.get(usize::from(slot)) else {
            return;
        };
        let target = duration_secs * fraction;
        if self.cache.contains(second_key(target)) {
            return;
        }
        if self.in_flight.is_some() {
            timers.reschedule(TimerKind::Prewarm(slot), PREWARM_RETRY_DELAY, now);
            return;
        }
        self.start_capture(target, timers, now);
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Source changed: forget every preview and pending capture.
    pub fn reset(&mut self, timers: &mut Timers) {
        self.frames.reload();
        self.cache.clear();
        self.hover = None;
        self.in_flight = None;
        self.abandoned.clear();
        timers.cancel_where(|kind| {
            matches!(
                kind,
                TimerKind::ScrubDebounce | TimerKind::CaptureWatchdog | TimerKind::Prewarm(_)
            )
        });
    }
}
