// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for timings, steps and
//! sizes used across the player. Constants are organized by category.
//!
//! # Categories
//!
//! - **Timers**: Idle, stall, overlay, debounce and watchdog windows
//! - **Transport**: Skip step, end guard and rewind distance
//! - **Volume**: Volume bounds and keyboard step
//! - **Scrub Preview**: Thumbnail geometry, encoding and cache bounds
//! - **Pipeline**: Decoder pacing and event throttling

use std::time::Duration;

// ==========================================================================
// Timer Defaults
// ==========================================================================

/// Idle time after the last pointer or keyboard activity before controls hide.
pub const CONTROLS_IDLE_TIMEOUT: Duration = Duration::from_secs(3);

/// Time without a time update before playback is considered stalled.
pub const BUFFER_STALL_TIMEOUT: Duration = Duration::from_secs(1);

/// How long the volume overlay stays on screen after a volume change.
pub const VOLUME_OVERLAY_TIMEOUT: Duration = Duration::from_secs(2);

/// Debounce between the last hover position and a preview capture.
pub const SCRUB_DEBOUNCE: Duration = Duration::from_millis(150);

/// A capture that has not completed within this window is abandoned.
pub const CAPTURE_WATCHDOG_TIMEOUT: Duration = Duration::from_secs(2);

/// Delay before the first preview pre-warm capture after the media is ready.
pub const PREWARM_BASE_DELAY: Duration = Duration::from_millis(800);

/// Additional delay between consecutive pre-warm slots.
pub const PREWARM_STAGGER: Duration = Duration::from_millis(400);

/// Upper bound of the random jitter added to each pre-warm slot (ms).
pub const PREWARM_JITTER_MAX_MS: u64 = 600;

/// Retry delay when a pre-warm slot fires while a capture is in flight.
pub const PREWARM_RETRY_DELAY: Duration = Duration::from_millis(250);

/// Fractions of the duration captured in the background after readiness.
pub const PREWARM_FRACTIONS: [f64; 4] = [0.0, 0.25, 0.5, 0.75];

/// Two surface clicks closer than this form a double-click.
pub const DOUBLE_CLICK_THRESHOLD: Duration = Duration::from_millis(300);

/// Tick period of the timer subscription.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

// ==========================================================================
// Transport Defaults
// ==========================================================================

/// Seconds skipped by the arrow keys and skip buttons.
pub const SKIP_STEP_SECS: f64 = 5.0;

/// A skip landing closer than this to the end is pulled back.
pub const END_GUARD_SECS: f64 = 2.0;

/// Distance from the end where a guarded skip lands.
pub const END_GUARD_LANDING_SECS: f64 = 1.0;

/// Distance from the end where a stale resume point rewinds to.
pub const END_REWIND_SECS: f64 = 30.0;

/// Tolerance when comparing the start position with the duration.
pub const END_POSITION_TOLERANCE_SECS: f64 = 0.5;

/// Relevance window between a requested preview time and the hover time.
pub const PREVIEW_RELEVANCE_SECS: f64 = 1.0;

// ==========================================================================
// Volume Defaults
// ==========================================================================

/// Default playback volume (0 to 100).
pub const DEFAULT_VOLUME: u8 = 100;

/// Minimum volume level.
pub const MIN_VOLUME: u8 = 0;

/// Maximum volume level.
pub const MAX_VOLUME: u8 = 100;

/// Volume adjustment step per key press.
pub const VOLUME_STEP: u8 = 5;

// ==========================================================================
// Playback Rate Defaults
// ==========================================================================

/// Display token for the 1.0 playback rate.
pub const NORMAL_RATE_TOKEN: &str = "Normal";

/// Rate options offered when the configuration does not list any.
pub const DEFAULT_PLAYBACK_RATES: [&str; 7] = ["0.25", "0.5", "0.75", "Normal", "1.25", "1.5", "2"];

/// Highest accepted playback rate.
pub const MAX_PLAYBACK_RATE: f64 = 4.0;

// ==========================================================================
// Scrub Preview Defaults
// ==========================================================================

/// Width of a captured preview thumbnail in pixels.
pub const THUMBNAIL_WIDTH: u32 = 160;

/// Height of a captured preview thumbnail in pixels.
pub const THUMBNAIL_HEIGHT: u32 = 90;

/// JPEG quality used for preview thumbnails.
pub const THUMBNAIL_JPEG_QUALITY: u8 = 40;

/// Maximum number of cached preview thumbnails per source.
pub const DEFAULT_PREVIEW_CACHE_CAPACITY: usize = 300;

// ==========================================================================
// Pipeline Defaults
// ==========================================================================

/// Minimum interval between two time-update events from the decoder.
pub const TIME_UPDATE_INTERVAL: Duration = Duration::from_millis(250);

/// Sleep of the decoder loop while idle.
pub const DECODER_IDLE_SLEEP: Duration = Duration::from_millis(10);

/// Frames decoded after a preview seek before giving up on reaching the target.
pub const CAPTURE_MAX_DECODED_FRAMES: usize = 120;

/// Consecutive packet or conversion failures after which playback is reported as failed.
pub const MAX_CONSECUTIVE_DECODE_ERRORS: u32 = 30;

/// Audio is queued this far ahead of its presentation time.
pub const AUDIO_LOOKAHEAD: Duration = Duration::from_millis(200);

/// Seconds of audio the output device buffer may hold; excess samples are dropped.
pub const AUDIO_OUTPUT_BUFFER_SECS: usize = 1;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    assert!(MIN_VOLUME < MAX_VOLUME);
    assert!(DEFAULT_VOLUME <= MAX_VOLUME);
    assert!(VOLUME_STEP > 0);

    assert!(END_GUARD_SECS > END_GUARD_LANDING_SECS);
    assert!(END_REWIND_SECS > END_GUARD_SECS);
    assert!(SKIP_STEP_SECS > 0.0);

    assert!(THUMBNAIL_WIDTH > 0 && THUMBNAIL_HEIGHT > 0);
    assert!(THUMBNAIL_JPEG_QUALITY > 0 && THUMBNAIL_JPEG_QUALITY <= 100);
    assert!(DEFAULT_PREVIEW_CACHE_CAPACITY > 0);
    assert!(MAX_PLAYBACK_RATE > 1.0);
    assert!(MAX_CONSECUTIVE_DECODE_ERRORS > 0);
    assert!(AUDIO_OUTPUT_BUFFER_SECS > 0);
};
