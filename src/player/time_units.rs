// SPDX-License-Identifier: MPL-2.0
//! Time conversions and formatting for the transport UI.

/// Microseconds per second as f64 for calculations.
pub const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Converts seconds to FFmpeg's `AV_TIME_BASE` units (microseconds).
///
/// # Examples
///
/// ```
/// use iced_reel::player::time_units::secs_to_av_timestamp;
///
/// assert_eq!(secs_to_av_timestamp(1.5), 1_500_000);
/// assert_eq!(secs_to_av_timestamp(-3.0), 0);
/// ```
#[inline]
pub fn secs_to_av_timestamp(secs: f64) -> i64 {
    (secs.max(0.0) * MICROS_PER_SECOND) as i64
}

/// Maps a pointer offset on the progress bar to a media time.
///
/// Returns `None` for degenerate geometry (zero-width bar or unknown duration)
/// so callers can treat it as a no-op.
///
/// # Examples
///
/// ```
/// use iced_reel::player::time_units::hovered_time;
///
/// assert_eq!(hovered_time(50.0, 200.0, 120.0), Some(30.0));
/// assert_eq!(hovered_time(10.0, 0.0, 120.0), None);
/// ```
pub fn hovered_time(pointer_x: f32, bar_width: f32, duration_secs: f64) -> Option<f64> {
    if !(bar_width > 0.0) || !(duration_secs > 0.0) || !pointer_x.is_finite() {
        return None;
    }
    let fraction = f64::from(pointer_x.clamp(0.0, bar_width) / bar_width);
    Some(duration_secs * fraction)
}

/// Cache key of a media time: the whole second at or before it.
#[inline]
pub fn second_key(secs: f64) -> u32 {
    secs.max(0.0).floor() as u32
}

/// Formats duration in MM:SS or HH:MM:SS format.
pub fn format_time(seconds: f64) -> String {
    let total_secs = seconds.max(0.0) as u64;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
