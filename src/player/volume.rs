// SPDX-License-Identifier: MPL-2.0
//! Volume domain type for playback.
//!
//! Volume is an integer percentage in `0..=100`. Muting is a separate flag
//! owned by the controller, so the stored level survives mute/unmute.

use crate::config::{DEFAULT_VOLUME, MAX_VOLUME, MIN_VOLUME, VOLUME_STEP};

/// Volume level, guaranteed to be within `0..=100`.
///
/// # Example
///
/// ```
/// use iced_reel::player::Volume;
///
/// let vol = Volume::new(40);
/// assert_eq!(vol.value(), 40);
///
/// // Values outside range are clamped
/// assert_eq!(Volume::new(140).value(), 100);
/// assert_eq!(Volume::new(-3).value(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Volume(u8);

impl Volume {
    /// Creates a new volume level, clamping to valid range.
    #[must_use]
    pub fn new(volume: i32) -> Self {
        let clamped = volume.clamp(i32::from(MIN_VOLUME), i32::from(MAX_VOLUME));
        Self(u8::try_from(clamped).unwrap_or(MAX_VOLUME))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Returns the level as a gain in `0.0..=1.0`.
    #[must_use]
    pub fn as_fraction(self) -> f32 {
        f32::from(self.0) / f32::from(MAX_VOLUME)
    }

    /// Increases volume by one step, clamping to maximum.
    #[must_use]
    pub fn increase(self) -> Self {
        Self::new(i32::from(self.0) + i32::from(VOLUME_STEP))
    }

    /// Decreases volume by one step, clamping to minimum.
    #[must_use]
    pub fn decrease(self) -> Self {
        Self::new(i32::from(self.0) - i32::from(VOLUME_STEP))
    }

    #[must_use]
    pub fn is_silent(self) -> bool {
        self.0 == MIN_VOLUME
    }

    #[must_use]
    pub fn is_max(self) -> bool {
        self.0 >= MAX_VOLUME
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self(DEFAULT_VOLUME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;

    #[test]
    fn new_clamps_to_valid_range() {
        assert_eq!(Volume::new(-50).value(), MIN_VOLUME);
        assert_eq!(Volume::new(250).value(), MAX_VOLUME);
        assert_eq!(Volume::new(55).value(), 55);
    }

    #[test]
    fn default_is_expected_volume() {
        assert_eq!(Volume::default().value(), DEFAULT_VOLUME);
    }

    #[test]
    fn increase_and_decrease_step_and_clamp() {
        assert_eq!(Volume::new(50).increase().value(), 55);
        assert_eq!(Volume::new(50).decrease().value(), 45);
        assert_eq!(Volume::new(98).increase().value(), 100);
        assert_eq!(Volume::new(3).decrease().value(), 0);
    }

    #[test]
    fn as_fraction_maps_to_unit_range() {
        assert_abs_diff_eq!(Volume::new(0).as_fraction(), 0.0);
        assert_abs_diff_eq!(Volume::new(25).as_fraction(), 0.25);
        assert_abs_diff_eq!(Volume::new(100).as_fraction(), 1.0);
    }

    #[test]
    fn is_silent_and_is_max() {
        assert!(Volume::new(0).is_silent());
        assert!(!Volume::new(1).is_silent());
        assert!(Volume::new(100).is_max());
        assert!(!Volume::new(99).is_max());
    }
}
