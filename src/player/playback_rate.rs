// SPDX-License-Identifier: MPL-2.0
//! Playback rate domain type.
//!
//! Rates come from configuration as display tokens: numeric strings such as
//! `"1.25"` or the literal `"Normal"`, an alias for `1.0`.

use crate::config::{MAX_PLAYBACK_RATE, NORMAL_RATE_TOKEN};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rejected playback rate token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid playback rate: {0:?}")]
pub struct InvalidRate(pub String);

/// Playback rate multiplier, always finite and within `(0, MAX_PLAYBACK_RATE]`.
///
/// # Example
///
/// ```
/// use iced_reel::player::PlaybackRate;
///
/// let rate: PlaybackRate = "Normal".parse().unwrap();
/// assert_eq!(rate.value(), 1.0);
/// assert!("fast".parse::<PlaybackRate>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackRate(f64);

impl PlaybackRate {
    pub const NORMAL: Self = Self(1.0);

    /// Validates a numeric rate.
    pub fn new(rate: f64) -> Result<Self, InvalidRate> {
        if rate.is_finite() && rate > 0.0 && rate <= MAX_PLAYBACK_RATE {
            Ok(Self(rate))
        } else {
            Err(InvalidRate(rate.to_string()))
        }
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn is_normal(self) -> bool {
        (self.0 - 1.0).abs() < f64::EPSILON
    }

    /// Returns true if `token` designates this rate.
    #[must_use]
    pub fn matches_token(self, token: &str) -> bool {
        token.parse::<Self>().is_ok_and(|rate| rate == self)
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl FromStr for PlaybackRate {
    type Err = InvalidRate;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        if token.eq_ignore_ascii_case(NORMAL_RATE_TOKEN) {
            return Ok(Self::NORMAL);
        }
        let numeric = token.strip_suffix('x').unwrap_or(token);
        numeric
            .parse::<f64>()
            .map_err(|_| InvalidRate(token.to_string()))
            .and_then(|rate| Self::new(rate).map_err(|_| InvalidRate(token.to_string())))
    }
}

impl fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_normal() {
            write!(f, "{}", NORMAL_RATE_TOKEN)
        } else {
            write!(f, "{}x", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;

    #[test]
    fn normal_token_maps_to_one() {
        assert_eq!("Normal".parse::<PlaybackRate>(), Ok(PlaybackRate::NORMAL));
        assert_eq!("normal".parse::<PlaybackRate>(), Ok(PlaybackRate::NORMAL));
    }

    #[test]
    fn numeric_tokens_parse() {
        assert_abs_diff_eq!("1.25".parse::<PlaybackRate>().unwrap().value(), 1.25);
        assert_abs_diff_eq!(" 0.5 ".parse::<PlaybackRate>().unwrap().value(), 0.5);
        assert_abs_diff_eq!("2x".parse::<PlaybackRate>().unwrap().value(), 2.0);
    }

    #[test]
    fn invalid_tokens_are_rejected() {
        for token in ["", "fast", "0", "-1", "NaN", "inf", "12"] {
            assert!(token.parse::<PlaybackRate>().is_err(), "{token} should be rejected");
        }
    }

    #[test]
    fn display_uses_normal_alias() {
        assert_eq!(PlaybackRate::NORMAL.to_string(), "Normal");
        assert_eq!(PlaybackRate::new(1.5).unwrap().to_string(), "1.5x");
    }

    #[test]
    fn matches_token_compares_values() {
        let rate = PlaybackRate::new(1.0).unwrap();
        assert!(rate.matches_token("Normal"));
        assert!(rate.matches_token("1"));
        assert!(!rate.matches_token("1.25"));
        assert!(!rate.matches_token("garbage"));
    }
}
