// SPDX-License-Identifier: MPL-2.0
//! Test utilities for float comparisons and simulated clocks.
//!
//! Re-exports the `approx` crate's assertion macro for float comparison.

pub use approx::assert_abs_diff_eq;

use std::time::{Duration, Instant};

/// Returns `base` advanced by `millis` milliseconds.
pub fn later(base: Instant, millis: u64) -> Instant {
    base + Duration::from_millis(millis)
}
