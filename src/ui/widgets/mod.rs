// SPDX-License-Identifier: MPL-2.0
pub mod animated_spinner;
pub mod progress_bar;

pub use animated_spinner::AnimatedSpinner;
pub use progress_bar::ProgressBar;
