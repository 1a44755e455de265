// SPDX-License-Identifier: MPL-2.0
//! `iced_reel` is a streaming-service style video player built with the Iced
//! GUI framework.
//!
//! The [`player`] module holds the component state machine (playback,
//! autoplay recovery, scrub previews, stall detection, controls visibility
//! and keyboard routing). [`media`] plays sources through FFmpeg, [`ui`]
//! renders the player, and [`app`] hosts it in a window.

#![doc(html_root_url = "https://docs.rs/iced_reel/0.1.0")]

pub mod app;
pub mod config;
pub mod error;
pub mod i18n;
pub mod logging;
pub mod media;
pub mod player;
pub mod ui;

#[cfg(test)]
mod test_utils;
