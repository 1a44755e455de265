// SPDX-License-Identifier: MPL-2.0
//! Host-supplied player configuration.
//!
//! Everything except `source` is optional. The structure deserializes from
//! TOML so the demo host can read it with `--config`:
//!
//! ```toml
//! source = "https://example.com/movie.mp4"
//! title = "Episode 3"
//! autoplay = true
//! start_position = 120.0
//!
//! [[qualities]]
//! id = "1080"
//! name = "1080p"
//! prefix = "HD"
//! playing = true
//! ```

use super::defaults::{DEFAULT_PLAYBACK_RATES, DEFAULT_PREVIEW_CACHE_CAPACITY, NORMAL_RATE_TOKEN};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Models the host environment's autoplay restriction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AutoplayPolicy {
    /// Playback may always start.
    Allow,
    /// Playback without a user gesture is only allowed while muted.
    #[default]
    AllowMuted,
    /// Playback never starts before a user gesture.
    RequireGesture,
}

/// A selectable rendition of the same content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Quality {
    pub id: String,
    pub name: String,
    /// Short badge shown next to the name ("HD", "4K").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default)]
    pub playing: bool,
    /// Source of this rendition, used by hosts that switch sources themselves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Entry of the reproduction list (playlist).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlaylistItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub playing: bool,
    /// Watched progress in percent.
    #[serde(default)]
    pub percent: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Descriptor of the next episode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NextUp {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Configuration of one player instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Progressive-download media URL (or local path).
    pub source: String,

    pub title: Option<String>,
    pub subtitle: Option<String>,
    /// Headline of the paused-info overlay.
    pub title_media: Option<String>,
    /// Secondary line of the paused-info overlay.
    pub extra_info_media: Option<String>,

    pub autoplay: bool,
    /// Where playback starts, in seconds.
    pub start_position: f64,

    pub playback_rate_enabled: bool,
    pub playback_rates: Vec<String>,
    /// Rate token applied when the player is created.
    pub playback_rate_start: String,

    /// Disables thumbnail capture; the numeric scrub tooltip stays.
    pub disable_preview: bool,
    pub preview_cache_capacity: usize,

    /// Shows the paused-info overlay once controls went idle.
    pub overlay_enabled: bool,
    /// Hides the controls after the idle timeout.
    pub auto_control_close_enabled: bool,

    pub back_button: bool,
    pub full_player: bool,

    pub primary_color: String,
    pub secondary_color: String,
    pub font_family: Option<String>,
    pub player_language: Option<String>,

    pub qualities: Vec<Quality>,
    pub reproduction_list: Vec<PlaylistItem>,
    pub data_next: Option<NextUp>,

    pub autoplay_policy: AutoplayPolicy,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            source: String::new(),
            title: None,
            subtitle: None,
            title_media: None,
            extra_info_media: None,
            autoplay: false,
            start_position: 0.0,
            playback_rate_enabled: false,
            playback_rates: DEFAULT_PLAYBACK_RATES.iter().map(ToString::to_string).collect(),
            playback_rate_start: NORMAL_RATE_TOKEN.to_string(),
            disable_preview: false,
            preview_cache_capacity: DEFAULT_PREVIEW_CACHE_CAPACITY,
            overlay_enabled: true,
            auto_control_close_enabled: true,
            back_button: false,
            full_player: true,
            primary_color: "#03dffc".to_string(),
            secondary_color: "#ffffff".to_string(),
            font_family: None,
            player_language: None,
            qualities: Vec::new(),
            reproduction_list: Vec::new(),
            data_next: None,
            autoplay_policy: AutoplayPolicy::default(),
        }
    }
}

impl PlayerConfig {
    /// Creates a configuration for `source` with every option at its default.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Returns the quality currently flagged as playing, if any.
    #[must_use]
    pub fn playing_quality(&self) -> Option<&Quality> {
        self.qualities.iter().find(|quality| quality.playing)
    }

    /// Flags `id` as the playing quality. Returns false for unknown ids.
    pub fn mark_quality_playing(&mut self, id: &str) -> bool {
        if !self.qualities.iter().any(|quality| quality.id == id) {
            return false;
        }
        for quality in &mut self.qualities {
            quality.playing = quality.id == id;
        }
        true
    }

    /// Flags `id` as the playing playlist entry. Returns false for unknown ids.
    pub fn mark_item_playing(&mut self, id: &str) -> bool {
        if !self.reproduction_list.iter().any(|item| item.id == id) {
            return false;
        }
        for item in &mut self.reproduction_list {
            item.playing = item.id == id;
        }
        true
    }
}

/// Reads a player configuration from a TOML file.
pub fn load_from_path(path: &Path) -> Result<PlayerConfig> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}
