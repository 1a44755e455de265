// SPDX-License-Identifier: MPL-2.0
//! Top-level messages and runtime flags for the application.

use crate::media::{CaptureMessage, PlaybackMessage};
use crate::player::{self, keyboard::Focus};
use iced::keyboard::{Key, Modifiers};
use iced::window;
use std::path::PathBuf;

/// Top-level messages consumed by `App::update`. The variants forward
/// lower-level component messages while keeping a single update entrypoint.
#[derive(Debug, Clone)]
pub enum Message {
    Player(player::Message),
    /// Primary pipeline lifecycle and media events.
    Playback(PlaybackMessage),
    /// Preview pipeline lifecycle and capture results.
    Capture(CaptureMessage),
    SourceInputChanged(String),
    /// Load the URL typed in the source field.
    LoadSource,
    /// A window event revealed the id of the main window.
    WindowSeen(window::Id),
    KeyPressed {
        window: window::Id,
        key: Key,
        modifiers: Modifiers,
        focus: Focus,
    },
    /// Window close was requested (user clicked X or pressed Alt+F4).
    WindowCloseRequested(window::Id),
}

/// Runtime flags passed in from the CLI to tweak startup behavior.
#[derive(Debug, Default)]
pub struct Flags {
    /// Media URL or path, overriding the one in the player configuration.
    pub source: Option<String>,
    /// Player configuration file (TOML).
    pub config_path: Option<PathBuf>,
    /// Optional locale override in BCP-47 form (e.g. `fr`, `en-US`).
    pub lang: Option<String>,
    /// Start position in seconds.
    pub start_position: Option<f64>,
    pub autoplay: bool,
    /// Disables scrub preview thumbnails.
    pub no_preview: bool,
}
