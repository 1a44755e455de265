// SPDX-License-Identifier: MPL-2.0
//! Keyboard command router.
//!
//! | Key          | Command                               |
//! |--------------|---------------------------------------|
//! | Space        | Play/pause (or resume a blocked start) |
//! | Left / Right | Skip 5 seconds back / forward         |
//! | Up / Down    | Volume up / down by 5                 |
//! | M            | Toggle mute                           |
//! | F            | Toggle fullscreen                     |

use iced::keyboard::{self, key::Named, Key, Modifiers};

/// Where keyboard focus is when the key is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Player,
    /// A text field owns the key.
    TextEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePlay,
    SkipBackward,
    SkipForward,
    VolumeUp,
    VolumeDown,
    ToggleMute,
    ToggleFullscreen,
}

/// Maps a key press to a player command.
#[must_use]
pub fn route(key: &Key, modifiers: Modifiers, focus: Focus) -> Option<Command> {
    if focus == Focus::TextEntry {
        return None;
    }
    if modifiers.control() || modifiers.alt() || modifiers.logo() {
        return None;
    }

    match key {
        Key::Named(Named::Space) => Some(Command::TogglePlay),
        Key::Named(Named::ArrowLeft) => Some(Command::SkipBackward),
        Key::Named(Named::ArrowRight) => Some(Command::SkipForward),
        Key::Named(Named::ArrowUp) => Some(Command::VolumeUp),
        Key::Named(Named::ArrowDown) => Some(Command::VolumeDown),
        Key::Character(c) if c.as_str().eq_ignore_ascii_case("m") => Some(Command::ToggleMute),
        Key::Character(c) if c.as_str().eq_ignore_ascii_case("f") => {
            Some(Command::ToggleFullscreen)
        }
        _ => None,
    }
}

/// Extracts a routable key press from a keyboard event.
#[must_use]
pub fn key_press(event: &keyboard::Event) -> Option<(Key, Modifiers)> {
    match event {
        keyboard::Event::KeyPressed { key, modifiers, .. } => Some((key.clone(), *modifiers)),
        _ => None,
    }
}
