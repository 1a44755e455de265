// SPDX-License-Identifier: MPL-2.0
//! Subscriptions for the application.
//!
//! Routes native window and keyboard events, and runs the two media
//! pipelines of the current source.

use super::Message;
use crate::media;
use crate::player::keyboard::{self, Focus};
use iced::{event, window, Event, Subscription};

/// Routes window lifecycle and key presses.
///
/// Key presses captured by a widget (the source text field) are tagged
/// [`Focus::TextEntry`] so the player ignores them.
pub fn create_event_subscription() -> Subscription<Message> {
    event::listen_with(|event, status, window_id| match &event {
        Event::Window(window::Event::CloseRequested) => {
            Some(Message::WindowCloseRequested(window_id))
        }
        Event::Window(window::Event::Opened { .. } | window::Event::Focused) => {
            Some(Message::WindowSeen(window_id))
        }
        Event::Keyboard(keyboard_event) => {
            let (key, modifiers) = keyboard::key_press(keyboard_event)?;
            let focus = match status {
                event::Status::Captured => Focus::TextEntry,
                event::Status::Ignored => Focus::Player,
            };
            Some(Message::KeyPressed {
                window: window_id,
                key,
                modifiers,
                focus,
            })
        }
        _ => None,
    })
}

/// Runs the playback pipeline, and the preview pipeline unless previews are
/// disabled, for the current session. Nothing runs without a source.
pub fn create_media_subscription(
    source: &str,
    session: u64,
    preview_enabled: bool,
) -> Subscription<Message> {
    if source.trim().is_empty() {
        return Subscription::none();
    }

    let playback = media::playback(source.to_string(), session).map(Message::Playback);
    if !preview_enabled {
        return playback;
    }

    let captures = media::captures(source.to_string(), session).map(Message::Capture);
    Subscription::batch([playback, captures])
}
