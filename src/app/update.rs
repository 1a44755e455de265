// SPDX-License-Identifier: MPL-2.0
//! Update helpers: player effects, pipeline wiring and window management.

use super::Message;
use crate::config::{self, Config, PlayerConfig};
use crate::media::{CaptureMessage, DecoderHandle, GrabberHandle, PlaybackMessage};
use crate::player::{self, Effect, Preferences};
use iced::{window, Task};

pub type PlayerState = player::State<DecoderHandle, GrabberHandle>;

/// Mutable application state needed by the update helpers.
pub struct UpdateContext<'a> {
    pub player: &'a mut PlayerState,
    pub settings: &'a mut Config,
    pub source_input: &'a mut String,
    pub fullscreen: &'a mut bool,
    pub window_id: &'a Option<window::Id>,
}

/// Forwards a message to the player and acts on the resulting callback.
pub fn handle_player_message(ctx: &mut UpdateContext<'_>, message: player::Message) -> Task<Message> {
    let effect = ctx.player.update(message);
    handle_effect(ctx, effect)
}

/// Host side of the player callbacks.
pub fn handle_effect(ctx: &mut UpdateContext<'_>, effect: Effect) -> Task<Message> {
    match effect {
        Effect::None => Task::none(),
        Effect::CanPlay => {
            tracing::info!(
                duration = ctx.player.controller().duration_secs(),
                "can play"
            );
            Task::none()
        }
        Effect::TimeUpdate(position_secs) => {
            tracing::trace!(position_secs, "time update");
            Task::none()
        }
        Effect::Ended => {
            tracing::info!("playback ended");
            Task::none()
        }
        Effect::Error(error) => {
            tracing::warn!(%error, "media error");
            Task::none()
        }
        Effect::NextClicked => {
            let next = ctx
                .player
                .config()
                .data_next
                .as_ref()
                .and_then(|next| next.url.clone());
            tracing::info!(url = ?next, "next clicked");
            if let Some(url) = next {
                load_source(ctx, url, 0.0);
            }
            Task::none()
        }
        Effect::PlaylistItemSelected(id) => {
            let url = playlist_url(ctx.player.config(), &id);
            tracing::info!(%id, url = ?url, "playlist item selected");
            if let Some(url) = url {
                load_source(ctx, url, 0.0);
            }
            Task::none()
        }
        Effect::QualityChanged(id) => {
            let url = quality_url(ctx.player.config(), &id);
            tracing::info!(%id, url = ?url, "quality changed");
            if let Some(url) = url {
                // Same content in another rendition: keep the position.
                let position = ctx.player.controller().position_secs();
                load_source(ctx, url, position);
            }
            Task::none()
        }
        Effect::Close => {
            tracing::info!("close requested by the player");
            save_preferences(ctx.settings, ctx.player.preferences());
            match ctx.window_id {
                Some(id) => window::close(*id),
                None => iced::exit(),
            }
        }
        Effect::ToggleFullscreen => {
            let desired = !*ctx.fullscreen;
            update_fullscreen_mode(ctx.fullscreen, ctx.window_id.as_ref(), desired)
        }
    }
}

/// Connects a started primary pipeline if it belongs to the current source.
pub fn handle_playback_message(ctx: &mut UpdateContext<'_>, message: PlaybackMessage) -> Task<Message> {
    match message {
        PlaybackMessage::Started { session, sender } => {
            if session == ctx.player.session_id() {
                ctx.player.media_mut().attach(sender);
            } else {
                tracing::debug!(session, "ignoring stale playback pipeline");
            }
            Task::none()
        }
        PlaybackMessage::Event { session, event } => {
            handle_player_message(ctx, player::Message::Media { session, event })
        }
    }
}

/// Connects a started preview pipeline if it belongs to the current source.
pub fn handle_capture_message(ctx: &mut UpdateContext<'_>, message: CaptureMessage) -> Task<Message> {
    match message {
        CaptureMessage::Started { session, sender } => {
            if session == ctx.player.session_id() {
                ctx.player.frames_mut().attach(sender);
            } else {
                tracing::debug!(session, "ignoring stale preview pipeline");
            }
            Task::none()
        }
        CaptureMessage::Finished(outcome) => {
            handle_player_message(ctx, player::Message::CaptureFinished(outcome))
        }
    }
}

/// Switches the player to `source`.
pub fn load_source(ctx: &mut UpdateContext<'_>, source: String, start_position: f64) {
    ctx.source_input.clone_from(&source);
    ctx.player.load(source, start_position);
}

/// Stores volume and mute in the settings file.
pub fn save_preferences(settings: &mut Config, preferences: Preferences) {
    settings.playback.volume = Some(preferences.volume.value());
    settings.playback.muted = Some(preferences.muted);
    if let Err(err) = config::save(settings) {
        tracing::warn!(%err, "failed to save settings");
    }
}

fn quality_url(config: &PlayerConfig, id: &str) -> Option<String> {
    config
        .qualities
        .iter()
        .find(|quality| quality.id == id)
        .and_then(|quality| quality.url.clone())
}

fn playlist_url(config: &PlayerConfig, id: &str) -> Option<String> {
    config
        .reproduction_list
        .iter()
        .find(|item| item.id == id)
        .and_then(|item| item.url.clone())
}

fn update_fullscreen_mode(
    fullscreen: &mut bool,
    window_id: Option<&window::Id>,
    desired: bool,
) -> Task<Message> {
    if *fullscreen == desired {
        return Task::none();
    }

    let Some(window_id) = window_id else {
        tracing::debug!("fullscreen toggle before the window is known");
        return Task::none();
    };

    *fullscreen = desired;
    let mode = if desired {
        window::Mode::Fullscreen
    } else {
        window::Mode::Windowed
    };
    window::set_mode(*window_id, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlaylistItem, Quality};

    fn config_with_urls() -> PlayerConfig {
        let mut config = PlayerConfig::new("https://cdn.example.com/ep1-1080.mp4");
        config.qualities = vec![
            Quality {
                id: "1080".into(),
                name: "1080p".into(),
                playing: true,
                url: Some("https://cdn.example.com/ep1-1080.mp4".into()),
                ..Quality::default()
            },
            Quality {
                id: "480".into(),
                name: "480p".into(),
                ..Quality::default()
            },
        ];
        config.reproduction_list = vec![PlaylistItem {
            id: "ep2".into(),
            name: "Episode 2".into(),
            url: Some("https://cdn.example.com/ep2.mp4".into()),
            ..PlaylistItem::default()
        }];
        config
    }

    #[test]
    fn quality_url_requires_known_id_with_url() {
        let config = config_with_urls();
        assert_eq!(
            quality_url(&config, "1080").as_deref(),
            Some("https://cdn.example.com/ep1-1080.mp4")
        );
        assert_eq!(quality_url(&config, "480"), None);
        assert_eq!(quality_url(&config, "4k"), None);
    }

    #[test]
    fn playlist_url_finds_item() {
        let config = config_with_urls();
        assert_eq!(
            playlist_url(&config, "ep2").as_deref(),
            Some("https://cdn.example.com/ep2.mp4")
        );
        assert_eq!(playlist_url(&config, "ep9"), None);
    }

    #[test]
    fn fullscreen_needs_window_id() {
        let mut fullscreen = false;
        let _ = update_fullscreen_mode(&mut fullscreen, None, true);
        assert!(!fullscreen);
    }

    #[test]
    fn fullscreen_toggles_with_window_id() {
        let mut fullscreen = false;
        let id = window::Id::unique();
        let _ = update_fullscreen_mode(&mut fullscreen, Some(&id), true);
        assert!(fullscreen);
        let _ = update_fullscreen_mode(&mut fullscreen, Some(&id), false);
        assert!(!fullscreen);
    }
}
