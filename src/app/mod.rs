// SPDX-License-Identifier: MPL-2.0
//! Application root: hosts one player in a window.
//!
//! The `App` struct wires the player component to the FFmpeg pipelines,
//! localization and the settings file, and adds a source field so another
//! URL can be loaded without restarting.

mod message;
mod subscription;
mod update;

pub use message::{Flags, Message};

use crate::config::{self, Config, PlayerConfig};
use crate::i18n::fluent::I18n;
use crate::media::{DecoderHandle, GrabberHandle};
use crate::player::{self, Preferences, Volume};
use crate::ui::design_tokens::spacing;
use crate::ui::player_view::{self, ViewContext};
use crate::ui::theme::PlayerTheme;
use iced::widget::{button, text_input, Column, Row, Text};
use iced::{window, Element, Length, Subscription, Task, Theme};
use std::fmt;
use update::{PlayerState, UpdateContext};

/// Root Iced application state.
pub struct App {
    pub i18n: I18n,
    settings: Config,
    player: PlayerState,
    theme: PlayerTheme,
    source_input: String,
    fullscreen: bool,
    window_id: Option<window::Id>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("source", &self.player.config().source)
            .field("session", &self.player.session_id())
            .field("fullscreen", &self.fullscreen)
            .finish()
    }
}

pub const WINDOW_DEFAULT_HEIGHT: u32 = 540;
pub const WINDOW_DEFAULT_WIDTH: u32 = 960;
pub const MIN_WINDOW_HEIGHT: u32 = 360;
pub const MIN_WINDOW_WIDTH: u32 = 640;

/// Builds the window settings. Closing goes through the app so settings
/// are saved first.
pub fn window_settings() -> window::Settings {
    window::Settings {
        size: iced::Size::new(WINDOW_DEFAULT_WIDTH as f32, WINDOW_DEFAULT_HEIGHT as f32),
        min_size: Some(iced::Size::new(
            MIN_WINDOW_WIDTH as f32,
            MIN_WINDOW_HEIGHT as f32,
        )),
        exit_on_close_request: false,
        ..window::Settings::default()
    }
}

/// Entry point used by `main.rs` to launch the Iced application loop.
pub fn run(flags: Flags) -> iced::Result {
    use std::cell::RefCell;

    // iced 0.14 requires an Fn boot closure; the flags are consumed once.
    let boot_state = RefCell::new(Some(flags));
    let boot = move || {
        let flags = boot_state.borrow_mut().take().unwrap_or_default();
        App::new(flags)
    };

    iced::application(boot, App::update, App::view)
        .title(App::title)
        .theme(App::theme)
        .window(window_settings())
        .subscription(App::subscription)
        .run()
}

/// Resolves the player configuration: file first, then CLI overrides.
fn player_config(flags: &Flags) -> PlayerConfig {
    let mut config = match &flags.config_path {
        Some(path) => match config::player::load_from_path(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "player configuration unreadable, using defaults");
                PlayerConfig::default()
            }
        },
        None => PlayerConfig::default(),
    };

    if let Some(source) = &flags.source {
        config.source.clone_from(source);
    }
    if let Some(start) = flags.start_position {
        config.start_position = start.max(0.0);
    }
    if flags.autoplay {
        config.autoplay = true;
    }
    if flags.no_preview {
        config.disable_preview = true;
    }
    config
}

/// Viewer preferences restored from the settings file.
fn stored_preferences(settings: &Config) -> Preferences {
    Preferences {
        volume: settings
            .playback
            .volume
            .map_or_else(Volume::default, |volume| Volume::new(i32::from(volume))),
        muted: settings.playback.muted.unwrap_or(false),
        ..Preferences::default()
    }
}

impl App {
    fn new(flags: Flags) -> (Self, Task<Message>) {
        let (settings, settings_warning) = config::load();
        let player_config = player_config(&flags);
        let i18n = I18n::new(
            flags.lang.clone(),
            player_config.player_language.as_deref(),
            &settings,
        );
        if let Some(key) = settings_warning {
            tracing::warn!("{}", i18n.tr(&key));
        }

        let theme = PlayerTheme::from_config(&player_config);
        let media = DecoderHandle::new(player_config.autoplay_policy);
        let player = player::State::new(
            player_config,
            media,
            GrabberHandle::new(),
            stored_preferences(&settings),
        );
        let source_input = player.config().source.clone();

        let app = App {
            i18n,
            settings,
            player,
            theme,
            source_input,
            fullscreen: false,
            window_id: None,
        };
        (app, Task::none())
    }

    fn title(&self) -> String {
        self.player
            .config()
            .title
            .clone()
            .unwrap_or_else(|| self.i18n.tr("app-title"))
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn subscription(&self) -> Subscription<Message> {
        let config = self.player.config();
        let event_sub = subscription::create_event_subscription();
        let player_sub = self.player.subscription().map(Message::Player);
        let media_sub = subscription::create_media_subscription(
            &config.source,
            self.player.session_id(),
            self.player.scrub().is_enabled(),
        );

        Subscription::batch([event_sub, player_sub, media_sub])
    }

    fn update_context(&mut self) -> UpdateContext<'_> {
        UpdateContext {
            player: &mut self.player,
            settings: &mut self.settings,
            source_input: &mut self.source_input,
            fullscreen: &mut self.fullscreen,
            window_id: &self.window_id,
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Player(message) => {
                update::handle_player_message(&mut self.update_context(), message)
            }
            Message::Playback(message) => {
                update::handle_playback_message(&mut self.update_context(), message)
            }
            Message::Capture(message) => {
                update::handle_capture_message(&mut self.update_context(), message)
            }
            Message::SourceInputChanged(value) => {
                self.source_input = value;
                Task::none()
            }
            Message::LoadSource => {
                let source = self.source_input.trim().to_string();
                if source.is_empty() {
                    return Task::none();
                }
                update::load_source(&mut self.update_context(), source, 0.0);
                Task::none()
            }
            Message::WindowSeen(id) => {
                self.window_id = Some(id);
                Task::none()
            }
            Message::KeyPressed {
                window,
                key,
                modifiers,
                focus,
            } => {
                self.window_id = Some(window);
                update::handle_player_message(
                    &mut self.update_context(),
                    player::Message::Key {
                        key,
                        modifiers,
                        focus,
                    },
                )
            }
            Message::WindowCloseRequested(id) => {
                update::save_preferences(&mut self.settings, self.player.preferences());
                window::close(id)
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let player = player_view::view(
            ViewContext {
                i18n: &self.i18n,
                theme: self.theme,
            },
            &self.player,
        )
        .map(Message::Player);

        if self.fullscreen {
            return player;
        }

        let source_row = Row::new()
            .spacing(spacing::XS)
            .padding(spacing::XS)
            .push(
                text_input(&self.i18n.tr("app-source-placeholder"), &self.source_input)
                    .on_input(Message::SourceInputChanged)
                    .on_submit(Message::LoadSource)
                    .width(Length::Fill),
            )
            .push(button(Text::new(self.i18n.tr("app-load"))).on_press(Message::LoadSource));

        Column::new()
            .width(Length::Fill)
            .height(Length::Fill)
            .push(source_row)
            .push(player)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeneralConfig, PlaybackConfig};
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn cli_flags_override_player_config() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("player.toml");
        std::fs::write(
            &path,
            "source = \"https://cdn.example.com/a.mp4\"\nstart_position = 5.0\n",
        )
        .expect("write config");

        let flags = Flags {
            source: Some("https://cdn.example.com/b.mp4".into()),
            config_path: Some(path),
            start_position: Some(42.0),
            autoplay: true,
            no_preview: true,
            ..Flags::default()
        };
        let config = player_config(&flags);
        assert_eq!(config.source, "https://cdn.example.com/b.mp4");
        assert!((config.start_position - 42.0).abs() < f64::EPSILON);
        assert!(config.autoplay);
        assert!(config.disable_preview);
    }

    #[test]
    fn unreadable_player_config_falls_back_to_defaults() {
        let flags = Flags {
            config_path: Some(PathBuf::from("/nonexistent/player.toml")),
            ..Flags::default()
        };
        assert_eq!(player_config(&flags), PlayerConfig::default());
    }

    #[test]
    fn negative_start_is_clamped() {
        let flags = Flags {
            start_position: Some(-3.0),
            ..Flags::default()
        };
        assert!(player_config(&flags).start_position.abs() < f64::EPSILON);
    }

    #[test]
    fn stored_preferences_restore_volume_and_mute() {
        let settings = Config {
            general: GeneralConfig::default(),
            playback: PlaybackConfig {
                volume: Some(35),
                muted: Some(true),
            },
        };
        let preferences = stored_preferences(&settings);
        assert_eq!(preferences.volume.value(), 35);
        assert!(preferences.muted);
    }

    #[test]
    fn missing_preferences_use_defaults() {
        let preferences = stored_preferences(&Config::default());
        assert_eq!(preferences, Preferences::default());
    }

    #[test]
    fn window_close_is_handled_by_the_app() {
        assert!(!window_settings().exit_on_close_request);
    }
}
