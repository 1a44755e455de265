// SPDX-License-Identifier: MPL-2.0
//! The player component: state, messages and host effects.
//!
//! [`State`] composes the controller, the stall detector, the scrub engine and
//! the visibility state around one owned [`Timers`] set. It is mutated only
//! through [`State::update`]; everything the host needs to know comes back as
//! an [`Effect`].

use super::keyboard::{self, Command, Focus};
use super::media::{CaptureOutcome, FrameSource, MediaEvent, MediaHandle, VideoFrame};
use super::scrub::ScrubEngine;
use super::stall::StallDetector;
use super::state::{Controller, ControllerEvent, Preferences, Session};
use super::time_units::hovered_time;
use super::timers::{TimerKind, Timers};
use super::visibility::{Popover, Visibility};
use super::{PlaybackRate, Volume};
use crate::config::{PlayerConfig, DOUBLE_CLICK_THRESHOLD, SKIP_STEP_SECS, TICK_INTERVAL};
use crate::error::MediaError;
use iced::keyboard::{Key, Modifiers};
use iced::{time, Subscription};
use std::time::Instant;

/// Spinner rotation per tick, in radians.
const SPINNER_STEP: f32 = std::f32::consts::PI / 10.0;

#[derive(Debug, Clone)]
pub enum Message {
    /// Native event of the primary pipeline, tagged with its session.
    Media { session: u64, event: MediaEvent },
    CaptureFinished(CaptureOutcome),
    Tick(Instant),
    PointerMoved,
    SurfaceClicked,
    ProgressHovered { x: f32, width: f32 },
    ProgressLeft,
    ProgressPressed { x: f32, width: f32 },
    TogglePlayback,
    /// The autoplay recovery overlay was clicked.
    RecoverPlayback,
    SkipBackward,
    SkipForward,
    SetVolume(u8),
    ToggleMute,
    SetPlaybackRate(String),
    TogglePopover(Popover),
    SelectQuality(String),
    SelectPlaylistItem(String),
    NextClicked,
    Close,
    ToggleFullscreen,
    Key {
        key: Key,
        modifiers: Modifiers,
        focus: Focus,
    },
}

/// Host callbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    CanPlay,
    /// Raw playhead position reported by the pipeline.
    TimeUpdate(f64),
    Ended,
    Error(MediaError),
    NextClicked,
    PlaylistItemSelected(String),
    QualityChanged(String),
    Close,
    ToggleFullscreen,
}

#[derive(Debug)]
pub struct State<M, F> {
    config: PlayerConfig,
    controller: Controller<M>,
    stall: StallDetector,
    scrub: ScrubEngine<F>,
    visibility: Visibility,
    timers: Timers,
    session_id: u64,
    current_frame: Option<VideoFrame>,
    last_click: Option<Instant>,
    spinner_rotation: f32,
}

impl<M: MediaHandle, F: FrameSource> State<M, F> {
    pub fn new(config: PlayerConfig, media: M, frames: F, preferences: Preferences) -> Self {
        let mut preferences = preferences;
        match config.playback_rate_start.parse::<PlaybackRate>() {
            Ok(rate) => preferences.rate = rate,
            Err(err) => tracing::warn!(%err, "ignoring initial playback rate"),
        }
        let session = Session {
            start_position: config.start_position,
            autoplay: config.autoplay,
        };
        Self {
            controller: Controller::new(media, session, preferences),
            stall: StallDetector::new(),
            scrub: ScrubEngine::new(
                frames,
                !config.disable_preview,
                config.preview_cache_capacity,
            ),
            visibility: Visibility::new(config.auto_control_close_enabled, config.overlay_enabled),
            timers: Timers::new(),
            session_id: 0,
            current_frame: None,
            last_click: None,
            spinner_rotation: 0.0,
            config,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn controller(&self) -> &Controller<M> {
        &self.controller
    }

    pub fn scrub(&self) -> &ScrubEngine<F> {
        &self.scrub
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn media_mut(&mut self) -> &mut M {
        self.controller.media_mut()
    }

    pub fn frames_mut(&mut self) -> &mut F {
        self.scrub.frames_mut()
    }

    /// Identifies the current source; bumped on every [`State::load`].
    #[must_use]
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn current_frame(&self) -> Option<&VideoFrame> {
        self.current_frame.as_ref()
    }

    #[must_use]
    pub fn spinner_rotation(&self) -> f32 {
        self.spinner_rotation
    }

    #[must_use]
    pub fn shows_spinner(&self) -> bool {
        self.stall
            .shows_spinner(self.controller.phase(), self.controller.is_playing())
    }

    #[must_use]
    pub fn is_waiting_on_buffer(&self) -> bool {
        self.stall.is_waiting_on_buffer()
    }

    /// True while a timer is pending or the spinner animates.
    #[must_use]
    pub fn has_pending_work(&self) -> bool {
        !self.timers.is_empty() || self.shows_spinner()
    }

    pub fn preferences(&self) -> Preferences {
        self.controller.preferences()
    }

    /// Tick subscription, only while something is scheduled.
    pub fn subscription(&self) -> Subscription<Message> {
        if self.has_pending_work() {
            time::every(TICK_INTERVAL).map(Message::Tick)
        } else {
            Subscription::none()
        }
    }

    // =========================================================================
    // Source
    // =========================================================================

    /// Switches to a new source. Every timer, preview and pending capture of
    /// the previous source is dropped; preferences survive.
    pub fn load(&mut self, source: impl Into<String>, start_position: f64) {
        self.config.source = source.into();
        self.config.start_position = start_position;
        self.session_id += 1;
        tracing::info!(
            source = %self.config.source,
            session = self.session_id,
            start_position,
            "loading source"
        );

        self.timers.cancel_all();
        self.controller.reset(Session {
            start_position,
            autoplay: self.config.autoplay,
        });
        self.stall.reset(&mut self.timers);
        self.scrub.reset(&mut self.timers);
        self.visibility.reset(&mut self.timers);
        self.current_frame = None;
        self.last_click = None;
    }

    // =========================================================================
    // Update
    // =========================================================================

    pub fn update(&mut self, message: Message) -> Effect {
        self.update_at(message, Instant::now())
    }

    /// Applies `message` as if it arrived at `now`.
    pub fn update_at(&mut self, message: Message, now: Instant) -> Effect {
        match message {
            Message::Media { session, event } => {
                if session != self.session_id {
                    tracing::debug!(session, current = self.session_id, "dropping stale media event");
                    return Effect::None;
                }
                self.on_media_event(event, now)
            }
            Message::CaptureFinished(outcome) => {
                let hovered = self.scrub.hovered_secs();
                self.scrub
                    .on_capture_complete(outcome, hovered, &mut self.timers, now);
                Effect::None
            }
            Message::Tick(at) => {
                self.on_tick(at);
                Effect::None
            }
            Message::PointerMoved => {
                self.visibility.on_activity(&mut self.timers, now);
                Effect::None
            }
            Message::SurfaceClicked => self.on_surface_click(now),
            Message::ProgressHovered { x, width } => {
                self.visibility.on_activity(&mut self.timers, now);
                let duration = self.controller.duration_secs();
                self.scrub
                    .on_hover(x, width, duration, &mut self.timers, now);
                Effect::None
            }
            Message::ProgressLeft => {
                self.scrub.on_leave(&mut self.timers);
                Effect::None
            }
            Message::ProgressPressed { x, width } => {
                self.visibility.on_activity(&mut self.timers, now);
                if let Some(target) = hovered_time(x, width, self.controller.duration_secs()) {
                    self.controller.seek_to(target);
                }
                Effect::None
            }
            Message::TogglePlayback => self.apply(Command::TogglePlay, now),
            Message::RecoverPlayback => {
                self.visibility.on_activity(&mut self.timers, now);
                if self.controller.force_play() {
                    self.stall.arm(&mut self.timers, now);
                }
                Effect::None
            }
            Message::SkipBackward => self.apply(Command::SkipBackward, now),
            Message::SkipForward => self.apply(Command::SkipForward, now),
            Message::SetVolume(level) => {
                self.visibility.on_activity(&mut self.timers, now);
                self.set_volume(Volume::new(i32::from(level)), now);
                Effect::None
            }
            Message::ToggleMute => self.apply(Command::ToggleMute, now),
            Message::SetPlaybackRate(token) => {
                self.visibility.on_activity(&mut self.timers, now);
                if self.controller.set_playback_rate(&token) {
                    self.visibility.close_popover();
                }
                Effect::None
            }
            Message::TogglePopover(popover) => {
                self.visibility
                    .toggle_popover(popover, &mut self.timers, now);
                Effect::None
            }
            Message::SelectQuality(id) => {
                self.visibility.close_popover();
                if self.config.mark_quality_playing(&id) {
                    Effect::QualityChanged(id)
                } else {
                    tracing::debug!(%id, "unknown quality");
                    Effect::None
                }
            }
            Message::SelectPlaylistItem(id) => {
                self.visibility.close_popover();
                if self.config.mark_item_playing(&id) {
                    Effect::PlaylistItemSelected(id)
                } else {
                    tracing::debug!(%id, "unknown playlist item");
                    Effect::None
                }
            }
            Message::NextClicked => {
                self.visibility.close_popover();
                Effect::NextClicked
            }
            Message::Close => Effect::Close,
            Message::ToggleFullscreen => self.apply(Command::ToggleFullscreen, now),
            Message::Key {
                key,
                modifiers,
                focus,
            } => match keyboard::route(&key, modifiers, focus) {
                Some(command) => self.apply(command, now),
                None => Effect::None,
            },
        }
    }

    fn on_media_event(&mut self, event: MediaEvent, now: Instant) -> Effect {
        match event {
            MediaEvent::LoadedMetadata { duration_secs } => {
                match self.controller.on_loaded_metadata(duration_secs) {
                    Some(ControllerEvent::CanPlay) => {
                        tracing::debug!(duration_secs, "media ready");
                        self.scrub.schedule_prewarm(&mut self.timers, now);
                        if self.controller.is_playing() {
                            self.stall.arm(&mut self.timers, now);
                        }
                        self.visibility.on_activity(&mut self.timers, now);
                        Effect::CanPlay
                    }
                    _ => Effect::None,
                }
            }
            MediaEvent::TimeUpdate { position_secs } => {
                if self.controller.has_error() {
                    return Effect::None;
                }
                self.controller.on_time_update(position_secs);
                self.stall.on_time_update(&mut self.timers, now);
                Effect::TimeUpdate(position_secs)
            }
            MediaEvent::Progress { buffered_secs } => {
                self.controller.on_progress(buffered_secs);
                Effect::None
            }
            MediaEvent::FrameReady(frame) => {
                if !self.controller.has_error() {
                    self.current_frame = Some(frame);
                }
                Effect::None
            }
            MediaEvent::Ended => match self.controller.on_ended() {
                Some(ControllerEvent::Ended) => {
                    self.stall.reset(&mut self.timers);
                    Effect::Ended
                }
                _ => {
                    if self.controller.is_playing() {
                        self.stall.arm(&mut self.timers, now);
                    }
                    Effect::None
                }
            },
            MediaEvent::Failed(error) => {
                self.controller.on_error(error.clone());
                self.stall.reset(&mut self.timers);
                self.current_frame = None;
                Effect::Error(error)
            }
        }
    }

    fn on_tick(&mut self, at: Instant) {
        for kind in self.timers.take_due(at) {
            match kind {
                TimerKind::ControlsIdle => self.visibility.on_idle_fired(
                    !self.controller.is_playing() && !self.controller.has_error(),
                ),
                TimerKind::BufferStall => {
                    self.stall.on_timeout(self.controller.is_playing());
                    if self.stall.is_waiting_on_buffer() {
                        tracing::debug!(
                            position = self.controller.position_secs(),
                            "waiting on buffer"
                        );
                    }
                }
                TimerKind::VolumeOverlay => self.visibility.on_volume_overlay_fired(),
                TimerKind::ScrubDebounce => self.scrub.on_debounce_fired(&mut self.timers, at),
                TimerKind::CaptureWatchdog => self.scrub.on_watchdog_fired(),
                TimerKind::Prewarm(slot) => {
                    let duration = self.controller.duration_secs();
                    self.scrub
                        .on_prewarm_fired(slot, duration, &mut self.timers, at);
                }
            }
        }

        if self.shows_spinner() {
            self.spinner_rotation =
                (self.spinner_rotation + SPINNER_STEP) % std::f32::consts::TAU;
        }
    }

    /// Every click toggles playback; a second click within the threshold
    /// also toggles fullscreen.
    fn on_surface_click(&mut self, now: Instant) -> Effect {
        let double = self
            .last_click
            .is_some_and(|previous| now.duration_since(previous) <= DOUBLE_CLICK_THRESHOLD);
        self.visibility.on_activity(&mut self.timers, now);
        self.visibility.close_popover();
        self.toggle_playback(now);

        if double {
            self.last_click = None;
            Effect::ToggleFullscreen
        } else {
            self.last_click = Some(now);
            Effect::None
        }
    }

    fn apply(&mut self, command: Command, now: Instant) -> Effect {
        self.visibility.on_activity(&mut self.timers, now);
        match command {
            Command::TogglePlay => self.toggle_playback(now),
            Command::SkipBackward => self.controller.skip(-SKIP_STEP_SECS),
            Command::SkipForward => self.controller.skip(SKIP_STEP_SECS),
            Command::VolumeUp => {
                let volume = self.controller.volume().increase();
                self.set_volume(volume, now);
            }
            Command::VolumeDown => {
                let volume = self.controller.volume().decrease();
                self.set_volume(volume, now);
            }
            Command::ToggleMute => {
                self.controller.toggle_mute();
                self.visibility.show_volume_overlay(&mut self.timers, now);
            }
            Command::ToggleFullscreen => return Effect::ToggleFullscreen,
        }
        Effect::None
    }

    /// Plays or pauses; while a gesture is required this forces playback.
    fn toggle_playback(&mut self, now: Instant) {
        if self.controller.requires_user_interaction() {
            self.controller.force_play();
        } else {
            self.controller.toggle_play_pause();
        }

        if self.controller.is_playing() {
            self.stall.arm(&mut self.timers, now);
        } else {
            self.stall.reset(&mut self.timers);
        }
    }

    fn set_volume(&mut self, volume: Volume, now: Instant) {
        self.controller.set_volume(i32::from(volume.value()));
        self.visibility.show_volume_overlay(&mut self.timers, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::media::{CaptureError, CaptureRequest, PlayError};
    use crate::player::state::Intent;
    use crate::test_utils::{assert_abs_diff_eq, later};
    use iced::keyboard::key::Named;

    #[derive(Debug, Default)]
    struct FakeMedia {
        refuse: Option<PlayError>,
        seeks: Vec<f64>,
        reloads: usize,
    }

    impl MediaHandle for FakeMedia {
        fn play(&mut self) -> Result<(), PlayError> {
            match self.refuse.clone() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
        fn pause(&mut self) {}
        fn seek(&mut self, secs: f64) {
            self.seeks.push(secs);
        }
        fn set_volume(&mut self, _volume: Volume) {}
        fn set_muted(&mut self, _muted: bool) {}
        fn set_playback_rate(&mut self, _rate: f64) {}
        fn note_user_gesture(&mut self) {
            if self.refuse == Some(PlayError::NotAllowed) {
                self.refuse = None;
            }
        }
        fn reload(&mut self) {
            self.reloads += 1;
        }
    }

    #[derive(Debug, Default)]
    struct FakeFrames {
        requests: Vec<CaptureRequest>,
    }

    impl FrameSource for FakeFrames {
        fn capture(&mut self, request: CaptureRequest) -> Result<(), CaptureError> {
            self.requests.push(request);
            Ok(())
        }
    }

    fn player(config: PlayerConfig) -> State<FakeMedia, FakeFrames> {
        State::new(
            config,
            FakeMedia::default(),
            FakeFrames::default(),
            Preferences::default(),
        )
    }

    fn media(event: MediaEvent) -> Message {
        Message::Media { session: 0, event }
    }

    fn ready(state: &mut State<FakeMedia, FakeFrames>, duration_secs: f64, now: Instant) -> Effect {
        state.update_at(media(MediaEvent::LoadedMetadata { duration_secs }), now)
    }

    fn key(key: Key) -> Message {
        Message::Key {
            key,
            modifiers: Modifiers::empty(),
            focus: Focus::Player,
        }
    }

    #[test]
    fn metadata_reports_can_play_and_schedules_prewarm() {
        let now = Instant::now();
        let mut state = player(PlayerConfig::new("clip.mp4"));

        assert_eq!(ready(&mut state, 120.0, now), Effect::CanPlay);
        assert!(state.timers().is_pending(TimerKind::Prewarm(0)));
        assert!(!state.shows_spinner());
    }

    #[test]
    fn disabled_preview_skips_prewarm() {
        let now = Instant::now();
        let mut config = PlayerConfig::new("clip.mp4");
        config.disable_preview = true;
        let mut state = player(config);

        ready(&mut state, 120.0, now);
        assert!(!state.timers().is_pending(TimerKind::Prewarm(0)));
    }

    #[test]
    fn time_update_is_reported_raw() {
        let now = Instant::now();
        let mut state = player(PlayerConfig::new("clip.mp4"));
        ready(&mut state, 120.0, now);

        let effect = state.update_at(
            media(MediaEvent::TimeUpdate {
                position_secs: 12.5,
            }),
            now,
        );
        assert_eq!(effect, Effect::TimeUpdate(12.5));
        assert_abs_diff_eq!(state.controller().position_secs(), 12.5);
    }

    #[test]
    fn stale_session_events_are_dropped() {
        let now = Instant::now();
        let mut state = player(PlayerConfig::new("a.mp4"));
        state.load("b.mp4", 0.0);

        let effect = state.update_at(
            media(MediaEvent::LoadedMetadata {
                duration_secs: 10.0,
            }),
            now,
        );
        assert_eq!(effect, Effect::None);
        assert!(!state.controller().is_ready());
    }

    #[test]
    fn load_resets_session_and_timers() {
        let now = Instant::now();
        let mut state = player(PlayerConfig::new("a.mp4"));
        ready(&mut state, 60.0, now);
        state.update_at(Message::SetVolume(40), now);

        state.load("b.mp4", 5.0);

        assert_eq!(state.session_id(), 1);
        assert!(state.timers().is_empty());
        assert!(!state.controller().is_ready());
        assert_eq!(state.preferences().volume.value(), 40);
        assert_eq!(state.controller().media().reloads, 1);
        assert_eq!(state.config().source, "b.mp4");
    }

    #[test]
    fn space_forces_play_when_gesture_required() {
        let now = Instant::now();
        let mut config = PlayerConfig::new("clip.mp4");
        config.autoplay = true;
        let mut state = State::new(
            config,
            FakeMedia {
                refuse: Some(PlayError::NotAllowed),
                ..FakeMedia::default()
            },
            FakeFrames::default(),
            Preferences::default(),
        );
        ready(&mut state, 60.0, now);
        assert!(state.controller().requires_user_interaction());

        state.update_at(key(Key::Named(Named::Space)), now);

        assert_eq!(state.controller().intent(), Intent::Playing);
        assert!(state.controller().has_user_interacted_once());
    }

    #[test]
    fn double_click_toggles_fullscreen() {
        let now = Instant::now();
        let mut state = player(PlayerConfig::new("clip.mp4"));
        ready(&mut state, 60.0, now);

        assert_eq!(state.update_at(Message::SurfaceClicked, now), Effect::None);
        assert!(state.controller().is_playing());
        assert_eq!(
            state.update_at(Message::SurfaceClicked, later(now, 200)),
            Effect::ToggleFullscreen
        );
        assert!(!state.controller().is_playing());
    }

    #[test]
    fn slow_clicks_are_single_clicks() {
        let now = Instant::now();
        let mut state = player(PlayerConfig::new("clip.mp4"));
        ready(&mut state, 60.0, now);

        state.update_at(Message::SurfaceClicked, now);
        assert_eq!(
            state.update_at(Message::SurfaceClicked, later(now, 400)),
            Effect::None
        );
    }

    #[test]
    fn volume_keys_show_overlay() {
        let now = Instant::now();
        let mut state = player(PlayerConfig::new("clip.mp4"));
        ready(&mut state, 60.0, now);

        state.update_at(key(Key::Named(Named::ArrowDown)), now);

        assert_eq!(state.preferences().volume.value(), 95);
        assert!(state.visibility().volume_overlay_visible());
        state.update_at(Message::Tick(later(now, 2000)), later(now, 2000));
        assert!(!state.visibility().volume_overlay_visible());
    }

    #[test]
    fn text_entry_keys_are_ignored() {
        let now = Instant::now();
        let mut state = player(PlayerConfig::new("clip.mp4"));
        ready(&mut state, 60.0, now);

        state.update_at(
            Message::Key {
                key: Key::Character("m".into()),
                modifiers: Modifiers::empty(),
                focus: Focus::TextEntry,
            },
            now,
        );
        assert!(!state.preferences().muted);
    }

    #[test]
    fn quality_selection_reports_change() {
        let mut config = PlayerConfig::new("clip.mp4");
        config.qualities = vec![
            crate::config::Quality {
                id: "hd".into(),
                name: "1080p".into(),
                prefix: Some("HD".into()),
                playing: true,
                url: None,
            },
            crate::config::Quality {
                id: "sd".into(),
                name: "480p".into(),
                prefix: None,
                playing: false,
                url: None,
            },
        ];
        let mut state = player(config);

        assert_eq!(
            state.update(Message::SelectQuality("sd".into())),
            Effect::QualityChanged("sd".into())
        );
        assert_eq!(
            state.config().playing_quality().map(|q| q.id.as_str()),
            Some("sd")
        );
        assert_eq!(state.update(Message::SelectQuality("4k".into())), Effect::None);
    }

    #[test]
    fn error_hides_surface_and_reports() {
        let now = Instant::now();
        let mut state = player(PlayerConfig::new("clip.mp4"));
        ready(&mut state, 60.0, now);

        let effect = state.update_at(media(MediaEvent::Failed(MediaError::Corrupted)), now);

        assert_eq!(effect, Effect::Error(MediaError::Corrupted));
        assert!(state.current_frame().is_none());
        assert!(!state.shows_spinner());
        assert_eq!(
            state.update_at(
                media(MediaEvent::TimeUpdate {
                    position_secs: 3.0
                }),
                now
            ),
            Effect::None
        );
    }

    #[test]
    fn idle_shows_paused_info_when_paused() {
        let now = Instant::now();
        let mut state = player(PlayerConfig::new("clip.mp4"));
        ready(&mut state, 60.0, now);

        state.update_at(Message::PointerMoved, now);
        state.update_at(Message::Tick(later(now, 3000)), later(now, 3000));

        assert!(!state.visibility().controls_visible());
        assert!(state.visibility().paused_info_visible());
    }

    #[test]
    fn progress_press_seeks() {
        let now = Instant::now();
        let mut state = player(PlayerConfig::new("clip.mp4"));
        ready(&mut state, 200.0, now);

        state.update_at(
            Message::ProgressPressed {
                x: 50.0,
                width: 100.0,
            },
            now,
        );
        assert_abs_diff_eq!(state.controller().position_secs(), 100.0);
        assert_eq!(state.controller().media().seeks.last(), Some(&100.0));
    }
}
