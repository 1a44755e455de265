// SPDX-License-Identifier: MPL-2.0
//! End-to-end behavior of the player component driven through its public
//! messages, with fake pipelines and a simulated clock.

use approx::assert_abs_diff_eq;
use iced::keyboard::key::Named;
use iced::keyboard::{Key, Modifiers};
use iced_reel::config::PlayerConfig;
use iced_reel::error::MediaError;
use iced_reel::player::keyboard::Focus;
use iced_reel::ui::player_view::shows_paused_info;
use iced_reel::player::{
    CaptureError, CaptureOutcome, CaptureRequest, Effect, FrameSource, MediaEvent, MediaHandle,
    Message, PlayError, Preferences, State, Thumbnail, Volume,
};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct FakeMedia {
    refuse: Option<PlayError>,
    seeks: Vec<f64>,
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

type Player = State<FakeMedia, FakeFrames>;

fn player(config: PlayerConfig) -> Player {
    State::new(
        config,
        FakeMedia::default(),
        FakeFrames::default(),
        Preferences::default(),
    )
}

fn at(base: Instant, millis: u64) -> Instant {
    base + Duration::from_millis(millis)
}

fn media(state: &Player, event: MediaEvent) -> Message {
    Message::Media {
        session: state.session_id(),
        event,
    }
}

fn ready(state: &mut Player, duration_secs: f64, now: Instant) -> Effect {
    let message = media(state, MediaEvent::LoadedMetadata { duration_secs });
    state.update_at(message, now)
}

fn press(key: Key, focus: Focus) -> Message {
    Message::Key {
        key,
        modifiers: Modifiers::empty(),
        focus,
    }
}

fn tick(state: &mut Player, now: Instant) {
    state.update_at(Message::Tick(now), now);
}

#[test]
fn skips_stay_within_media_and_stop_short_of_the_end() {
    let now = Instant::now();
    let mut state = player(PlayerConfig::new("clip.mp4"));
    ready(&mut state, 60.0, now);

    let right = || press(Key::Named(Named::ArrowRight), Focus::Player);
    let left = || press(Key::Named(Named::ArrowLeft), Focus::Player);

    state.update_at(right(), now);
    assert_abs_diff_eq!(state.controller().position_secs(), 5.0);

    state.update_at(left(), now);
    state.update_at(left(), now);
    assert_abs_diff_eq!(state.controller().position_secs(), 0.0);

    for start in [50.0, 56.0, 58.5, 59.5, 60.0] {
        let message = media(&state, MediaEvent::TimeUpdate { position_secs: start });
        state.update_at(message, now);
        state.update_at(right(), now);
        let position = state.controller().position_secs();
        assert!((0.0..=60.0).contains(&position));
        if start + 5.0 >= 58.0 {
            assert_abs_diff_eq!(position, 59.0);
        } else {
            assert_abs_diff_eq!(position, start + 5.0);
        }
    }
}

#[test]
fn skip_on_very_short_media_never_goes_negative() {
    let now = Instant::now();
    let mut state = player(PlayerConfig::new("clip.mp4"));
    ready(&mut state, 0.5, now);

    state.update_at(press(Key::Named(Named::ArrowRight), Focus::Player), now);
    assert_abs_diff_eq!(state.controller().position_secs(), 0.0);
}

#[test]
fn unmuting_restores_the_volume_level() {
    let now = Instant::now();
    let mut state = player(PlayerConfig::new("clip.mp4"));
    ready(&mut state, 60.0, now);

    for level in 0..=100u8 {
        state.update_at(Message::SetVolume(level), now);
        state.update_at(Message::ToggleMute, now);
        assert!(state.preferences().muted);
        state.update_at(Message::ToggleMute, now);
        assert!(!state.preferences().muted);
        assert_eq!(state.preferences().volume.value(), level);
    }
}

#[test]
fn second_hover_on_the_same_second_is_served_from_cache() {
    let now = Instant::now();
    let mut state = player(PlayerConfig::new("clip.mp4"));
    ready(&mut state, 120.0, now);

    let hover = Message::ProgressHovered {
        x: 25.0,
        width: 100.0,
    };
    state.update_at(hover.clone(), now);
    tick(&mut state, at(now, 200));
    assert_eq!(state.scrub().frames().requests.len(), 1);

    let request = state.scrub().frames().requests[0];
    assert_abs_diff_eq!(request.target_secs, 30.0);
    state.update_at(
        Message::CaptureFinished(CaptureOutcome {
            id: request.id,
            requested_secs: request.target_secs,
            result: Ok(Thumbnail::from_encoded(vec![0xFF, 0xD8, 0xFF, 0xD9])),
        }),
        at(now, 250),
    );

    state.update_at(Message::ProgressLeft, at(now, 300));
    state.update_at(hover, at(now, 350));
    let preview_shown = state
        .scrub()
        .hover()
        .is_some_and(|hover| hover.preview.is_some() && !hover.loading);
    assert!(preview_shown);

    tick(&mut state, at(now, 600));
    assert_eq!(state.scrub().frames().requests.len(), 1);
    assert_eq!(state.scrub().captures_started(), 1);
}

#[test]
fn source_change_resets_session_state() {
    let now = Instant::now();
    let mut state = player(PlayerConfig::new("a.mp4"));
    ready(&mut state, 120.0, now);

    state.update_at(
        Message::ProgressHovered {
            x: 50.0,
            width: 100.0,
        },
        now,
    );
    tick(&mut state, at(now, 200));
    let request = state.scrub().frames().requests[0];
    state.update_at(
        Message::CaptureFinished(CaptureOutcome {
            id: request.id,
            requested_secs: request.target_secs,
            result: Ok(Thumbnail::from_encoded(vec![1, 2, 3])),
        }),
        at(now, 250),
    );
    assert!(state.scrub().is_cached(60.0));

    let message = media(&state, MediaEvent::Ended);
    assert_eq!(state.update_at(message, at(now, 300)), Effect::Ended);
    assert!(state.controller().has_ended());

    state.load("b.mp4", 12.0);
    assert!(!state.scrub().is_cached(60.0));
    assert_abs_diff_eq!(state.controller().position_secs(), 12.0);
    assert!(!state.controller().has_ended());
    assert!(!state.controller().has_error());

    ready(&mut state, 90.0, at(now, 400));
    let message = media(&state, MediaEvent::Failed(MediaError::Corrupted));
    state.update_at(message, at(now, 450));
    assert!(state.controller().has_error());

    state.load("c.mp4", 0.0);
    assert!(!state.controller().has_error());
    assert!(!state.controller().has_ended());
    assert_abs_diff_eq!(state.controller().position_secs(), 0.0);
}

#[test]
fn resume_point_at_the_end_rewinds_once() {
    let now = Instant::now();
    let mut config = PlayerConfig::new("clip.mp4");
    config.start_position = 600.0;
    let mut state = player(config);
    ready(&mut state, 600.0, now);

    let first = media(&state, MediaEvent::Ended);
    assert_eq!(state.update_at(first, now), Effect::None);
    assert!(!state.controller().has_ended());
    assert_abs_diff_eq!(state.controller().position_secs(), 570.0);
    assert_eq!(state.controller().media().seeks.last(), Some(&570.0));

    let second = media(&state, MediaEvent::Ended);
    assert_eq!(state.update_at(second, at(now, 1000)), Effect::Ended);
    assert!(state.controller().has_ended());
}

#[test]
fn blocked_autoplay_recovers_on_gesture() {
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

    assert_eq!(ready(&mut state, 60.0, now), Effect::CanPlay);
    assert!(state.controller().requires_user_interaction());
    assert!(!state.controller().is_playing());
    assert!(!state.controller().has_user_interacted_once());

    state.update_at(Message::RecoverPlayback, at(now, 500));
    assert!(!state.controller().requires_user_interaction());
    assert!(state.controller().is_playing());
    assert!(state.controller().has_user_interacted_once());
}

#[test]
fn idle_controls_hide_and_reveal_paused_info() {
    let now = Instant::now();
    let mut state = player(PlayerConfig::new("clip.mp4"));
    ready(&mut state, 60.0, now);

    state.update_at(Message::PointerMoved, at(now, 100));
    assert!(state.visibility().controls_visible());
    assert!(!state.visibility().paused_info_visible());

    tick(&mut state, at(now, 2000));
    assert!(state.visibility().controls_visible());

    tick(&mut state, at(now, 3100));
    assert!(!state.visibility().controls_visible());
    assert!(state.visibility().paused_info_visible());

    state.update_at(Message::PointerMoved, at(now, 3200));
    assert!(state.visibility().controls_visible());
    assert!(!state.visibility().paused_info_visible());
}

#[test]
fn idle_controls_hide_without_paused_info_while_playing() {
    let now = Instant::now();
    let mut state = player(PlayerConfig::new("clip.mp4"));
    ready(&mut state, 60.0, now);
    state.update_at(Message::TogglePlayback, now);
    assert!(state.controller().is_playing());

    state.update_at(Message::PointerMoved, at(now, 100));
    tick(&mut state, at(now, 3100));
    assert!(!state.visibility().controls_visible());
    assert!(!state.visibility().paused_info_visible());
}

#[test]
fn idle_with_blocked_autoplay_leaves_the_recovery_overlay_on_top() {
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

    state.update_at(Message::PointerMoved, at(now, 100));
    tick(&mut state, at(now, 3200));

    assert!(!state.visibility().controls_visible());
    assert!(state.visibility().paused_info_visible());
    assert!(!shows_paused_info(&state));

    state.update_at(Message::RecoverPlayback, at(now, 3300));
    state.update_at(Message::TogglePlayback, at(now, 3400));
    state.update_at(Message::PointerMoved, at(now, 3500));
    tick(&mut state, at(now, 6600));
    assert!(!state.controller().is_playing());
    assert!(shows_paused_info(&state));
}

#[test]
fn idle_after_the_end_shows_paused_info() {
    let now = Instant::now();
    let mut state = player(PlayerConfig::new("clip.mp4"));
    ready(&mut state, 60.0, now);
    state.update_at(Message::TogglePlayback, now);

    let ended = media(&state, MediaEvent::Ended);
    assert_eq!(state.update_at(ended, at(now, 50)), Effect::Ended);
    assert!(state.controller().has_ended());

    state.update_at(Message::PointerMoved, at(now, 100));
    tick(&mut state, at(now, 3200));

    assert!(!state.visibility().controls_visible());
    assert!(state.visibility().paused_info_visible());
    assert!(shows_paused_info(&state));
}

#[test]
fn idle_after_a_failure_hides_paused_info() {
    let now = Instant::now();
    let mut state = player(PlayerConfig::new("clip.mp4"));
    ready(&mut state, 60.0, now);

    let failed = media(&state, MediaEvent::Failed(MediaError::Network("reset".to_string())));
    state.update_at(failed, at(now, 50));
    state.update_at(Message::PointerMoved, at(now, 100));
    tick(&mut state, at(now, 3200));

    assert!(!state.visibility().paused_info_visible());
    assert!(!shows_paused_info(&state));
}

#[test]
fn controls_stay_when_auto_hide_is_disabled() {
    let now = Instant::now();
    let mut config = PlayerConfig::new("clip.mp4");
    config.auto_control_close_enabled = false;
    let mut state = player(config);
    ready(&mut state, 60.0, now);

    state.update_at(Message::PointerMoved, now);
    tick(&mut state, at(now, 5000));
    assert!(state.visibility().controls_visible());
}

#[test]
fn keys_typed_into_a_text_field_leave_the_player_alone() {
    let now = Instant::now();
    let mut state = player(PlayerConfig::new("clip.mp4"));
    ready(&mut state, 60.0, now);
    let message = media(&state, MediaEvent::TimeUpdate { position_secs: 20.0 });
    state.update_at(message, now);

    let before_intent = state.controller().intent();
    let before_volume = state.preferences().volume;

    for named in [
        Named::Space,
        Named::ArrowLeft,
        Named::ArrowRight,
        Named::ArrowUp,
        Named::ArrowDown,
    ] {
        let effect = state.update_at(press(Key::Named(named), Focus::TextEntry), now);
        assert_eq!(effect, Effect::None);
    }

    assert_eq!(state.controller().intent(), before_intent);
    assert_abs_diff_eq!(state.controller().position_secs(), 20.0);
    assert_eq!(state.preferences().volume, before_volume);
    assert!(state.controller().media().seeks.is_empty());
}
