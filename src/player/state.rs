// SPDX-License-Identifier: MPL-2.0
//! Playback controller and the state it derives from the primary pipeline.
//!
//! [`Controller`] is the only owner of the primary [`MediaHandle`]. Its state
//! is split into two enums instead of a bag of flags:
//!
//! - [`Phase`] follows the media lifecycle: `Loading -> Ready -> Ended`, with
//!   `Failed` reachable from anywhere and left only by loading a new source.
//! - [`Intent`] follows what the viewer asked for: `Paused`, `Playing`, or
//!   `AwaitingGesture` when the host environment refused to start playback.

use super::media::{MediaHandle, PlayError};
use super::{PlaybackRate, Volume};
use crate::config::{
    END_GUARD_LANDING_SECS, END_GUARD_SECS, END_POSITION_TOLERANCE_SECS, END_REWIND_SECS,
};
use crate::error::MediaError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for metadata.
    Loading,
    /// Duration known, playable.
    Ready,
    /// Reached the end for good.
    Ended,
    /// The pipeline reported an unrecoverable error.
    Failed(MediaError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Paused,
    Playing,
    /// Autoplay was refused; playback needs an explicit gesture.
    AwaitingGesture,
}

/// Who asked for playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOrigin {
    /// Automatic start (configuration, end-of-media rewind).
    Autoplay,
    /// Click, key press or recovery overlay.
    User,
}

/// Notifications for the host, produced by native events.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    CanPlay,
    Ended,
    Failed(MediaError),
}

/// Inputs that define one playback session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Session {
    pub start_position: f64,
    pub autoplay: bool,
}

/// Viewer preferences that survive source changes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Preferences {
    pub volume: Volume,
    pub muted: bool,
    pub rate: PlaybackRate,
}

#[derive(Debug)]
pub struct Controller<M> {
    media: M,
    session: Session,
    phase: Phase,
    intent: Intent,
    position_secs: f64,
    duration_secs: f64,
    buffered_fraction: f64,
    volume: Volume,
    muted: bool,
    rate: PlaybackRate,
    has_user_interacted_once: bool,
    /// Set by the first end-of-media of the session.
    end_seen: bool,
}

impl<M: MediaHandle> Controller<M> {
    pub fn new(mut media: M, session: Session, preferences: Preferences) -> Self {
        media.set_volume(preferences.volume);
        media.set_muted(preferences.muted);
        media.set_playback_rate(preferences.rate.value());
        Self {
            media,
            session,
            phase: Phase::Loading,
            intent: Intent::Paused,
            position_secs: session.start_position.max(0.0),
            duration_secs: 0.0,
            buffered_fraction: 0.0,
            volume: preferences.volume,
            muted: preferences.muted,
            rate: preferences.rate,
            has_user_interacted_once: false,
            end_seen: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn session(&self) -> Session {
        self.session
    }

    pub fn is_ready(&self) -> bool {
        self.phase != Phase::Loading
    }

    pub fn is_playing(&self) -> bool {
        self.intent == Intent::Playing
    }

    pub fn has_ended(&self) -> bool {
        self.phase == Phase::Ended
    }

    pub fn error(&self) -> Option<&MediaError> {
        match &self.phase {
            Phase::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn has_error(&self) -> bool {
        self.error().is_some()
    }

    pub fn requires_user_interaction(&self) -> bool {
        self.intent == Intent::AwaitingGesture
    }

    pub fn has_user_interacted_once(&self) -> bool {
        self.has_user_interacted_once
    }

    pub fn position_secs(&self) -> f64 {
        self.position_secs
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn buffered_fraction(&self) -> f64 {
        self.buffered_fraction
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn playback_rate(&self) -> PlaybackRate {
        self.rate
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            volume: self.volume,
            muted: self.muted,
            rate: self.rate,
        }
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Pauses when playing, otherwise attempts to play.
    pub fn toggle_play_pause(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.attempt_play(PlayOrigin::User);
        }
    }

    /// Attempts playback regardless of the current intent.
    ///
    /// Used by the autoplay recovery overlay and by the space bar while a
    /// gesture is required.
    pub fn force_play(&mut self) -> bool {
        self.attempt_play(PlayOrigin::User)
    }

    /// Asks the pipeline to play. A refusal never propagates: it moves the
    /// controller to [`Intent::AwaitingGesture`] or leaves it paused.
    pub fn attempt_play(&mut self, origin: PlayOrigin) -> bool {
        if self.has_error() {
            return false;
        }
        if origin == PlayOrigin::User {
            self.media.note_user_gesture();
        }
        if self.phase == Phase::Ended {
            self.position_secs = 0.0;
            self.media.seek(0.0);
            self.phase = Phase::Ready;
        }

        match self.media.play() {
            Ok(()) => {
                self.intent = Intent::Playing;
                if origin == PlayOrigin::User {
                    self.has_user_interacted_once = true;
                }
                true
            }
            Err(PlayError::NotAllowed) => {
                tracing::info!(?origin, "playback blocked until user gesture");
                self.intent = Intent::AwaitingGesture;
                false
            }
            Err(PlayError::Aborted(reason)) => {
                tracing::warn!(?origin, %reason, "play attempt aborted");
                self.intent = Intent::Paused;
                false
            }
        }
    }

    pub fn pause(&mut self) {
        self.intent = Intent::Paused;
        self.media.pause();
    }

    /// Moves the playhead, clamped to `[0, duration]`, and updates the
    /// position without waiting for the next time update.
    pub fn seek_to(&mut self, secs: f64) {
        if !secs.is_finite() || !matches!(self.phase, Phase::Ready | Phase::Ended) {
            return;
        }
        let target = secs.clamp(0.0, self.duration_secs);
        self.position_secs = target;
        self.media.seek(target);
        if self.phase == Phase::Ended {
            self.phase = Phase::Ready;
        }
    }

    /// Relative seek. Landing within the end guard is pulled back to
    /// `duration - 1` so the skip never triggers end-of-media by itself.
    pub fn skip(&mut self, delta_secs: f64) {
        if !delta_secs.is_finite() || !self.is_ready() {
            return;
        }
        let target = self.position_secs + delta_secs;
        let target = if target >= self.duration_secs - END_GUARD_SECS {
            (self.duration_secs - END_GUARD_LANDING_SECS).max(0.0)
        } else {
            target.max(0.0)
        };
        self.seek_to(target);
    }

    // =========================================================================
    // Volume & rate
    // =========================================================================

    /// Explicit volume change. A non-zero level unmutes.
    pub fn set_volume(&mut self, level: i32) {
        self.volume = Volume::new(level);
        self.media.set_volume(self.volume);
        if self.muted && !self.volume.is_silent() {
            self.set_muted(false);
        }
    }

    /// Mute never touches the stored volume level.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.media.set_muted(muted);
    }

    pub fn toggle_mute(&mut self) {
        self.set_muted(!self.muted);
    }

    /// Applies a rate token ("1.5", "Normal"). Invalid tokens are ignored.
    pub fn set_playback_rate(&mut self, token: &str) -> bool {
        match token.parse::<PlaybackRate>() {
            Ok(rate) => {
                self.rate = rate;
                self.media.set_playback_rate(rate.value());
                true
            }
            Err(err) => {
                tracing::debug!(%err, "ignoring playback rate");
                false
            }
        }
    }

    // =========================================================================
    // Native events
    // =========================================================================

    pub fn on_loaded_metadata(&mut self, duration_secs: f64) -> Option<ControllerEvent> {
        self.duration_secs = if duration_secs.is_finite() {
            duration_secs.max(0.0)
        } else {
            0.0
        };
        if self.phase != Phase::Loading {
            return None;
        }
        self.phase = Phase::Ready;

        let start = self.session.start_position.clamp(0.0, self.duration_secs);
        self.position_secs = start;
        if start > 0.0 {
            self.media.seek(start);
        }
        if self.session.autoplay {
            self.attempt_play(PlayOrigin::Autoplay);
        }
        Some(ControllerEvent::CanPlay)
    }

    pub fn on_time_update(&mut self, position_secs: f64) {
        if self.has_error() || !position_secs.is_finite() {
            return;
        }
        let upper = if self.duration_secs > 0.0 {
            self.duration_secs
        } else {
            f64::MAX
        };
        self.position_secs = position_secs.clamp(0.0, upper);
    }

    pub fn on_progress(&mut self, buffered_secs: f64) {
        if self.duration_secs > 0.0 && buffered_secs.is_finite() {
            self.buffered_fraction = (buffered_secs / self.duration_secs).clamp(0.0, 1.0);
        }
    }

    /// End-of-media. The first end of a session whose start position equals
    /// the duration is a stale resume point: rewind instead of finishing.
    pub fn on_ended(&mut self) -> Option<ControllerEvent> {
        if self.has_error() {
            return None;
        }
        let first_end = !self.end_seen;
        self.end_seen = true;

        if first_end && self.starts_at_end() {
            let target = (self.duration_secs - END_REWIND_SECS).max(0.0);
            tracing::debug!(target, "rewinding from stale resume point");
            self.seek_to(target);
            if self.session.autoplay {
                self.attempt_play(PlayOrigin::Autoplay);
            } else {
                self.pause();
            }
            return None;
        }

        self.phase = Phase::Ended;
        self.position_secs = self.duration_secs;
        self.pause();
        Some(ControllerEvent::Ended)
    }

    pub fn on_error(&mut self, error: MediaError) -> ControllerEvent {
        tracing::warn!(%error, "media error");
        self.phase = Phase::Failed(error.clone());
        self.intent = Intent::Paused;
        self.media.pause();
        ControllerEvent::Failed(error)
    }

    /// Starts a new session. Preferences and the interaction flag survive.
    pub fn reset(&mut self, session: Session) {
        self.media.reload();
        self.media.set_volume(self.volume);
        self.media.set_muted(self.muted);
        self.media.set_playback_rate(self.rate.value());
        self.session = session;
        self.phase = Phase::Loading;
        self.intent = Intent::Paused;
        self.position_secs = session.start_position.max(0.0);
        self.duration_secs = 0.0;
        self.buffered_fraction = 0.0;
        self.end_seen = false;
    }

    fn starts_at_end(&self) -> bool {
        self.duration_secs > 0.0
            && (self.session.start_position - self.duration_secs).abs() < END_POSITION_TOLERANCE_SECS
    }
}
