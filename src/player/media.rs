// SPDX-License-Identifier: MPL-2.0
//! Seams between the player state machine and the decoding pipelines.
//!
//! The controller drives the primary pipeline through [`MediaHandle`]; the
//! scrub engine drives an independent secondary pipeline through
//! [`FrameSource`]. Both report back asynchronously: the primary pipeline via
//! [`MediaEvent`]s and the secondary one via [`CaptureOutcome`]s.

use super::Volume;
use crate::error::MediaError;
use iced::widget::image;
use thiserror::Error;

/// Why a play attempt was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayError {
    /// The host environment's autoplay policy requires a user gesture.
    #[error("playback requires a user gesture")]
    NotAllowed,

    /// The pipeline could not start (torn down, not yet loaded...).
    #[error("playback aborted: {0}")]
    Aborted(String),
}

/// Imperative surface of the primary playback pipeline.
///
/// Calls are fire-and-forget: effects are observed through later
/// [`MediaEvent`]s. Only [`MediaHandle::play`] reports a synchronous outcome,
/// because its rejection is the autoplay-policy signal.
pub trait MediaHandle {
    /// Starts or resumes playback.
    fn play(&mut self) -> Result<(), PlayError>;

    fn pause(&mut self);

    /// Moves the playhead. `secs` is already clamped by the caller.
    fn seek(&mut self, secs: f64);

    fn set_volume(&mut self, volume: Volume);

    fn set_muted(&mut self, muted: bool);

    fn set_playback_rate(&mut self, rate: f64);

    /// Records that the next play attempt follows a user gesture.
    fn note_user_gesture(&mut self) {}

    /// Drops the current pipeline; later calls target the next source.
    fn reload(&mut self) {}
}

/// A decoded frame of the primary pipeline, ready for display.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub handle: image::Handle,
    pub width: u32,
    pub height: u32,
    pub pts_secs: f64,
}

/// Native events of the primary pipeline.
#[derive(Debug, Clone)]
pub enum MediaEvent {
    /// Metadata is known: the media is ready.
    LoadedMetadata { duration_secs: f64 },
    /// Playhead progress.
    TimeUpdate { position_secs: f64 },
    /// Download progress, as the end of the buffered range.
    Progress { buffered_secs: f64 },
    FrameReady(VideoFrame),
    Ended,
    Failed(MediaError),
}

/// A compressed preview frame.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub handle: image::Handle,
    /// Encoded size in bytes.
    pub size_bytes: usize,
}

impl Thumbnail {
    /// Wraps encoded image bytes (JPEG, PNG...).
    #[must_use]
    pub fn from_encoded(bytes: Vec<u8>) -> Self {
        let size_bytes = bytes.len();
        Self {
            handle: image::Handle::from_bytes(bytes),
            size_bytes,
        }
    }
}

/// Request for one preview frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRequest {
    pub id: u64,
    pub target_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("capture pipeline unavailable")]
    Unavailable,
    #[error("capture failed: {0}")]
    Failed(String),
}

/// Result of a [`CaptureRequest`], tagged with the request id.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub id: u64,
    pub requested_secs: f64,
    pub result: Result<Thumbnail, CaptureError>,
}

/// Secondary, muted pipeline used only for preview captures.
///
/// It must never share state with the primary [`MediaHandle`]: its seeks are
/// independent and never move the main playhead.
pub trait FrameSource {
    /// Submits a capture. Completion arrives later as a [`CaptureOutcome`].
    fn capture(&mut self, request: CaptureRequest) -> Result<(), CaptureError>;

    /// Drops the current pipeline; later captures target the next source.
    fn reload(&mut self) {}
}
