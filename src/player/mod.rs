// SPDX-License-Identifier: MPL-2.0
//! Video player component.
//!
//! The player is a state machine driven by native media events, pointer and
//! keyboard input, and timers. It never talks to a decoder directly: the
//! primary pipeline sits behind [`MediaHandle`] and the preview pipeline
//! behind [`FrameSource`], so the whole component can be exercised with fakes.
//!
//! - [`state`]: playback controller and autoplay recovery
//! - [`stall`]: buffering detection
//! - [`scrub`] and [`preview_cache`]: progress bar hover previews
//! - [`visibility`]: controls idle timer, paused-info overlay, popovers
//! - [`keyboard`]: key bindings
//! - [`component`]: the composed component with its messages and effects

pub mod component;
pub mod keyboard;
pub mod media;
pub mod playback_rate;
pub mod preview_cache;
pub mod scrub;
pub mod stall;
pub mod state;
pub mod time_units;
pub mod timers;
pub mod visibility;
pub mod volume;

pub use component::{Effect, Message, State};
pub use media::{
    CaptureError, CaptureOutcome, CaptureRequest, FrameSource, MediaEvent, MediaHandle,
    PlayError, Thumbnail, VideoFrame,
};
pub use playback_rate::PlaybackRate;
pub use state::{Controller, Intent, Phase, PlayOrigin, Preferences, Session};
pub use visibility::{ControlsState, Popover};
pub use volume::Volume;
