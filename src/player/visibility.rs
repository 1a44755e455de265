// SPDX-License-Identifier: MPL-2.0
//! Controls visibility, the paused-info overlay and popovers.

use super::timers::{TimerKind, Timers};
use crate::config::{CONTROLS_IDLE_TIMEOUT, VOLUME_OVERLAY_TIMEOUT};
use std::time::Instant;

/// Activity state of the transport controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlsState {
    /// Recent pointer or keyboard activity.
    Active,
    /// The idle timer fired.
    Idle { paused_info: bool },
}

/// The popover currently open above the controls, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Popover {
    #[default]
    Closed,
    Quality,
    PlaybackRate,
    Playlist,
    NextUp,
}

#[derive(Debug)]
pub struct Visibility {
    controls: ControlsState,
    popover: Popover,
    volume_overlay: bool,
    auto_hide: bool,
    overlay_enabled: bool,
}

impl Visibility {
    #[must_use]
    pub fn new(auto_hide: bool, overlay_enabled: bool) -> Self {
        Self {
            controls: ControlsState::Active,
            popover: Popover::Closed,
            volume_overlay: false,
            auto_hide,
            overlay_enabled,
        }
    }

    #[must_use]
    pub fn controls(&self) -> ControlsState {
        self.controls
    }

    /// Controls stay visible when auto-hide is disabled.
    #[must_use]
    pub fn controls_visible(&self) -> bool {
        self.controls == ControlsState::Active || !self.auto_hide
    }

    #[must_use]
    pub fn paused_info_visible(&self) -> bool {
        self.controls == ControlsState::Idle { paused_info: true }
    }

    #[must_use]
    pub fn popover(&self) -> Popover {
        self.popover
    }

    #[must_use]
    pub fn volume_overlay_visible(&self) -> bool {
        self.volume_overlay
    }

    /// Pointer movement or a key binding: show the controls and restart
    /// the idle timer.
    pub fn on_activity(&mut self, timers: &mut Timers, now: Instant) {
        self.controls = ControlsState::Active;
        timers.reschedule(TimerKind::ControlsIdle, CONTROLS_IDLE_TIMEOUT, now);
    }

    pub fn on_idle_fired(&mut self, is_paused: bool) {
        self.controls = ControlsState::Idle {
            paused_info: is_paused && self.overlay_enabled,
        };
        if self.auto_hide {
            self.popover = Popover::Closed;
        }
    }

    pub fn show_volume_overlay(&mut self, timers: &mut Timers, now: Instant) {
        self.volume_overlay = true;
        timers.reschedule(TimerKind::VolumeOverlay, VOLUME_OVERLAY_TIMEOUT, now);
    }

    pub fn on_volume_overlay_fired(&mut self) {
        self.volume_overlay = false;
    }

    /// Opens `popover`, or closes it when it is already open.
    pub fn toggle_popover(&mut self, popover: Popover, timers: &mut Timers, now: Instant) {
        self.popover = if self.popover == popover {
            Popover::Closed
        } else {
            popover
        };
        self.on_activity(timers, now);
    }

    pub fn close_popover(&mut self) {
        self.popover = Popover::Closed;
    }

    pub fn reset(&mut self, timers: &mut Timers) {
        self.controls = ControlsState::Active;
        self.popover = Popover::Closed;
        self.volume_overlay = false;
        timers.cancel(TimerKind::ControlsIdle);
        timers.cancel(TimerKind::VolumeOverlay);
    }
}
