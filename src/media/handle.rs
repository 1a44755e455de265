// SPDX-License-Identifier: MPL-2.0
//! UI-side handles for the FFmpeg pipelines.
//!
//! The handles exist before their pipelines: a subscription hands over the
//! command channel with `Started` once its task is running. Until then
//! playback commands are queued and preview captures are refused.

use super::decoder::DecoderCommand;
use crate::config::AutoplayPolicy;
use crate::player::{
    CaptureError, CaptureRequest, FrameSource, MediaHandle, PlayError, Volume,
};
use tokio::sync::mpsc;

/// Primary pipeline handle.
///
/// Volume and mute are kept here as well as sent: they feed the autoplay
/// policy check and are replayed to every newly attached pipeline.
#[derive(Debug)]
pub struct DecoderHandle {
    sender: Option<mpsc::UnboundedSender<DecoderCommand>>,
    pending: Vec<DecoderCommand>,
    policy: AutoplayPolicy,
    user_activated: bool,
    volume: Volume,
    muted: bool,
}

impl DecoderHandle {
    #[must_use]
    pub fn new(policy: AutoplayPolicy) -> Self {
        Self {
            sender: None,
            pending: Vec::new(),
            policy,
            user_activated: false,
            volume: Volume::default(),
            muted: false,
        }
    }

    /// Connects the running decoder, replays volume and mute, then flushes
    /// queued commands.
    pub fn attach(&mut self, sender: mpsc::UnboundedSender<DecoderCommand>) {
        let audio_state = [
            DecoderCommand::SetVolume(self.volume),
            DecoderCommand::SetMuted(self.muted),
        ];
        for command in audio_state.into_iter().chain(self.pending.drain(..)) {
            if sender.send(command).is_err() {
                tracing::debug!("decoder gone before queued commands were sent");
                break;
            }
        }
        self.sender = Some(sender);
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.sender.is_some()
    }

    #[must_use]
    pub fn pending(&self) -> &[DecoderCommand] {
        &self.pending
    }

    /// Whether the host environment lets playback start right now.
    fn play_allowed(&self) -> bool {
        match self.policy {
            AutoplayPolicy::Allow => true,
            AutoplayPolicy::AllowMuted => {
                self.user_activated || self.muted || self.volume.is_silent()
            }
            AutoplayPolicy::RequireGesture => self.user_activated,
        }
    }

    fn send(&mut self, command: DecoderCommand) -> bool {
        match &self.sender {
            Some(sender) => {
                let sent = sender.send(command).is_ok();
                if !sent {
                    tracing::debug!("decoder not running, command dropped");
                }
                sent
            }
            None => {
                self.pending.push(command);
                true
            }
        }
    }
}

impl MediaHandle for DecoderHandle {
    fn play(&mut self) -> Result<(), PlayError> {
        if !self.play_allowed() {
            return Err(PlayError::NotAllowed);
        }
        if self.send(DecoderCommand::Play) {
            Ok(())
        } else {
            Err(PlayError::Aborted("decoder not running".to_string()))
        }
    }

    fn pause(&mut self) {
        self.send(DecoderCommand::Pause);
    }

    fn seek(&mut self, secs: f64) {
        self.send(DecoderCommand::Seek { target_secs: secs });
    }

    fn set_volume(&mut self, volume: Volume) {
        self.volume = volume;
        if self.is_attached() {
            self.send(DecoderCommand::SetVolume(volume));
        }
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if self.is_attached() {
            self.send(DecoderCommand::SetMuted(muted));
        }
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.send(DecoderCommand::SetRate(rate));
    }

    fn note_user_gesture(&mut self) {
        self.user_activated = true;
    }

    fn reload(&mut self) {
        self.sender = None;
        self.pending.clear();
    }
}

/// Secondary pipeline handle.
#[derive(Debug, Default)]
pub struct GrabberHandle {
    sender: Option<mpsc::UnboundedSender<CaptureRequest>>,
}

impl GrabberHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, sender: mpsc::UnboundedSender<CaptureRequest>) {
        self.sender = Some(sender);
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.sender.is_some()
    }
}

impl FrameSource for GrabberHandle {
    fn capture(&mut self, request: CaptureRequest) -> Result<(), CaptureError> {
        let sender = self.sender.as_ref().ok_or(CaptureError::Unavailable)?;
        sender
            .send(request)
            .map_err(|_| CaptureError::Unavailable)
    }

    fn reload(&mut self) {
        self.sender = None;
    }
}
