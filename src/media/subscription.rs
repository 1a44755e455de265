// SPDX-License-Identifier: MPL-2.0
//! Iced subscriptions for the two pipelines.
//!
//! Each subscription is keyed by the player's session id, so loading a new
//! source drops the old pipelines and starts fresh ones. Messages carry the
//! session id they belong to.

use super::audio::{AudioPipeline, DecodedAudio};
use super::decoder::{AsyncDecoder, DecoderCommand};
use super::grabber::FrameGrabber;
use crate::player::{CaptureOutcome, CaptureRequest, MediaEvent};
use iced::futures::SinkExt;
use iced::stream;
use tokio::sync::mpsc;

/// Subscription ID for the playback pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackId(u64);

/// Subscription ID for the preview pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureId(u64);

#[derive(Debug, Clone)]
pub enum PlaybackMessage {
    /// The decoder is running and accepts commands.
    Started {
        session: u64,
        sender: mpsc::UnboundedSender<DecoderCommand>,
    },
    Event { session: u64, event: MediaEvent },
}

#[derive(Debug, Clone)]
pub enum CaptureMessage {
    /// The grabber is running and accepts capture requests.
    Started {
        session: u64,
        sender: mpsc::UnboundedSender<CaptureRequest>,
    },
    Finished(CaptureOutcome),
}

/// Runs the playback pipeline for `source`.
///
/// Commands from the player go through this task, which hands them to the
/// video decoder and, when a device is available, to the audio track.
pub fn playback(source: String, session: u64) -> iced::Subscription<PlaybackMessage> {
    iced::Subscription::run_with_id(
        PlaybackId(session),
        stream::channel(100, move |mut output| async move {
            run_playback(source, session, &mut output).await;
            tracing::debug!(session, "playback pipeline finished");

            // Keep subscription alive but idle
            std::future::pending::<()>().await;
        }),
    )
}

async fn run_playback(
    source: String,
    session: u64,
    output: &mut iced::futures::channel::mpsc::Sender<PlaybackMessage>,
) {
    let mut video = AsyncDecoder::new(source.clone());
    let mut audio = AudioPipeline::start(source).await;
    let (command_tx, mut command_rx) = mpsc::unbounded_channel();

    let started = PlaybackMessage::Started {
        session,
        sender: command_tx,
    };
    if output.send(started).await.is_err() {
        return;
    }

    let video_commands = video.command_sender();
    loop {
        tokio::select! {
            command = command_rx.recv() => {
                let Some(command) = command else { break };
                if let Some(audio) = &audio {
                    audio.apply(&command);
                }
                if video_commands.send(command).is_err() {
                    break;
                }
            }
            event = video.recv_event() => {
                let Some(event) = event else { break };
                if output.send(PlaybackMessage::Event { session, event }).await.is_err() {
                    break;
                }
            }
            buffer = next_audio(&mut audio) => {
                if let Some(audio) = &audio {
                    audio.queue(&buffer);
                }
            }
        }
    }
}

async fn next_audio(audio: &mut Option<AudioPipeline>) -> DecodedAudio {
    match audio {
        Some(audio) => audio.next_buffer().await,
        None => std::future::pending().await,
    }
}

/// Runs the preview pipeline for `source`.
pub fn captures(source: String, session: u64) -> iced::Subscription<CaptureMessage> {
    iced::Subscription::run_with_id(
        CaptureId(session),
        stream::channel(100, move |mut output| async move {
            let mut grabber = FrameGrabber::new(source);
            let started = CaptureMessage::Started {
                session,
                sender: grabber.request_sender(),
            };
            if output.send(started).await.is_ok() {
                while let Some(outcome) = grabber.recv_outcome().await {
                    if output.send(CaptureMessage::Finished(outcome)).await.is_err() {
                        break;
                    }
                }
            }
            tracing::debug!(session, "preview pipeline finished");

            std::future::pending::<()>().await;
        }),
    )
}
