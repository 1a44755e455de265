// SPDX-License-Identifier: MPL-2.0
//! Audio track of the primary pipeline.
//!
//! A second demuxer decodes the best audio stream, resamples it to the output
//! device's format and paces it against the wall clock like the video. The
//! playback subscription feeds the samples to [`AudioOutput`] and routes
//! transport, volume and mute commands to both halves.

use super::audio_output::{AudioOutput, AudioOutputConfig};
use super::decoder::{DecoderCommand, Pacing};
use crate::config::{AUDIO_LOOKAHEAD, DECODER_IDLE_SLEEP};
use crate::error::MediaError;
use crate::player::time_units::secs_to_av_timestamp;
use crate::player::Volume;
use tokio::sync::mpsc;

/// Interleaved `f32` samples in the output device's format.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
}

/// Audio decoder running in a blocking task.
///
/// A source without an audio stream closes the event channel right away.
#[derive(Debug)]
pub struct AudioDecoder {
    command_tx: mpsc::UnboundedSender<DecoderCommand>,
    event_rx: mpsc::Receiver<DecodedAudio>,
}

impl AudioDecoder {
    pub fn new(source: String, output: AudioOutputConfig) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(4);

        tokio::task::spawn_blocking(move || {
            if let Err(err) = decoder_loop_blocking(&source, output, command_rx, event_tx) {
                tracing::warn!(%source, %err, "audio decoder stopped");
            }
        });

        Self {
            command_tx,
            event_rx,
        }
    }

    pub fn send(&self, command: DecoderCommand) {
        if self.command_tx.send(command).is_err() {
            tracing::trace!("audio decoder not running");
        }
    }

    pub async fn recv(&mut self) -> Option<DecodedAudio> {
        self.event_rx.recv().await
    }
}

fn decoder_loop_blocking(
    source: &str,
    output: AudioOutputConfig,
    mut command_rx: mpsc::UnboundedReceiver<DecoderCommand>,
    event_tx: mpsc::Sender<DecodedAudio>,
) -> Result<(), MediaError> {
    super::init_ffmpeg()?;
    let mut ictx = ffmpeg_next::format::input(&source)
        .map_err(|err| MediaError::from_message(&err.to_string()))?;

    let Some(stream) = ictx.streams().best(ffmpeg_next::media::Type::Audio) else {
        tracing::debug!(%source, "no audio stream");
        return Ok(());
    };
    let stream_index = stream.index();
    let time_base = {
        let tb = stream.time_base();
        f64::from(tb.numerator()) / f64::from(tb.denominator())
    };
    let mut decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
        .and_then(|context| context.decoder().audio())
        .map_err(|err| MediaError::DecodingFailed(format!("audio: {err}")))?;

    let output_layout = match output.channels {
        1 => ffmpeg_next::ChannelLayout::MONO,
        _ => ffmpeg_next::ChannelLayout::STEREO,
    };
    let output_channels: u16 = if output.channels == 1 { 1 } else { 2 };
    let mut resampler = ffmpeg_next::software::resampling::Context::get(
        decoder.format(),
        decoder.channel_layout(),
        decoder.rate(),
        ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Packed),
        output_layout,
        output.sample_rate,
    )
    .map_err(|err| MediaError::DecodingFailed(format!("audio resampler: {err}")))?;

    let mut pacing = Pacing::with_lead(AUDIO_LOOKAHEAD);
    let mut is_playing = false;
    let mut skip_until: Option<f64> = None;

    loop {
        match command_rx.try_recv() {
            Ok(DecoderCommand::Play) => {
                is_playing = true;
                pacing.restart();
            }
            Ok(DecoderCommand::Pause) => is_playing = false,
            Ok(DecoderCommand::Seek { target_secs }) => {
                let timestamp = secs_to_av_timestamp(target_secs);
                match ictx.seek(timestamp, ..timestamp) {
                    Ok(()) => {
                        decoder.flush();
                        skip_until = Some(target_secs);
                        pacing.restart();
                    }
                    Err(err) => tracing::debug!(target_secs, %err, "audio seek failed"),
                }
            }
            Ok(DecoderCommand::SetRate(rate)) => {
                pacing.rate = rate;
                pacing.restart();
            }
            Ok(DecoderCommand::SetVolume(_) | DecoderCommand::SetMuted(_)) => {}
            Ok(DecoderCommand::Stop) | Err(mpsc::error::TryRecvError::Disconnected) => break,
            Err(mpsc::error::TryRecvError::Empty) => {}
        }

        if !is_playing {
            std::thread::sleep(DECODER_IDLE_SLEEP);
            continue;
        }

        let mut decoded = None;
        for (packet_stream, packet) in ictx.packets() {
            if packet_stream.index() != stream_index {
                continue;
            }
            if let Err(err) = decoder.send_packet(&packet) {
                tracing::trace!(%err, "audio packet rejected");
                continue;
            }
            let mut frame = ffmpeg_next::frame::Audio::empty();
            if decoder.receive_frame(&mut frame).is_ok() {
                decoded = Some(frame);
                break;
            }
        }

        let Some(frame) = decoded else {
            // The video side reports the end; audio just goes quiet.
            is_playing = false;
            continue;
        };

        #[allow(clippy::cast_precision_loss)]
        let pts_secs = frame.timestamp().map_or(0.0, |pts| pts as f64 * time_base);
        if skip_until.is_some_and(|target| pts_secs < target) {
            continue;
        }
        skip_until = None;

        let mut resampled = ffmpeg_next::frame::Audio::empty();
        if let Err(err) = resampler.run(&frame, &mut resampled) {
            tracing::trace!(%err, "audio resampling failed");
            continue;
        }

        pacing.wait_for(pts_secs);
        let audio = DecodedAudio {
            samples: interleaved_samples(resampled.data(0), resampled.samples(), output_channels),
        };
        if event_tx.blocking_send(audio).is_err() {
            break;
        }
    }

    Ok(())
}

/// Reads packed little-endian `f32` samples out of a resampled plane.
fn interleaved_samples(data: &[u8], frames: usize, channels: u16) -> Vec<f32> {
    let count = frames * usize::from(channels);
    data.chunks_exact(4)
        .take(count)
        .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        .collect()
}

/// Audio decoder plus the device it plays on.
#[derive(Debug)]
pub struct AudioPipeline {
    decoder: AudioDecoder,
    output: AudioOutput,
}

impl AudioPipeline {
    /// Opens the output device and starts decoding `source`. The device
    /// starts paused; the player's volume and mute arrive as commands.
    ///
    /// Returns `None` when no device is available; playback goes on silent.
    pub async fn start(source: String) -> Option<Self> {
        match AudioOutput::open(Volume::default(), false).await {
            Ok(output) => Some(Self {
                decoder: AudioDecoder::new(source, output.config()),
                output,
            }),
            Err(err) => {
                tracing::warn!(%err, "audio output unavailable, playing without sound");
                None
            }
        }
    }

    /// Applies a player command to the device and the decoder.
    pub fn apply(&self, command: &DecoderCommand) {
        match command {
            DecoderCommand::Play => self.output.resume(),
            DecoderCommand::Pause => self.output.pause(),
            DecoderCommand::Seek { .. } | DecoderCommand::Stop => self.output.clear(),
            DecoderCommand::SetRate(_) => {}
            DecoderCommand::SetVolume(volume) => self.output.set_volume(*volume),
            DecoderCommand::SetMuted(muted) => self.output.set_muted(*muted),
        }
        if forwards_to_decoder(command) {
            self.decoder.send(command.clone());
        }
    }

    /// Next decoded buffer. Pending forever once the track is exhausted.
    pub async fn next_buffer(&mut self) -> DecodedAudio {
        match self.decoder.recv().await {
            Some(audio) => audio,
            None => std::future::pending().await,
        }
    }

    pub fn queue(&self, audio: &DecodedAudio) {
        self.output.queue(&audio.samples);
    }
}

/// Volume and mute live in the output device only.
fn forwards_to_decoder(command: &DecoderCommand) -> bool {
    !matches!(
        command,
        DecoderCommand::SetVolume(_) | DecoderCommand::SetMuted(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_read_as_little_endian_floats() {
        let mut data = Vec::new();
        for value in [0.5_f32, -0.25, 1.0, 0.0] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        // Trailing plane padding is ignored.
        data.extend_from_slice(&[0xff; 8]);

        assert_eq!(interleaved_samples(&data, 2, 2), vec![0.5, -0.25, 1.0, 0.0]);
        assert_eq!(interleaved_samples(&data, 1, 1), vec![0.5]);
    }

    #[test]
    fn volume_and_mute_stay_with_the_device() {
        assert!(!forwards_to_decoder(&DecoderCommand::SetVolume(Volume::new(30))));
        assert!(!forwards_to_decoder(&DecoderCommand::SetMuted(true)));
        assert!(forwards_to_decoder(&DecoderCommand::Seek { target_secs: 4.0 }));
        assert!(forwards_to_decoder(&DecoderCommand::SetRate(1.5)));
        assert!(forwards_to_decoder(&DecoderCommand::Play));
    }

    #[tokio::test]
    async fn missing_source_closes_the_track() {
        let output = AudioOutputConfig {
            sample_rate: 48_000,
            channels: 2,
        };
        let mut decoder = AudioDecoder::new("/nonexistent/clip.mp4".to_string(), output);
        let event = tokio::time::timeout(std::time::Duration::from_secs(5), decoder.recv())
            .await
            .expect("decoder answers");
        assert!(event.is_none());
    }
}
