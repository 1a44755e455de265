// SPDX-License-Identifier: MPL-2.0
//! Primary playback pipeline.
//!
//! Decodes the source on a blocking thread, paces frames against the wall
//! clock scaled by the playback rate, and reports the native media events the
//! player controller consumes.

use super::{packed_plane, VideoInput};
use crate::config::{DECODER_IDLE_SLEEP, MAX_CONSECUTIVE_DECODE_ERRORS, TIME_UPDATE_INTERVAL};
use crate::error::MediaError;
use crate::player::time_units::secs_to_av_timestamp;
use crate::player::{MediaEvent, VideoFrame, Volume};
use iced::widget::image;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Commands sent to the decoder task.
#[derive(Debug, Clone, PartialEq)]
pub enum DecoderCommand {
    Play,
    Pause,
    /// Seek; a paused decoder shows the frame at the target.
    Seek { target_secs: f64 },
    SetRate(f64),
    SetVolume(Volume),
    SetMuted(bool),
    Stop,
}

/// Async video decoder that runs in a blocking task.
pub struct AsyncDecoder {
    command_tx: mpsc::UnboundedSender<DecoderCommand>,
    /// Bounded so a slow UI applies backpressure to decoding.
    event_rx: mpsc::Receiver<MediaEvent>,
}

impl AsyncDecoder {
    /// Spawns the decoder for `source`. Open failures arrive as
    /// [`MediaEvent::Failed`].
    pub fn new(source: String) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(2);

        tokio::task::spawn_blocking(move || {
            let failure_tx = event_tx.clone();
            if let Err(err) = Self::decoder_loop_blocking(&source, command_rx, event_tx) {
                tracing::warn!(%source, %err, "decoder stopped");
                let _ = failure_tx.blocking_send(MediaEvent::Failed(err));
            }
        });

        Self {
            command_tx,
            event_rx,
        }
    }

    pub fn command_sender(&self) -> mpsc::UnboundedSender<DecoderCommand> {
        self.command_tx.clone()
    }

    /// Receives the next event. `None` once the decoder has stopped.
    pub async fn recv_event(&mut self) -> Option<MediaEvent> {
        self.event_rx.recv().await
    }

    fn decoder_loop_blocking(
        source: &str,
        mut command_rx: mpsc::UnboundedReceiver<DecoderCommand>,
        event_tx: mpsc::Sender<MediaEvent>,
    ) -> Result<(), MediaError> {
        let mut input = VideoInput::open(source)?;
        let width = input.decoder.width();
        let height = input.decoder.height();

        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            input.decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGBA,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(|err| MediaError::DecodingFailed(format!("scaling: {err}")))?;

        tracing::debug!(%source, width, height, duration = input.duration_secs, "decoder opened");
        if event_tx
            .blocking_send(MediaEvent::LoadedMetadata {
                duration_secs: input.duration_secs,
            })
            .is_err()
        {
            return Ok(());
        }

        let mut pacing = Pacing::default();
        let mut reader = FrameReader::default();
        let mut is_playing = false;
        // Show the first frame as a poster before playback starts.
        let mut decode_single_frame = true;
        let mut last_time_update: Option<Instant> = None;

        loop {
            match command_rx.try_recv() {
                Ok(DecoderCommand::Play) => {
                    is_playing = true;
                    pacing.restart();
                }
                Ok(DecoderCommand::Pause) => {
                    is_playing = false;
                }
                Ok(DecoderCommand::Seek { target_secs }) => {
                    let timestamp = secs_to_av_timestamp(target_secs);
                    match input.ictx.seek(timestamp, ..timestamp) {
                        Ok(()) => {
                            input.decoder.flush();
                            reader.seeked(target_secs);
                            pacing.restart();
                            last_time_update = None;
                            if !is_playing {
                                decode_single_frame = true;
                            }
                        }
                        Err(err) => tracing::debug!(target_secs, %err, "seek failed"),
                    }
                }
                Ok(DecoderCommand::SetRate(rate)) => {
                    pacing.rate = rate;
                    pacing.restart();
                }
                // Audio only.
                Ok(DecoderCommand::SetVolume(_) | DecoderCommand::SetMuted(_)) => {}
                Ok(DecoderCommand::Stop) | Err(mpsc::error::TryRecvError::Disconnected) => break,
                Err(mpsc::error::TryRecvError::Empty) => {}
            }

            if !is_playing && !decode_single_frame {
                std::thread::sleep(DECODER_IDLE_SLEEP);
                continue;
            }

            let Some(frame) = reader.next_frame(&mut input, &mut scaler)? else {
                tracing::debug!("end of stream");
                is_playing = false;
                decode_single_frame = false;
                if event_tx.blocking_send(MediaEvent::Ended).is_err() {
                    break;
                }
                continue;
            };

            if is_playing {
                pacing.wait_for(frame.pts_secs);
            }

            let pts_secs = frame.pts_secs;
            let report_time = decode_single_frame
                || last_time_update.is_none_or(|last| last.elapsed() >= TIME_UPDATE_INTERVAL);
            decode_single_frame = false;

            if event_tx.blocking_send(MediaEvent::FrameReady(frame)).is_err() {
                break;
            }
            if report_time {
                last_time_update = Some(Instant::now());
                let sent = event_tx
                    .blocking_send(MediaEvent::TimeUpdate {
                        position_secs: pts_secs,
                    })
                    .and_then(|()| {
                        event_tx.blocking_send(MediaEvent::Progress {
                            buffered_secs: reader.buffered_secs,
                        })
                    });
                if sent.is_err() {
                    break;
                }
            }
        }

        Ok(())
    }
}

/// What a failed demuxer read means for playback.
#[derive(Debug, PartialEq)]
enum ReadFailure {
    EndOfStream,
    /// Nothing available yet; read again.
    Retry,
    Fatal(MediaError),
}

fn classify_read_error(err: &ffmpeg_next::Error) -> ReadFailure {
    match err {
        ffmpeg_next::Error::Eof => ReadFailure::EndOfStream,
        ffmpeg_next::Error::Other { errno } if *errno == ffmpeg_next::error::EAGAIN => {
            ReadFailure::Retry
        }
        other => ReadFailure::Fatal(MediaError::from_message(&other.to_string())),
    }
}

/// Counts consecutive packet and conversion failures.
#[derive(Debug, Default)]
struct DecodeErrors {
    consecutive: u32,
}

impl DecodeErrors {
    /// Records a failure. Fails once too many happened in a row.
    fn record(&mut self, err: &ffmpeg_next::Error) -> Result<(), MediaError> {
        self.consecutive += 1;
        tracing::debug!(%err, consecutive = self.consecutive, "decode error");
        if self.consecutive >= MAX_CONSECUTIVE_DECODE_ERRORS {
            let message = err.to_string();
            return Err(match MediaError::from_message(&message) {
                MediaError::UnsupportedFormat | MediaError::Other(_) => {
                    MediaError::DecodingFailed(message)
                }
                categorized => categorized,
            });
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.consecutive = 0;
    }
}

/// Pulls packets from the demuxer until the decoder yields a displayable frame.
#[derive(Debug, Default)]
struct FrameReader {
    /// The decoder was told the input ended and is giving back what it holds.
    draining: bool,
    /// Frames before a seek target are decoded but not shown.
    skip_until: Option<f64>,
    buffered_secs: f64,
    errors: DecodeErrors,
}

impl FrameReader {
    fn seeked(&mut self, target_secs: f64) {
        self.draining = false;
        self.skip_until = Some(target_secs);
    }

    /// Next frame in presentation order, `None` once the stream is exhausted
    /// and the decoder drained.
    fn next_frame(
        &mut self,
        input: &mut VideoInput,
        scaler: &mut ffmpeg_next::software::scaling::Context,
    ) -> Result<Option<VideoFrame>, MediaError> {
        let time_base = input.time_base;
        #[allow(clippy::cast_precision_loss)]
        let to_secs = |timestamp: i64| timestamp as f64 * time_base;

        loop {
            let mut decoded = ffmpeg_next::frame::Video::empty();
            if input.decoder.receive_frame(&mut decoded).is_ok() {
                let pts_secs = decoded.timestamp().map_or(0.0, to_secs);
                if self.skip_until.is_some_and(|target| pts_secs < target) {
                    continue;
                }
                self.skip_until = None;

                let mut rgba = ffmpeg_next::frame::Video::empty();
                if let Err(err) = scaler.run(&decoded, &mut rgba) {
                    self.errors.record(&err)?;
                    continue;
                }
                self.errors.clear();

                let (width, height) = (rgba.width(), rgba.height());
                return Ok(Some(VideoFrame {
                    handle: image::Handle::from_rgba(width, height, packed_plane(&rgba, 4)),
                    width,
                    height,
                    pts_secs,
                }));
            }

            if self.draining {
                return Ok(None);
            }

            let mut packet = ffmpeg_next::Packet::empty();
            match packet.read(&mut input.ictx) {
                Ok(()) => {
                    if packet.stream() != input.stream_index {
                        continue;
                    }
                    if let Some(pts) = packet.pts() {
                        self.buffered_secs = self.buffered_secs.max(to_secs(pts));
                    }
                    if let Err(err) = input.decoder.send_packet(&packet) {
                        self.errors.record(&err)?;
                    }
                }
                Err(err) => match classify_read_error(&err) {
                    ReadFailure::EndOfStream => {
                        if let Err(err) = input.decoder.send_eof() {
                            tracing::debug!(%err, "decoder refused end of stream");
                        }
                        self.draining = true;
                    }
                    ReadFailure::Retry => std::thread::sleep(DECODER_IDLE_SLEEP),
                    ReadFailure::Fatal(media_error) => {
                        tracing::warn!(%err, "reading the source failed");
                        return Err(media_error);
                    }
                },
            }
        }
    }
}

/// Maps presentation timestamps to wall-clock deadlines.
#[derive(Debug)]
pub(super) struct Pacing {
    pub(super) rate: f64,
    /// Deadlines are moved this far forward, for consumers that queue ahead.
    lead: Duration,
    /// Wall clock and timestamp of the first frame since the last restart.
    anchor: Option<(Instant, f64)>,
}

impl Default for Pacing {
    fn default() -> Self {
        Self::with_lead(Duration::ZERO)
    }
}

impl Pacing {
    pub(super) fn with_lead(lead: Duration) -> Self {
        Self {
            rate: 1.0,
            lead,
            anchor: None,
        }
    }

    pub(super) fn restart(&mut self) {
        self.anchor = None;
    }

    /// Wall-clock instant at which `pts_secs` is due.
    fn deadline(&mut self, pts_secs: f64, now: Instant) -> Instant {
        let (start, first_pts) = *self.anchor.get_or_insert((now, pts_secs));
        let offset = Duration::from_secs_f64(((pts_secs - first_pts) / self.rate).max(0.0));
        start + offset.saturating_sub(self.lead)
    }

    pub(super) fn wait_for(&mut self, pts_secs: f64) {
        let now = Instant::now();
        let deadline = self.deadline(pts_secs, now);
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::later;

    #[test]
    fn first_frame_anchors_pacing() {
        let now = Instant::now();
        let mut pacing = Pacing::default();
        assert_eq!(pacing.deadline(12.0, now), now);
        assert_eq!(pacing.deadline(12.5, later(now, 10)), later(now, 500));
    }

    #[test]
    fn rate_scales_frame_delays() {
        let now = Instant::now();
        let mut pacing = Pacing::default();
        pacing.rate = 2.0;
        pacing.deadline(0.0, now);
        assert_eq!(pacing.deadline(1.0, now), later(now, 500));
    }

    #[test]
    fn lead_moves_deadlines_forward() {
        let now = Instant::now();
        let mut pacing = Pacing::with_lead(Duration::from_millis(200));
        assert_eq!(pacing.deadline(5.0, now), now);
        assert_eq!(pacing.deadline(5.1, now), now);
        assert_eq!(pacing.deadline(6.0, now), later(now, 800));
    }

    #[test]
    fn end_of_input_is_not_a_failure() {
        assert_eq!(
            classify_read_error(&ffmpeg_next::Error::Eof),
            ReadFailure::EndOfStream
        );
        assert_eq!(
            classify_read_error(&ffmpeg_next::Error::Other {
                errno: ffmpeg_next::error::EAGAIN
            }),
            ReadFailure::Retry
        );
    }

    #[test]
    fn broken_reads_become_media_errors() {
        assert_eq!(
            classify_read_error(&ffmpeg_next::Error::InvalidData),
            ReadFailure::Fatal(MediaError::UnsupportedFormat)
        );
        assert!(matches!(
            classify_read_error(&ffmpeg_next::Error::Other {
                errno: ffmpeg_next::error::EIO
            }),
            ReadFailure::Fatal(MediaError::Network(_))
        ));
    }

    #[test]
    fn repeated_decode_errors_fail_playback() {
        let mut errors = DecodeErrors::default();
        for _ in 1..MAX_CONSECUTIVE_DECODE_ERRORS {
            assert!(errors.record(&ffmpeg_next::Error::InvalidData).is_ok());
        }
        let failure = errors.record(&ffmpeg_next::Error::InvalidData);
        assert!(matches!(failure, Err(MediaError::DecodingFailed(_))));
    }

    #[test]
    fn a_good_frame_resets_the_error_run() {
        let mut errors = DecodeErrors::default();
        for _ in 1..MAX_CONSECUTIVE_DECODE_ERRORS {
            assert!(errors.record(&ffmpeg_next::Error::InvalidData).is_ok());
        }
        errors.clear();
        assert!(errors.record(&ffmpeg_next::Error::InvalidData).is_ok());
    }

    #[test]
    fn restart_drops_anchor() {
        let now = Instant::now();
        let mut pacing = Pacing::default();
        pacing.deadline(3.0, now);
        pacing.restart();
        assert_eq!(pacing.deadline(40.0, later(now, 100)), later(now, 100));
    }

    #[tokio::test]
    async fn missing_source_reports_failure() {
        let mut decoder = AsyncDecoder::new("/nonexistent/clip.mp4".to_string());
        let event = tokio::time::timeout(Duration::from_secs(5), decoder.recv_event())
            .await
            .expect("decoder answers");
        assert!(matches!(event, Some(MediaEvent::Failed(_))));
    }

    #[tokio::test]
    async fn sample_video_reports_metadata_then_poster() {
        let path = "tests/data/sample.mp4";
        if !std::path::Path::new(path).exists() {
            eprintln!("Test video not found, skipping test");
            return;
        }

        let mut decoder = AsyncDecoder::new(path.to_string());
        let first = tokio::time::timeout(Duration::from_secs(5), decoder.recv_event())
            .await
            .expect("decoder answers");
        assert!(matches!(first, Some(MediaEvent::LoadedMetadata { .. })));

        let second = tokio::time::timeout(Duration::from_secs(5), decoder.recv_event())
            .await
            .expect("decoder answers");
        assert!(matches!(second, Some(MediaEvent::FrameReady(_))));

        let _ = decoder.command_sender().send(DecoderCommand::Stop);
    }
}
