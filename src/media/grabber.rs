// SPDX-License-Identifier: MPL-2.0
//! Secondary pipeline for scrub previews.
//!
//! Opens its own input so its seeks never disturb playback. Each request
//! seeks, decodes up to the target time, scales to a small fixed size and
//! encodes a low-quality JPEG.

use super::{packed_plane, VideoInput};
use crate::config::{
    CAPTURE_MAX_DECODED_FRAMES, THUMBNAIL_HEIGHT, THUMBNAIL_JPEG_QUALITY, THUMBNAIL_WIDTH,
};
use crate::player::time_units::secs_to_av_timestamp;
use crate::player::{CaptureError, CaptureOutcome, CaptureRequest, Thumbnail};
use image_rs::codecs::jpeg::JpegEncoder;
use image_rs::ExtendedColorType;
use tokio::sync::mpsc;

/// Frame grabber running in a blocking task.
pub struct FrameGrabber {
    request_tx: mpsc::UnboundedSender<CaptureRequest>,
    outcome_rx: mpsc::Receiver<CaptureOutcome>,
}

impl FrameGrabber {
    /// Spawns the grabber for `source`. If the source cannot be opened the
    /// task ends and every later request is refused as unavailable.
    pub fn new(source: String) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = mpsc::channel(2);

        tokio::task::spawn_blocking(move || match VideoInput::open(&source) {
            Ok(input) => Self::grabber_loop_blocking(input, request_rx, &outcome_tx),
            Err(err) => tracing::warn!(%source, %err, "preview pipeline unavailable"),
        });

        Self {
            request_tx,
            outcome_rx,
        }
    }

    pub fn request_sender(&self) -> mpsc::UnboundedSender<CaptureRequest> {
        self.request_tx.clone()
    }

    pub async fn recv_outcome(&mut self) -> Option<CaptureOutcome> {
        self.outcome_rx.recv().await
    }

    fn grabber_loop_blocking(
        mut input: VideoInput,
        mut request_rx: mpsc::UnboundedReceiver<CaptureRequest>,
        outcome_tx: &mpsc::Sender<CaptureOutcome>,
    ) {
        let mut scaler = match ffmpeg_next::software::scaling::Context::get(
            input.decoder.format(),
            input.decoder.width(),
            input.decoder.height(),
            ffmpeg_next::format::Pixel::RGB24,
            THUMBNAIL_WIDTH,
            THUMBNAIL_HEIGHT,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        ) {
            Ok(scaler) => scaler,
            Err(err) => {
                tracing::warn!(%err, "preview scaler unavailable");
                return;
            }
        };

        while let Some(request) = request_rx.blocking_recv() {
            let result = grab(&mut input, &mut scaler, request.target_secs)
                .and_then(|rgb| encode_jpeg(&rgb, THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT))
                .map(Thumbnail::from_encoded);
            let outcome = CaptureOutcome {
                id: request.id,
                requested_secs: request.target_secs,
                result,
            };
            if outcome_tx.blocking_send(outcome).is_err() {
                break;
            }
        }
    }
}

/// Seeks and decodes until the first frame at or after `target_secs`,
/// returning it as packed RGB at thumbnail size.
fn grab(
    input: &mut VideoInput,
    scaler: &mut ffmpeg_next::software::scaling::Context,
    target_secs: f64,
) -> Result<Vec<u8>, CaptureError> {
    let timestamp = secs_to_av_timestamp(target_secs);
    input
        .ictx
        .seek(timestamp, ..timestamp)
        .map_err(|err| CaptureError::Failed(format!("seek: {err}")))?;
    input.decoder.flush();

    let time_base = input.time_base;
    let mut decoded_frames = 0usize;
    let mut decoded = ffmpeg_next::frame::Video::empty();

    for (stream, packet) in input.ictx.packets() {
        if stream.index() != input.stream_index {
            continue;
        }
        if input.decoder.send_packet(&packet).is_err() {
            continue;
        }
        while input.decoder.receive_frame(&mut decoded).is_ok() {
            decoded_frames += 1;
            #[allow(clippy::cast_precision_loss)]
            let pts_secs = decoded
                .timestamp()
                .map_or(target_secs, |pts| pts as f64 * time_base);
            if pts_secs >= target_secs || decoded_frames >= CAPTURE_MAX_DECODED_FRAMES {
                let mut rgb = ffmpeg_next::frame::Video::empty();
                scaler
                    .run(&decoded, &mut rgb)
                    .map_err(|err| CaptureError::Failed(format!("scaling: {err}")))?;
                return Ok(packed_plane(&rgb, 3));
            }
        }
    }

    Err(CaptureError::Failed(format!(
        "no frame at {target_secs:.2}s"
    )))
}

/// Encodes packed RGB pixels as a JPEG thumbnail.
pub fn encode_jpeg(rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>, CaptureError> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, THUMBNAIL_JPEG_QUALITY)
        .encode(rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|err| CaptureError::Failed(format!("jpeg: {err}")))?;
    Ok(buffer)
}
