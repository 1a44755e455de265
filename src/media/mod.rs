// SPDX-License-Identifier: MPL-2.0
//! FFmpeg backend for the player.
//!
//! Two independent pipelines open the same source:
//! - [`decoder`] plays it and reports [`MediaEvent`](crate::player::MediaEvent)s,
//!   with [`audio`] decoding the sound track to an [`audio_output`] device
//! - [`grabber`] seeks on demand and encodes small JPEG previews
//!
//! Both run on blocking threads (FFmpeg types are not `Send`) and talk to the
//! UI through Tokio channels wrapped in Iced subscriptions ([`subscription`]).
//! [`handle`] holds the UI side of those channels and implements the player's
//! pipeline traits.

pub mod audio;
pub mod audio_output;
pub mod decoder;
pub mod grabber;
pub mod handle;
pub mod subscription;

pub use handle::{DecoderHandle, GrabberHandle};
pub use subscription::{captures, playback, CaptureMessage, PlaybackMessage};

use crate::error::MediaError;
use std::sync::Once;

/// Static flag to ensure FFmpeg is initialized only once.
static FFMPEG_INIT: Once = Once::new();

/// Initializes FFmpeg, including network protocols for remote sources.
///
/// Safe to call repeatedly; only the first call does any work.
pub fn init_ffmpeg() -> Result<(), MediaError> {
    let mut init_result = Ok(());

    FFMPEG_INIT.call_once(|| {
        if let Err(err) = ffmpeg_next::init() {
            init_result = Err(MediaError::Other(format!(
                "FFmpeg initialization failed: {err}"
            )));
            return;
        }
        ffmpeg_next::format::network::init();

        // SAFETY: av_log_set_level is thread-safe and only affects logging
        unsafe {
            ffmpeg_next::ffi::av_log_set_level(ffmpeg_next::ffi::AV_LOG_ERROR);
        }
    });

    init_result
}

/// An opened source with its best video stream and decoder.
pub(crate) struct VideoInput {
    pub ictx: ffmpeg_next::format::context::Input,
    pub stream_index: usize,
    pub decoder: ffmpeg_next::decoder::Video,
    /// Seconds per stream timestamp unit.
    pub time_base: f64,
    pub duration_secs: f64,
}

impl VideoInput {
    /// Opens `source` (a local path or a URL FFmpeg understands).
    pub fn open(source: &str) -> Result<Self, MediaError> {
        init_ffmpeg()?;

        let ictx = ffmpeg_next::format::input(&source)
            .map_err(|err| MediaError::from_message(&err.to_string()))?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or(MediaError::NoVideoStream)?;
        let stream_index = stream.index();

        let context = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|err| MediaError::DecodingFailed(err.to_string()))?;
        let codec_name = context.id().name().to_string();
        let decoder = context
            .decoder()
            .video()
            .map_err(|_| MediaError::UnsupportedCodec(codec_name))?;

        if decoder.width() == 0 || decoder.height() == 0 {
            return Err(MediaError::UnsupportedFormat);
        }

        let time_base = {
            let tb = stream.time_base();
            f64::from(tb.numerator()) / f64::from(tb.denominator())
        };

        #[allow(clippy::cast_precision_loss)]
        let duration_secs = if stream.duration() > 0 {
            stream.duration() as f64 * time_base
        } else if ictx.duration() > 0 {
            ictx.duration() as f64 / f64::from(ffmpeg_next::ffi::AV_TIME_BASE)
        } else {
            0.0
        };

        Ok(Self {
            ictx,
            stream_index,
            decoder,
            time_base,
            duration_secs,
        })
    }
}

/// Copies the first plane of a packed frame, dropping row padding.
pub(crate) fn packed_plane(frame: &ffmpeg_next::frame::Video, bytes_per_pixel: usize) -> Vec<u8> {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let stride = frame.stride(0);
    let data = frame.data(0);
    let row_len = width * bytes_per_pixel;

    let mut bytes = Vec::with_capacity(row_len * height);
    for row in data.chunks(stride).take(height) {
        bytes.extend_from_slice(&row[..row_len.min(row.len())]);
    }
    bytes
}
