// SPDX-License-Identifier: MPL-2.0
//! Error types shared across the player, the media backend and configuration.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("I/O Error: {0}")]
    Io(String),

    #[error("Config Error: {0}")]
    Config(String),

    #[error("Media Error: {0}")]
    Media(#[from] MediaError),
}

/// Failures reported by the primary playback pipeline.
///
/// Each variant maps to a translated, user-facing message through
/// [`MediaError::i18n_key`]. The player never retries on its own: the only
/// ways out are a quality switch or a reload by the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// The source could not be reached (DNS, refused connection, HTTP error).
    #[error("Network error: {0}")]
    Network(String),

    /// Container format is not recognised.
    #[error("Unsupported media format")]
    UnsupportedFormat,

    /// Video codec is not supported by the system's FFmpeg.
    #[error("Unsupported video codec: {0}")]
    UnsupportedCodec(String),

    /// Resource appears corrupted or has invalid data.
    #[error("Media is corrupted")]
    Corrupted,

    /// Resource contains no video stream.
    #[error("No video stream found")]
    NoVideoStream,

    /// Decoding failed during playback.
    #[error("Decoding failed: {0}")]
    DecodingFailed(String),

    /// Generic error with raw message.
    #[error("{0}")]
    Other(String),
}

impl MediaError {
    /// Returns the i18n message key for this error type.
    #[must_use]
    pub fn i18n_key(&self) -> &'static str {
        match self {
            MediaError::Network(_) => "error-media-network",
            MediaError::UnsupportedFormat => "error-media-unsupported-format",
            MediaError::UnsupportedCodec(_) => "error-media-unsupported-codec",
            MediaError::Corrupted => "error-media-corrupted",
            MediaError::NoVideoStream => "error-media-no-video-stream",
            MediaError::DecodingFailed(_) => "error-media-decoding-failed",
            MediaError::Other(_) => "error-media-general",
        }
    }

    /// Categorizes a raw FFmpeg/decoder message.
    #[must_use]
    pub fn from_message(msg: &str) -> Self {
        let msg_lower = msg.to_lowercase();

        // Codec errors first, they can also contain "not found"
        if msg_lower.contains("codec") || msg_lower.contains("decoder") {
            if let Some(codec) = Self::extract_codec_name(&msg_lower) {
                return MediaError::UnsupportedCodec(codec);
            } else if msg_lower.contains("not found") || msg_lower.contains("unsupported") {
                return MediaError::DecodingFailed(msg.to_string());
            }
        }

        if msg_lower.contains("connection")
            || msg_lower.contains("network")
            || msg_lower.contains("timed out")
            || msg_lower.contains("server returned")
            || msg_lower.contains("name or service")
            || msg_lower.contains("no such file")
            || msg_lower.contains("permission denied")
            || msg_lower.contains("i/o error")
            || msg_lower.contains("input/output error")
        {
            return MediaError::Network(msg.to_string());
        }

        if msg_lower.contains("no video stream") || msg_lower.contains("no video track") {
            return MediaError::NoVideoStream;
        }

        if msg_lower.contains("invalid data found") || msg_lower.contains("unknown format") {
            return MediaError::UnsupportedFormat;
        }

        if msg_lower.contains("corrupt")
            || msg_lower.contains("invalid")
            || msg_lower.contains("malformed")
        {
            return MediaError::Corrupted;
        }

        if msg_lower.contains("packet")
            || msg_lower.contains("scaling")
            || msg_lower.contains("seek")
            || msg_lower.contains("decode")
        {
            return MediaError::DecodingFailed(msg.to_string());
        }

        MediaError::Other(msg.to_string())
    }

    fn extract_codec_name(msg: &str) -> Option<String> {
        let codecs = [
            "h264", "hevc", "h265", "vp8", "vp9", "av1", "mpeg4", "mpeg2",
        ];
        codecs
            .iter()
            .find(|codec| msg.contains(*codec))
            .map(|codec| codec.to_uppercase())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_io_error() {
        let err = Error::Io("disk failure".to_string());
        assert_eq!(format!("{}", err), "I/O Error: disk failure");
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_error = std::io::Error::other("boom");
        let err: Error = io_error.into();
        match err {
            Error::Io(message) => assert!(message.contains("boom")),
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn media_error_converts_into_error() {
        let err: Error = MediaError::NoVideoStream.into();
        assert!(matches!(err, Error::Media(MediaError::NoVideoStream)));
        assert_eq!(err.to_string(), "Media Error: No video stream found");
    }

    #[test]
    fn from_message_detects_codec() {
        let err = MediaError::from_message("Decoder hevc not found");
        assert_eq!(err, MediaError::UnsupportedCodec("HEVC".to_string()));
    }

    #[test]
    fn from_message_detects_network_failures() {
        let err = MediaError::from_message("Connection refused");
        assert!(matches!(err, MediaError::Network(_)));

        let err = MediaError::from_message("Server returned 404 Not Found");
        assert!(matches!(err, MediaError::Network(_)));

        let err = MediaError::from_message("Input/output error");
        assert!(matches!(err, MediaError::Network(_)));
    }

    #[test]
    fn from_message_detects_format_and_corruption() {
        assert_eq!(
            MediaError::from_message("Invalid data found when processing input"),
            MediaError::UnsupportedFormat
        );
        assert_eq!(
            MediaError::from_message("moov atom is corrupt"),
            MediaError::Corrupted
        );
    }

    #[test]
    fn from_message_falls_back_to_other() {
        let err = MediaError::from_message("something odd");
        assert_eq!(err, MediaError::Other("something odd".to_string()));
    }

    #[test]
    fn every_variant_has_a_distinct_key() {
        let keys = [
            MediaError::Network(String::new()).i18n_key(),
            MediaError::UnsupportedFormat.i18n_key(),
            MediaError::UnsupportedCodec(String::new()).i18n_key(),
            MediaError::Corrupted.i18n_key(),
            MediaError::NoVideoStream.i18n_key(),
            MediaError::DecodingFailed(String::new()).i18n_key(),
            MediaError::Other(String::new()).i18n_key(),
        ];
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }
}
