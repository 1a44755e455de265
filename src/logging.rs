// SPDX-License-Identifier: MPL-2.0
//! Structured logging setup.
//!
//! Logs go to stderr through `tracing-subscriber`. The `RUST_LOG` environment
//! variable takes precedence over the level given on the command line, so
//! `RUST_LOG=iced_reel::media=trace` works without touching the CLI.

use tracing_subscriber::EnvFilter;

/// Level used when neither `RUST_LOG` nor `--log-level` is set.
pub const DEFAULT_LEVEL: &str = "info";

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("invalid log level: {0}")]
    InvalidLevel(String),

    #[error("failed to set global subscriber: {0}")]
    SetSubscriber(String),
}

/// Parses a level name, case-insensitively.
pub fn parse_level(level: &str) -> Result<&'static str, LogError> {
    let lowered = level.trim().to_ascii_lowercase();
    LEVELS
        .iter()
        .copied()
        .find(|candidate| *candidate == lowered)
        .ok_or_else(|| LogError::InvalidLevel(level.to_string()))
}

/// Builds the filter: `RUST_LOG` when set and valid, `level` otherwise.
pub fn build_filter(level: &str) -> Result<EnvFilter, LogError> {
    let level = parse_level(level)?;
    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
}

/// Installs the global subscriber. Call once, before the UI starts.
pub fn init(level: &str) -> Result<(), LogError> {
    let filter = build_filter(level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| LogError::SetSubscriber(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_accepts_known_names() {
        assert_eq!(parse_level("info").unwrap(), "info");
        assert_eq!(parse_level("WARN").unwrap(), "warn");
        assert_eq!(parse_level(" trace ").unwrap(), "trace");
    }

    #[test]
    fn parse_level_rejects_unknown_names() {
        let err = parse_level("verbose").unwrap_err();
        assert!(matches!(err, LogError::InvalidLevel(ref name) if name == "verbose"));
        assert!(err.to_string().contains("verbose"));
    }

    #[test]
    fn build_filter_rejects_invalid_level() {
        assert!(build_filter("loud").is_err());
    }

    #[test]
    fn default_level_is_valid() {
        assert!(parse_level(DEFAULT_LEVEL).is_ok());
    }
}
