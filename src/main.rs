// SPDX-License-Identifier: MPL-2.0
use iced_reel::app::{self, Flags};
use iced_reel::logging;
use std::path::PathBuf;
use std::process::ExitCode;

const HELP: &str = "\
iced_reel - streaming video player

USAGE:
  iced_reel [SOURCE] [OPTIONS]

ARGS:
  SOURCE                Media URL or file path

OPTIONS:
  --config FILE         Player configuration (TOML)
  --lang LOCALE         Interface language (e.g. en-US, fr)
  --start SECS          Start position in seconds
  --autoplay            Try to start playback on load
  --no-preview          Disable scrub preview thumbnails
  --log-level LEVEL     trace, debug, info, warn or error (RUST_LOG wins)
  -h, --help            Print this help
";

struct Args {
    flags: Flags,
    log_level: Option<String>,
}

fn parse_args() -> Result<Option<Args>, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();

    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let config_path: Option<PathBuf> = args.opt_value_from_os_str("--config", |s| {
        Ok::<_, std::convert::Infallible>(PathBuf::from(s))
    })?;
    let lang: Option<String> = args.opt_value_from_str("--lang")?;
    let start_position: Option<f64> = args.opt_value_from_str("--start")?;
    let log_level: Option<String> = args.opt_value_from_str("--log-level")?;
    let autoplay = args.contains("--autoplay");
    let no_preview = args.contains("--no-preview");
    let source = args
        .finish()
        .into_iter()
        .next()
        .and_then(|s| s.into_string().ok());

    Ok(Some(Args {
        flags: Flags {
            source,
            config_path,
            lang,
            start_position,
            autoplay,
            no_preview,
        },
        log_level,
    }))
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            print!("{HELP}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("error: {err}\n\n{HELP}");
            return ExitCode::from(2);
        }
    };

    let level = args
        .log_level
        .as_deref()
        .unwrap_or(logging::DEFAULT_LEVEL);
    if let Err(err) = logging::init(level) {
        eprintln!("error: {err}");
        return ExitCode::from(2);
    }

    match app::run(args.flags) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "application exited with an error");
            ExitCode::FAILURE
        }
    }
}
