//! FFmpeg initialisation and log verbosity.
//!
//! FFmpeg writes its own diagnostics to stderr independently of the Rust
//! [`log`] facade. A batch over many files would otherwise interleave
//! decoder warnings with the progress output, so the binary lowers FFmpeg's
//! level to [`FfmpegLogLevel::Error`] unless asked otherwise.

use std::{fmt, str::FromStr, sync::OnceLock};

use ffmpeg_next::util::log::Level;
use log::LevelFilter;

use crate::error::ExtractError;

/// FFmpeg's internal log verbosity, most quiet first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FfmpegLogLevel {
    /// Print nothing.
    Quiet,
    /// Only unrecoverable errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging output.
    Debug,
    /// Everything.
    Trace,
}

impl FfmpegLogLevel {
    /// Pick the FFmpeg level matching a Rust log filter.
    pub fn from_log_filter(filter: LevelFilter) -> Self {
        match filter {
            LevelFilter::Off => FfmpegLogLevel::Quiet,
            LevelFilter::Error => FfmpegLogLevel::Error,
            LevelFilter::Warn => FfmpegLogLevel::Warning,
            LevelFilter::Info => FfmpegLogLevel::Info,
            LevelFilter::Debug => FfmpegLogLevel::Debug,
            LevelFilter::Trace => FfmpegLogLevel::Trace,
        }
    }

    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = ExtractError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "quiet" | "off" => Ok(FfmpegLogLevel::Quiet),
            "fatal" | "panic" => Ok(FfmpegLogLevel::Fatal),
            "error" => Ok(FfmpegLogLevel::Error),
            "warning" | "warn" => Ok(FfmpegLogLevel::Warning),
            "info" => Ok(FfmpegLogLevel::Info),
            "verbose" => Ok(FfmpegLogLevel::Verbose),
            "debug" => Ok(FfmpegLogLevel::Debug),
            "trace" => Ok(FfmpegLogLevel::Trace),
            other => Err(ExtractError::InvalidConfiguration(format!(
                "unknown FFmpeg log level: {other}"
            ))),
        }
    }
}

impl fmt::Display for FfmpegLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FfmpegLogLevel::Quiet => "quiet",
            FfmpegLogLevel::Fatal => "fatal",
            FfmpegLogLevel::Error => "error",
            FfmpegLogLevel::Warning => "warning",
            FfmpegLogLevel::Info => "info",
            FfmpegLogLevel::Verbose => "verbose",
            FfmpegLogLevel::Debug => "debug",
            FfmpegLogLevel::Trace => "trace",
        };
        f.write_str(name)
    }
}

/// Set FFmpeg's own log level. Does not affect the Rust `log` output.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}

static INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Initialise FFmpeg once per process. A failed first attempt is reported
/// on every later call too.
pub(crate) fn initialize() -> Result<(), ExtractError> {
    INIT.get_or_init(|| ffmpeg_next::init().map_err(|error| error.to_string()))
        .clone()
        .map_err(ExtractError::FfmpegError)
}
