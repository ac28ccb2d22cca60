use ffmpeg_the_third::util::log::Level;
use serde::{Deserialize, Serialize};

/// FFmpeg's own log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Quiet,
    Panic,
    Fatal,
    #[default]
    Error,
    Warning,
    Info,
    Verbose,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Quiet => Level::Quiet,
            LogLevel::Panic => Level::Panic,
            LogLevel::Fatal => Level::Fatal,
            LogLevel::Error => Level::Error,
            LogLevel::Warning => Level::Warning,
            LogLevel::Info => Level::Info,
            LogLevel::Verbose => Level::Verbose,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Verbosity applied to FFmpeg's logger by `init`.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Buffer alignment for video frames in bytes (0 = FFmpeg picks).
    #[serde(default = "default_frame_align")]
    pub frame_align: i32,

    /// Buffer alignment for sample buffers in bytes (0 = FFmpeg default).
    #[serde(default)]
    pub sample_align: i32,
}

fn default_frame_align() -> i32 {
    avview_util::DEFAULT_ALIGN
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            frame_align: default_frame_align(),
            sample_align: 0,
        }
    }
}
