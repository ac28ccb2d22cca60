//! avview - typed views over FFmpeg frames, streams and sample buffers
//!
//! This crate re-exports the workspace libraries and owns process-wide setup:
//! [`init`] initializes FFmpeg once and applies the configured log level.
//!
//! ```no_run
//! use avview::{Config, Frame, Pixel};
//!
//! let config = Config::default();
//! avview::init(&config)?;
//!
//! let frame = avview::video_frame(&config, 640, 360, Pixel::YUV420P)?;
//! let picture = frame.picture()?;
//! assert_eq!(picture.cb.len(), 320 * 180);
//! # Ok::<(), avview::Error>(())
//! ```

pub mod config;

use std::sync::OnceLock;

use ffmpeg_the_third as ffmpeg;

pub use avview_format as format;
pub use avview_util as util;

pub use avview_format::{
    Discard, Disposition, FormatContext, PacketRef, StreamInfo, StreamMut, StreamRef,
};
pub use avview_util::{
    ChromaSubsampling, DictionaryMut, DictionaryRef, Error, Frame, Pixel, Rational, Result,
    Sample, SampleBuffer, SideDataType, YCbCrImage,
};
pub use config::{load_config, Config, LogLevel};

static FFMPEG_INIT: OnceLock<std::result::Result<(), ffmpeg::Error>> = OnceLock::new();

/// Initialize FFmpeg and apply `config`.
///
/// The library itself is initialized only on the first call; later calls
/// only re-apply the log level.
pub fn init(config: &Config) -> Result<()> {
    config.validate()?;

    (*FFMPEG_INIT.get_or_init(ffmpeg::init))?;

    ffmpeg::util::log::set_level(config.log_level.into());

    #[cfg(feature = "tracing")]
    tracing::debug!(level = ?config.log_level, "FFmpeg log level set");

    Ok(())
}

/// Allocate a video frame using the configured frame alignment.
pub fn video_frame(config: &Config, width: i32, height: i32, format: Pixel) -> Result<Frame> {
    let mut frame = Frame::new()?;
    frame.set_video_format_aligned(width, height, format, config.frame_align)?;
    Ok(frame)
}

/// Allocate sample storage using the configured sample alignment.
pub fn sample_buffer(
    config: &Config,
    channels: i32,
    samples: i32,
    format: Sample,
) -> Result<SampleBuffer> {
    SampleBuffer::alloc(channels, samples, format, config.sample_align)
}
