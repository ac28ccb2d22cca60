//! # avview-util
//!
//! Typed views over libavutil records.
//!
//! This crate provides:
//! - [`Frame`], an owning handle over `AVFrame` with field accessors, plane
//!   access, side data and picture extraction
//! - [`SampleBuffer`] for audio sample storage
//! - [`Rational`] and dictionary views shared by the other avview crates
//! - [`Error`], the error type used across the workspace
//!
//! ## Features
//!
//! - `serialize` - serde derives on value types
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use avview_util::{Frame, Pixel};
//!
//! let mut frame = Frame::new()?;
//! frame.set_video_format(1280, 720, Pixel::YUV420P)?;
//! let picture = frame.picture()?;
//! assert_eq!(picture.y.len(), 1280 * 720);
//! # Ok::<(), avview_util::Error>(())
//! ```

mod error;
pub mod buffer;
pub mod dictionary;
pub mod frame;
pub mod pixel;
pub mod rational;
pub mod samples;

// Re-exports
pub use buffer::BufferRef;
pub use dictionary::{DictionaryMut, DictionaryRef};
pub use error::{averror, check, Error, Result};
pub use frame::{
    Frame, FrameInfo, SideData, SideDataMut, SideDataType, YCbCrImage, DEFAULT_ALIGN,
    NUM_DATA_POINTERS,
};
pub use pixel::{pixel_from_raw, ChromaSubsampling, PixelDescriptor};
pub use rational::Rational;
pub use samples::{buffer_size, sample_from_raw, SampleBuffer};

pub use ffmpeg_the_third::format::{Pixel, Sample};
