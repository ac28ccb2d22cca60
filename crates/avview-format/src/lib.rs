//! # avview-format
//!
//! Typed views over libavformat records.
//!
//! [`FormatContext`] owns the native context; streams, codec parameters and
//! packets are only reachable as borrows of it, so none of them can outlive
//! the memory they point into.
//!
//! ## Example
//!
//! ```no_run
//! use avview_format::FormatContext;
//!
//! let ctx = FormatContext::open("/path/to/video.mkv")?;
//! for stream in ctx.streams() {
//!     let codec = stream.codec_parameters().id();
//!     println!("#{} {:?} tb={}", stream.index(), codec, stream.time_base());
//! }
//! # Ok::<(), avview_format::Error>(())
//! ```

pub mod codec_parameters;
pub mod context;
pub mod packet;
pub mod stream;

// Re-exports
pub use avview_util::{Error, Rational, Result};
pub use codec_parameters::{CodecParametersMut, CodecParametersRef};
pub use context::FormatContext;
pub use packet::PacketRef;
pub use stream::{Discard, StreamInfo, StreamMut, StreamRef};

pub use ffmpeg_the_third::format::stream::Disposition;
