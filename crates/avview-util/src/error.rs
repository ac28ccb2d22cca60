//! Error types for avview-util.
//!
//! FFmpeg reports failure as a negative integer. Wrappers that forward a call
//! keep that integer verbatim inside [`Error::Native`] so callers can still
//! compare it against the library's error constants.

use std::ffi::NulError;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur at the FFmpeg boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A native call returned a negative status code.
    #[error("{op} failed ({code}): {message}")]
    Native {
        op: &'static str,
        code: i32,
        message: String,
    },

    /// A native allocator returned a null handle.
    #[error("allocation failed: {0}")]
    Allocation(&'static str),

    /// Invalid input provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unsupported operation or format.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A string handed to FFmpeg contained an interior NUL byte.
    #[error("string contains NUL byte: {0}")]
    Nul(#[from] NulError),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a native error from a negative FFmpeg status code.
    pub fn native(op: &'static str, code: i32) -> Self {
        Self::Native {
            op,
            code,
            message: ffmpeg_the_third::Error::from(code).to_string(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an unsupported error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The native status code carried by this error, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Native { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<ffmpeg_the_third::Error> for Error {
    fn from(err: ffmpeg_the_third::Error) -> Self {
        Self::Native {
            op: "ffmpeg",
            code: i32::from(err),
            message: err.to_string(),
        }
    }
}

/// FFmpeg's `AVERROR(e)` for a POSIX errno.
pub const fn averror(errno: i32) -> i32 {
    -errno
}

/// Translate a raw status into a `Result`, keeping non-negative values.
pub fn check(op: &'static str, ret: i32) -> Result<i32> {
    if ret < 0 {
        #[cfg(feature = "tracing")]
        tracing::debug!(op, code = ret, "native call failed");
        Err(Error::native(op, ret))
    } else {
        Ok(ret)
    }
}
