//! Owner of an `AVFormatContext` and the streams inside it.

use std::ffi::CString;
use std::path::Path;
use std::ptr::{self, NonNull};

use avview_util::{check, DictionaryMut, DictionaryRef, Error, Result};
use ffmpeg_the_third::ffi::{
    avformat_alloc_context, avformat_close_input, avformat_find_stream_info,
    avformat_free_context, avformat_new_stream, avformat_open_input, AVFormatContext,
};

use crate::stream::{StreamMut, StreamRef};

/// Owning wrapper around an `AVFormatContext`.
///
/// Contexts opened from a file are closed with `avformat_close_input`; contexts
/// built with [`FormatContext::alloc`] are released with
/// `avformat_free_context`. Either way every stream goes with them.
pub struct FormatContext {
    ptr: NonNull<AVFormatContext>,
    input: bool,
}

unsafe impl Send for FormatContext {}

impl FormatContext {
    /// Allocate an empty context, for example to build streams by hand.
    pub fn alloc() -> Result<Self> {
        let ptr = unsafe { avformat_alloc_context() };
        NonNull::new(ptr)
            .map(|ptr| Self { ptr, input: false })
            .ok_or(Error::Allocation("AVFormatContext"))
    }

    /// Open a media file and read enough of it to fill in stream parameters.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let utf8 = path
            .to_str()
            .ok_or_else(|| Error::invalid_input(format!("non UTF-8 path: {}", path.display())))?;
        let c_path = CString::new(utf8)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(path = %path.display(), "opening input");

        let mut raw: *mut AVFormatContext = ptr::null_mut();
        check("avformat_open_input", unsafe {
            avformat_open_input(&mut raw, c_path.as_ptr(), ptr::null(), ptr::null_mut())
        })?;
        let ctx = NonNull::new(raw)
            .map(|ptr| Self { ptr, input: true })
            .ok_or(Error::Allocation("AVFormatContext"))?;

        // On failure `ctx` is dropped here, which closes the input.
        check("avformat_find_stream_info", unsafe {
            avformat_find_stream_info(ctx.ptr.as_ptr(), ptr::null_mut())
        })?;

        #[cfg(feature = "tracing")]
        tracing::debug!(streams = ctx.nb_streams(), "input opened");

        Ok(ctx)
    }

    pub fn as_ptr(&self) -> *const AVFormatContext {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut AVFormatContext {
        self.ptr.as_ptr()
    }

    fn raw(&self) -> &AVFormatContext {
        unsafe { self.ptr.as_ref() }
    }

    /// Append a stream; it is freed together with this context.
    pub fn new_stream(&mut self) -> Result<StreamMut<'_>> {
        let stream = unsafe { avformat_new_stream(self.as_mut_ptr(), ptr::null()) };
        if stream.is_null() {
            return Err(Error::Allocation("AVStream"));
        }
        Ok(unsafe { StreamMut::from_raw(stream) })
    }

    pub fn nb_streams(&self) -> usize {
        self.raw().nb_streams as usize
    }

    fn stream_ptr(&self, index: usize) -> Option<*mut ffmpeg_the_third::ffi::AVStream> {
        if index >= self.nb_streams() {
            return None;
        }
        let ptr = unsafe { *self.raw().streams.add(index) };
        (!ptr.is_null()).then_some(ptr)
    }

    pub fn stream(&self, index: usize) -> Option<StreamRef<'_>> {
        self.stream_ptr(index)
            .map(|ptr| unsafe { StreamRef::from_raw(ptr) })
    }

    pub fn stream_mut(&mut self, index: usize) -> Option<StreamMut<'_>> {
        self.stream_ptr(index)
            .map(|ptr| unsafe { StreamMut::from_raw(ptr) })
    }

    pub fn streams(&self) -> impl Iterator<Item = StreamRef<'_>> + '_ {
        (0..self.nb_streams()).filter_map(move |i| self.stream(i))
    }

    /// Container-level metadata.
    pub fn metadata(&self) -> DictionaryRef<'_> {
        unsafe { DictionaryRef::from_raw(self.raw().metadata) }
    }

    pub fn metadata_mut(&mut self) -> DictionaryMut<'_> {
        unsafe { DictionaryMut::from_raw(&mut (*self.ptr.as_ptr()).metadata) }
    }

    /// Container duration in microseconds (`AV_TIME_BASE` units).
    pub fn duration(&self) -> i64 {
        self.raw().duration
    }
}

impl Drop for FormatContext {
    fn drop(&mut self) {
        let mut ptr = self.ptr.as_ptr();
        unsafe {
            if self.input {
                avformat_close_input(&mut ptr);
            } else {
                avformat_free_context(ptr);
            }
        }
    }
}

impl std::fmt::Debug for FormatContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatContext")
            .field("nb_streams", &self.nb_streams())
            .field("duration", &self.duration())
            .field("input", &self.input)
            .finish()
    }
}
