//! Audio sample buffers allocated by libavutil.

use std::ffi::c_void;
use std::ptr;

use ffmpeg_the_third::ffi::{
    av_freep, av_samples_alloc_array_and_samples, av_samples_get_buffer_size, AVSampleFormat,
};
use ffmpeg_the_third::format::Sample;

use crate::error::{check, Error, Result};

/// Convert a raw `format` tag into a sample format.
pub fn sample_from_raw(raw: i32) -> Option<Sample> {
    if raw < 0 || raw >= AVSampleFormat::AV_SAMPLE_FMT_NB as i32 {
        return None;
    }
    // SAFETY: range-checked against AV_SAMPLE_FMT_NB; the enum is dense below it.
    let native: AVSampleFormat = unsafe { std::mem::transmute(raw) };
    Some(Sample::from(native))
}

/// Bytes needed for `samples` samples of `channels` channels.
pub fn buffer_size(channels: i32, samples: i32, format: Sample, align: i32) -> Result<usize> {
    let size = check("av_samples_get_buffer_size", unsafe {
        av_samples_get_buffer_size(ptr::null_mut(), channels, samples, format.into(), align)
    })?;
    Ok(size as usize)
}

/// Per-channel sample storage from `av_samples_alloc_array_and_samples`.
///
/// Planar formats get one plane per channel, packed formats a single
/// interleaved plane. All planes share one allocation.
pub struct SampleBuffer {
    data: *mut *mut u8,
    linesize: i32,
    channels: i32,
    samples: i32,
    format: Sample,
}

unsafe impl Send for SampleBuffer {}

impl SampleBuffer {
    /// Allocate storage. An `align` of 0 picks the native default.
    ///
    /// Zero channels or zero samples fail with `AVERROR(EINVAL)`, reported
    /// verbatim through [`Error::code`].
    pub fn alloc(channels: i32, samples: i32, format: Sample, align: i32) -> Result<Self> {
        let mut data: *mut *mut u8 = ptr::null_mut();
        let mut linesize = 0;

        check("av_samples_alloc_array_and_samples", unsafe {
            av_samples_alloc_array_and_samples(
                &mut data,
                &mut linesize,
                channels,
                samples,
                format.into(),
                align,
            )
        })?;
        if data.is_null() {
            return Err(Error::Allocation("sample buffer"));
        }

        Ok(Self {
            data,
            linesize,
            channels,
            samples,
            format,
        })
    }

    pub fn format(&self) -> Sample {
        self.format
    }

    pub fn channels(&self) -> i32 {
        self.channels
    }

    /// Samples per channel.
    pub fn samples(&self) -> i32 {
        self.samples
    }

    /// Bytes per plane.
    pub fn linesize(&self) -> i32 {
        self.linesize
    }

    pub fn planes(&self) -> usize {
        if self.format.is_planar() {
            self.channels as usize
        } else {
            1
        }
    }

    /// Raw pointer array, valid while `self` lives.
    pub fn as_ptr(&self) -> *const *mut u8 {
        self.data
    }

    fn plane_ptr(&self, index: usize) -> Option<*mut u8> {
        if index >= self.planes() {
            return None;
        }
        let ptr = unsafe { *self.data.add(index) };
        (!ptr.is_null()).then_some(ptr)
    }

    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        let ptr = self.plane_ptr(index)?;
        Some(unsafe { std::slice::from_raw_parts(ptr, self.linesize as usize) })
    }

    pub fn plane_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        let ptr = self.plane_ptr(index)?;
        Some(unsafe { std::slice::from_raw_parts_mut(ptr, self.linesize as usize) })
    }
}

impl Drop for SampleBuffer {
    fn drop(&mut self) {
        unsafe {
            // data[0] owns the samples; the array itself is a second allocation.
            av_freep(self.data as *mut c_void);
            av_freep(&mut self.data as *mut *mut *mut u8 as *mut c_void);
        }
    }
}

impl std::fmt::Debug for SampleBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleBuffer")
            .field("format", &self.format)
            .field("channels", &self.channels)
            .field("samples", &self.samples)
            .field("linesize", &self.linesize)
            .finish()
    }
}
