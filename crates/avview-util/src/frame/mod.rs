//! Owning handle over a native `AVFrame`.
//!
//! [`Frame`] owns exactly one `AVFrame` allocation and frees it on drop. The
//! media buffers it points at are reference counted by libavutil: cloning or
//! referencing a frame shares them, and they are released when the last
//! frame referencing them is unreffed or freed.

mod picture;
mod side_data;

pub use picture::YCbCrImage;
pub use side_data::{SideData, SideDataMut, SideDataType};

use std::mem::ManuallyDrop;
use std::ptr::NonNull;

use ffmpeg_the_third::ffi::{
    av_channel_layout_from_mask, av_channel_layout_uninit, av_frame_alloc, av_frame_clone,
    av_frame_copy_props, av_frame_free, av_frame_get_buffer, av_frame_get_plane_buffer,
    av_frame_is_writable, av_frame_make_writable, av_frame_move_ref, av_frame_ref,
    av_frame_unref, AVChannelOrder, AVFrame, AV_FRAME_FLAG_KEY,
};
use ffmpeg_the_third::format::{Pixel, Sample};

use crate::buffer::BufferRef;
use crate::dictionary::{DictionaryMut, DictionaryRef};
use crate::error::{check, Error, Result};
use crate::pixel::{pixel_from_raw, PixelDescriptor};
use crate::rational::Rational;
use crate::samples::sample_from_raw;

/// Maximum number of data planes addressable through `AVFrame::data`.
pub const NUM_DATA_POINTERS: usize = 8;

/// Buffer alignment used by [`Frame::set_video_format`].
pub const DEFAULT_ALIGN: i32 = 32;

/// Snapshot of a frame's geometry and plane pointers.
#[derive(Clone, Copy, Debug)]
pub struct FrameInfo {
    pub width: i32,
    pub height: i32,
    pub linesize: [i32; NUM_DATA_POINTERS],
    pub data: [*const u8; NUM_DATA_POINTERS],
}

/// Owning wrapper around an `AVFrame`.
pub struct Frame {
    ptr: NonNull<AVFrame>,
}

// Exclusively owned; not Sync.
unsafe impl Send for Frame {}

impl Frame {
    /// Allocate an empty frame with fields set to their defaults.
    pub fn new() -> Result<Self> {
        let ptr = unsafe { av_frame_alloc() };
        NonNull::new(ptr).map(|ptr| Self { ptr }).ok_or_else(|| {
            #[cfg(feature = "tracing")]
            tracing::debug!("av_frame_alloc returned null");
            Error::Allocation("AVFrame")
        })
    }

    /// Take ownership of a frame allocated by FFmpeg.
    ///
    /// # Safety
    /// `ptr` must come from `av_frame_alloc`/`av_frame_clone` and must not be
    /// freed by anyone else.
    pub unsafe fn from_raw(ptr: *mut AVFrame) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    /// Release ownership; the caller becomes responsible for `av_frame_free`.
    pub fn into_raw(self) -> *mut AVFrame {
        ManuallyDrop::new(self).ptr.as_ptr()
    }

    #[inline]
    pub fn as_ptr(&self) -> *const AVFrame {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut AVFrame {
        self.ptr.as_ptr()
    }

    /// Free the frame and drop its buffer references.
    pub fn free(self) {
        drop(self)
    }

    #[inline]
    fn raw(&self) -> &AVFrame {
        unsafe { self.ptr.as_ref() }
    }

    #[inline]
    fn raw_mut(&mut self) -> &mut AVFrame {
        unsafe { self.ptr.as_mut() }
    }

    // ------------------------------------------------------------------
    // Reference counting
    // ------------------------------------------------------------------

    /// Allocate buffers for the audio or video parameters already set.
    pub fn get_buffer(&mut self, align: i32) -> Result<()> {
        check("av_frame_get_buffer", unsafe {
            av_frame_get_buffer(self.as_mut_ptr(), align)
        })?;
        Ok(())
    }

    /// Make `dst` a new reference to this frame's data and properties.
    ///
    /// Anything `dst` referenced before is released first.
    pub fn ref_into(&self, dst: &mut Frame) -> Result<()> {
        unsafe {
            av_frame_unref(dst.as_mut_ptr());
            check("av_frame_ref", av_frame_ref(dst.as_mut_ptr(), self.as_ptr()))?;
        }
        Ok(())
    }

    /// New frame referencing the same data as this one.
    pub fn try_clone(&self) -> Result<Frame> {
        let ptr = unsafe { av_frame_clone(self.as_ptr()) };
        NonNull::new(ptr)
            .map(|ptr| Self { ptr })
            .ok_or(Error::Allocation("frame clone"))
    }

    /// Drop all buffer references and reset fields to defaults.
    pub fn unref(&mut self) {
        unsafe { av_frame_unref(self.as_mut_ptr()) }
    }

    /// Move everything into `dst`, leaving this frame reset.
    pub fn move_ref_into(&mut self, dst: &mut Frame) {
        unsafe {
            av_frame_unref(dst.as_mut_ptr());
            av_frame_move_ref(dst.as_mut_ptr(), self.as_mut_ptr());
        }
    }

    /// True when every plane buffer has a single reference.
    pub fn is_writable(&self) -> bool {
        unsafe { av_frame_is_writable(self.ptr.as_ptr()) != 0 }
    }

    /// Ensure the data is writable, copying it if it is shared.
    pub fn make_writable(&mut self) -> Result<()> {
        check("av_frame_make_writable", unsafe {
            av_frame_make_writable(self.as_mut_ptr())
        })?;
        Ok(())
    }

    /// Copy metadata fields (timestamps, side data, color properties...) into `dst`.
    pub fn copy_props_into(&self, dst: &mut Frame) -> Result<()> {
        check("av_frame_copy_props", unsafe {
            av_frame_copy_props(dst.as_mut_ptr(), self.as_ptr())
        })?;
        Ok(())
    }

    /// Buffer that stores the given data plane.
    pub fn plane_buffer(&self, plane: usize) -> Option<BufferRef<'_>> {
        let ptr = unsafe { av_frame_get_plane_buffer(self.ptr.as_ptr(), plane as i32) };
        if ptr.is_null() {
            None
        } else {
            Some(unsafe { BufferRef::from_raw(ptr) })
        }
    }

    // ------------------------------------------------------------------
    // Format setup
    // ------------------------------------------------------------------

    /// Set dimensions and pixel format, then allocate buffers at [`DEFAULT_ALIGN`].
    pub fn set_video_format(&mut self, width: i32, height: i32, format: Pixel) -> Result<()> {
        self.set_video_format_aligned(width, height, format, DEFAULT_ALIGN)
    }

    pub fn set_video_format_aligned(
        &mut self,
        width: i32,
        height: i32,
        format: Pixel,
        align: i32,
    ) -> Result<()> {
        self.ensure_unallocated()?;

        let frame = self.raw_mut();
        frame.width = width;
        frame.height = height;
        frame.format = ffmpeg_the_third::ffi::AVPixelFormat::from(format) as i32;

        self.get_buffer(align)
    }

    /// Set sample count, sample format and channel layout, then allocate buffers.
    pub fn set_audio_format(
        &mut self,
        nb_samples: i32,
        format: Sample,
        channel_mask: u64,
        align: i32,
    ) -> Result<()> {
        self.ensure_unallocated()?;

        self.set_nb_samples(nb_samples);
        self.raw_mut().format = ffmpeg_the_third::ffi::AVSampleFormat::from(format) as i32;
        self.set_channel_layout(channel_mask)?;

        self.get_buffer(align)
    }

    fn ensure_unallocated(&self) -> Result<()> {
        if self.raw().buf[0].is_null() {
            Ok(())
        } else {
            Err(Error::invalid_input(
                "frame already holds buffers; unref it before changing its format",
            ))
        }
    }

    // ------------------------------------------------------------------
    // Fields
    // ------------------------------------------------------------------

    pub fn width(&self) -> i32 {
        self.raw().width
    }

    pub fn set_width(&mut self, width: i32) {
        self.raw_mut().width = width;
    }

    pub fn height(&self) -> i32 {
        self.raw().height
    }

    pub fn set_height(&mut self, height: i32) {
        self.raw_mut().height = height;
    }

    /// Raw format tag: a pixel format for video, a sample format for audio.
    pub fn format(&self) -> i32 {
        self.raw().format
    }

    pub fn set_format(&mut self, format: i32) {
        self.raw_mut().format = format;
    }

    pub fn pixel_format(&self) -> Option<Pixel> {
        pixel_from_raw(self.format())
    }

    pub fn sample_format(&self) -> Option<Sample> {
        sample_from_raw(self.format())
    }

    /// Audio samples per channel.
    pub fn nb_samples(&self) -> i32 {
        self.raw().nb_samples
    }

    pub fn set_nb_samples(&mut self, nb_samples: i32) {
        self.raw_mut().nb_samples = nb_samples;
    }

    /// Channel mask of a native-order layout; 0 for unset or custom layouts.
    pub fn channel_layout(&self) -> u64 {
        let layout = &self.raw().ch_layout;
        if layout.order == AVChannelOrder::AV_CHANNEL_ORDER_NATIVE {
            unsafe { layout.u.mask }
        } else {
            0
        }
    }

    /// Replace the channel layout with the native-order layout for `mask`.
    pub fn set_channel_layout(&mut self, mask: u64) -> Result<()> {
        let layout = &mut self.raw_mut().ch_layout;
        unsafe {
            av_channel_layout_uninit(layout);
            check(
                "av_channel_layout_from_mask",
                av_channel_layout_from_mask(layout, mask),
            )?;
        }
        Ok(())
    }

    pub fn channels(&self) -> i32 {
        self.raw().ch_layout.nb_channels
    }

    pub fn sample_rate(&self) -> i32 {
        self.raw().sample_rate
    }

    pub fn set_sample_rate(&mut self, rate: i32) {
        self.raw_mut().sample_rate = rate;
    }

    pub fn pts(&self) -> i64 {
        self.raw().pts
    }

    pub fn set_pts(&mut self, pts: i64) {
        self.raw_mut().pts = pts;
    }

    pub fn pkt_dts(&self) -> i64 {
        self.raw().pkt_dts
    }

    /// Timestamp estimated by the decoder from pts/dts heuristics.
    pub fn best_effort_timestamp(&self) -> i64 {
        self.raw().best_effort_timestamp
    }

    pub fn duration(&self) -> i64 {
        self.raw().duration
    }

    pub fn set_duration(&mut self, duration: i64) {
        self.raw_mut().duration = duration;
    }

    pub fn time_base(&self) -> Rational {
        self.raw().time_base.into()
    }

    pub fn set_time_base(&mut self, time_base: Rational) {
        self.raw_mut().time_base = time_base.into();
    }

    pub fn is_key_frame(&self) -> bool {
        self.raw().flags & AV_FRAME_FLAG_KEY as i32 != 0
    }

    pub fn set_key_frame(&mut self, key: bool) {
        let frame = self.raw_mut();
        if key {
            frame.flags |= AV_FRAME_FLAG_KEY as i32;
        } else {
            frame.flags &= !(AV_FRAME_FLAG_KEY as i32);
        }
    }

    pub fn metadata(&self) -> DictionaryRef<'_> {
        unsafe { DictionaryRef::from_raw(self.raw().metadata) }
    }

    pub fn metadata_mut(&mut self) -> DictionaryMut<'_> {
        unsafe { DictionaryMut::from_raw(&mut self.raw_mut().metadata) }
    }

    // ------------------------------------------------------------------
    // Planes
    // ------------------------------------------------------------------

    /// Copy of the eight plane pointers. The bytes are not copied.
    pub fn data(&self) -> [*const u8; NUM_DATA_POINTERS] {
        self.raw().data.map(|p| p as *const u8)
    }

    /// Copy of the eight plane strides in bytes.
    pub fn linesize(&self) -> [i32; NUM_DATA_POINTERS] {
        self.raw().linesize
    }

    pub fn info(&self) -> FrameInfo {
        FrameInfo {
            width: self.width(),
            height: self.height(),
            linesize: self.linesize(),
            data: self.data(),
        }
    }

    fn is_video(&self) -> bool {
        self.width() > 0 && self.height() > 0
    }

    /// Number of data planes implied by the frame's format.
    pub fn plane_count(&self) -> usize {
        if self.is_video() {
            self.pixel_format()
                .and_then(PixelDescriptor::of)
                .map(|d| d.plane_count())
                .unwrap_or(0)
        } else if self.nb_samples() > 0 {
            match self.sample_format() {
                Some(f) if f.is_planar() => {
                    (self.channels().max(0) as usize).min(NUM_DATA_POINTERS)
                }
                Some(_) => 1,
                None => 0,
            }
        } else {
            0
        }
    }

    /// Bytes addressable in `plane`, including row padding.
    fn plane_len(&self, plane: usize) -> Option<usize> {
        if self.is_video() {
            let desc = PixelDescriptor::of(self.pixel_format()?)?;
            let stride = usize::try_from(self.raw().linesize[plane]).ok()?;
            let rows = desc.plane_height(plane, self.height() as u32) as usize;
            Some(stride * rows)
        } else {
            // Audio planes all share linesize[0].
            usize::try_from(self.raw().linesize[0]).ok()
        }
    }

    /// Bytes of one plane, or `None` if the plane is absent.
    pub fn plane(&self, plane: usize) -> Option<&[u8]> {
        if plane >= self.plane_count() {
            return None;
        }
        let ptr = self.raw().data[plane];
        let len = self.plane_len(plane)?;
        if ptr.is_null() || len == 0 {
            return None;
        }
        Some(unsafe { std::slice::from_raw_parts(ptr, len) })
    }

    /// Mutable bytes of one plane.
    ///
    /// Returns `None` while the buffers are shared with another frame; call
    /// [`Frame::make_writable`] first.
    pub fn plane_mut(&mut self, plane: usize) -> Option<&mut [u8]> {
        if plane >= self.plane_count() || !self.is_writable() {
            return None;
        }
        let ptr = self.raw().data[plane];
        let len = self.plane_len(plane)?;
        if ptr.is_null() || len == 0 {
            return None;
        }
        Some(unsafe { std::slice::from_raw_parts_mut(ptr, len) })
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        let mut ptr = self.ptr.as_ptr();
        unsafe { av_frame_free(&mut ptr) }
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("format", &self.format())
            .field("nb_samples", &self.nb_samples())
            .field("pts", &self.pts())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::averror;
    use assert_matches::assert_matches;
    use ffmpeg_the_third::ffi::{AV_CH_LAYOUT_MONO, AV_CH_LAYOUT_STEREO};

    fn video_frame(width: i32, height: i32, format: Pixel) -> Frame {
        let mut frame = Frame::new().unwrap();
        frame.set_video_format(width, height, format).unwrap();
        frame
    }

    #[test]
    fn test_new_frame_is_empty() {
        let frame = Frame::new().unwrap();
        assert_eq!(frame.width(), 0);
        assert_eq!(frame.height(), 0);
        assert_eq!(frame.format(), -1);
        assert!(frame.data().iter().all(|p| p.is_null()));
        assert_eq!(frame.plane_count(), 0);
        assert!(frame.plane(0).is_none());
    }

    #[test]
    fn test_field_round_trips() {
        let mut frame = Frame::new().unwrap();

        frame.set_nb_samples(1024);
        assert_eq!(frame.nb_samples(), 1024);

        frame.set_width(640);
        frame.set_height(360);
        assert_eq!((frame.width(), frame.height()), (640, 360));

        frame.set_format(ffmpeg_the_third::ffi::AVPixelFormat::AV_PIX_FMT_YUV420P as i32);
        assert_eq!(frame.pixel_format(), Some(Pixel::YUV420P));

        frame.set_pts(90_000);
        assert_eq!(frame.pts(), 90_000);

        frame.set_duration(3003);
        assert_eq!(frame.duration(), 3003);

        frame.set_sample_rate(48_000);
        assert_eq!(frame.sample_rate(), 48_000);

        frame.set_time_base(Rational::new(1, 90_000));
        assert_eq!(frame.time_base(), Rational::new(1, 90_000));

        frame.set_key_frame(true);
        assert!(frame.is_key_frame());
        frame.set_key_frame(false);
        assert!(!frame.is_key_frame());
    }

    #[test]
    fn test_channel_layout_round_trip() {
        let mut frame = Frame::new().unwrap();
        frame.set_channel_layout(AV_CH_LAYOUT_STEREO).unwrap();
        assert_eq!(frame.channel_layout(), AV_CH_LAYOUT_STEREO);
        assert_eq!(frame.channels(), 2);

        frame.set_channel_layout(AV_CH_LAYOUT_MONO).unwrap();
        assert_eq!(frame.channels(), 1);
    }

    #[test]
    fn test_set_video_format_allocates_planes() {
        let frame = video_frame(64, 48, Pixel::YUV420P);
        let linesize = frame.linesize();

        assert_eq!(frame.plane_count(), 3);
        assert!(linesize[0] >= 64);
        assert!(linesize[1] >= 32);
        assert_eq!(linesize[0] % DEFAULT_ALIGN, 0);
        assert_eq!(frame.plane(0).unwrap().len(), linesize[0] as usize * 48);
        assert_eq!(frame.plane(1).unwrap().len(), linesize[1] as usize * 24);
        assert!(frame.plane(3).is_none());
    }

    #[test]
    fn test_set_video_format_rejects_bad_dimensions() {
        for (w, h) in [(0, 0), (0, 48), (64, 0), (-64, 48), (64, -48)] {
            let mut frame = Frame::new().unwrap();
            let err = frame.set_video_format(w, h, Pixel::YUV420P).unwrap_err();
            assert_eq!(err.code(), Some(averror(libc::EINVAL)), "{w}x{h}");
            assert!(frame.data()[0].is_null());
        }
    }

    #[test]
    fn test_set_video_format_twice_is_rejected() {
        let mut frame = video_frame(16, 16, Pixel::YUV420P);
        let err = frame.set_video_format(32, 32, Pixel::YUV420P).unwrap_err();
        assert_matches!(err, Error::InvalidInput(_));

        frame.unref();
        frame.set_video_format(32, 32, Pixel::YUV420P).unwrap();
        assert_eq!(frame.width(), 32);
    }

    #[test]
    fn test_plane_patterns_read_back() {
        let mut frame = video_frame(32, 16, Pixel::YUV420P);

        for plane in 0..frame.plane_count() {
            let bytes = frame.plane_mut(plane).unwrap();
            for (i, b) in bytes.iter_mut().enumerate() {
                *b = (i as u8).wrapping_mul(plane as u8 + 3);
            }
        }

        for plane in 0..frame.plane_count() {
            let bytes = frame.plane(plane).unwrap();
            assert!(bytes
                .iter()
                .enumerate()
                .all(|(i, b)| *b == (i as u8).wrapping_mul(plane as u8 + 3)));

            // The raw pointer copy points at the same memory.
            assert_eq!(frame.data()[plane], bytes.as_ptr());
        }
    }

    #[test]
    fn test_clone_shares_buffers() {
        let mut frame = video_frame(16, 16, Pixel::YUV420P);
        frame.plane_mut(0).unwrap()[0] = 0xAB;

        let clone = frame.try_clone().unwrap();
        assert_eq!(frame.plane_buffer(0).unwrap().ref_count(), 2);
        assert_eq!(clone.data()[0], frame.data()[0]);
        assert_eq!(clone.plane(0).unwrap()[0], 0xAB);

        assert!(!frame.is_writable());
        assert!(frame.plane_mut(0).is_none());

        clone.free();
        assert_eq!(frame.plane_buffer(0).unwrap().ref_count(), 1);
        assert!(frame.is_writable());
    }

    #[test]
    fn test_make_writable_detaches() {
        let mut frame = video_frame(16, 16, Pixel::YUV420P);
        frame.plane_mut(0).unwrap()[0] = 7;
        let clone = frame.try_clone().unwrap();

        frame.make_writable().unwrap();
        assert_ne!(frame.data()[0], clone.data()[0]);
        frame.plane_mut(0).unwrap()[0] = 9;
        assert_eq!(clone.plane(0).unwrap()[0], 7);
    }

    #[test]
    fn test_ref_into_and_move_ref_into() {
        let mut src = video_frame(16, 16, Pixel::YUV420P);
        src.set_pts(42);

        let mut referenced = Frame::new().unwrap();
        src.ref_into(&mut referenced).unwrap();
        assert_eq!(referenced.pts(), 42);
        assert_eq!(referenced.data()[0], src.data()[0]);

        let mut moved = Frame::new().unwrap();
        src.move_ref_into(&mut moved);
        assert_eq!(moved.pts(), 42);
        assert_eq!(moved.width(), 16);
        assert!(src.data()[0].is_null());
        assert_eq!(src.width(), 0);
        assert_eq!(moved.plane_buffer(0).unwrap().ref_count(), 2);
    }

    #[test]
    fn test_unref_resets_fields() {
        let mut frame = video_frame(16, 16, Pixel::YUV420P);
        frame.set_pts(10);
        frame.unref();
        assert_eq!(frame.width(), 0);
        assert!(frame.data()[0].is_null());
        assert!(frame.plane_buffer(0).is_none());
    }

    #[test]
    fn test_copy_props_into() {
        let mut src = Frame::new().unwrap();
        src.set_pts(1234);
        src.metadata_mut().set("rotate", "90").unwrap();

        let mut dst = Frame::new().unwrap();
        src.copy_props_into(&mut dst).unwrap();
        assert_eq!(dst.pts(), 1234);
        assert_eq!(dst.metadata().get("rotate"), Some("90"));
    }

    #[test]
    fn test_audio_frame_planes() {
        let mut frame = Frame::new().unwrap();
        frame
            .set_audio_format(
                1024,
                Sample::F32(ffmpeg_the_third::format::sample::Type::Planar),
                AV_CH_LAYOUT_STEREO,
                0,
            )
            .unwrap();

        assert_eq!(frame.nb_samples(), 1024);
        assert_eq!(frame.channels(), 2);
        assert_eq!(frame.plane_count(), 2);
        assert!(frame.plane(0).unwrap().len() >= 1024 * 4);
        assert!(frame.plane(2).is_none());
    }

    #[test]
    fn test_info_matches_accessors() {
        let frame = video_frame(48, 32, Pixel::YUV420P);
        let info = frame.info();
        assert_eq!(info.width, 48);
        assert_eq!(info.height, 32);
        assert_eq!(info.linesize, frame.linesize());
        assert_eq!(info.data, frame.data());
    }

    #[test]
    fn test_raw_round_trip() {
        let frame = video_frame(16, 16, Pixel::YUV420P);
        let raw = frame.into_raw();
        let frame = unsafe { Frame::from_raw(raw) }.unwrap();
        assert_eq!(frame.width(), 16);
        assert!(unsafe { Frame::from_raw(std::ptr::null_mut()) }.is_none());
    }
}
