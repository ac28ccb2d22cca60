//! Views over a stream's `AVCodecParameters`.

use std::marker::PhantomData;

use avview_util::{check, Result};
use ffmpeg_the_third as ffmpeg;
use ffmpeg::ffi::{
    av_channel_layout_default, av_channel_layout_from_mask, av_channel_layout_uninit,
    AVCodecParameters,
};

/// Read-only view of codec parameters owned by a stream.
#[derive(Clone, Copy)]
pub struct CodecParametersRef<'a> {
    ptr: *const AVCodecParameters,
    _marker: PhantomData<&'a AVCodecParameters>,
}

impl<'a> CodecParametersRef<'a> {
    /// # Safety
    /// `ptr` must be non-null and valid for `'a`.
    pub unsafe fn from_raw(ptr: *const AVCodecParameters) -> Self {
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    fn raw(&self) -> &'a AVCodecParameters {
        unsafe { &*self.ptr }
    }

    pub fn as_ptr(&self) -> *const AVCodecParameters {
        self.ptr
    }

    pub fn medium(&self) -> ffmpeg::media::Type {
        self.raw().codec_type.into()
    }

    pub fn id(&self) -> ffmpeg::codec::Id {
        self.raw().codec_id.into()
    }

    pub fn codec_tag(&self) -> u32 {
        self.raw().codec_tag
    }

    pub fn bit_rate(&self) -> i64 {
        self.raw().bit_rate
    }

    pub fn width(&self) -> i32 {
        self.raw().width
    }

    pub fn height(&self) -> i32 {
        self.raw().height
    }

    /// Raw pixel or sample format tag, depending on the medium.
    pub fn format(&self) -> i32 {
        self.raw().format
    }

    pub fn sample_rate(&self) -> i32 {
        self.raw().sample_rate
    }

    pub fn channels(&self) -> i32 {
        self.raw().ch_layout.nb_channels
    }

    pub fn profile(&self) -> i32 {
        self.raw().profile
    }

    pub fn level(&self) -> i32 {
        self.raw().level
    }

    pub fn frame_size(&self) -> i32 {
        self.raw().frame_size
    }

    /// Codec-specific setup bytes (SPS/PPS, AudioSpecificConfig...).
    pub fn extradata(&self) -> &'a [u8] {
        let raw = self.raw();
        if raw.extradata.is_null() || raw.extradata_size <= 0 {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(raw.extradata, raw.extradata_size as usize) }
    }

    pub fn nb_coded_side_data(&self) -> usize {
        self.raw().nb_coded_side_data.max(0) as usize
    }
}

impl std::fmt::Debug for CodecParametersRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecParameters")
            .field("medium", &self.medium())
            .field("id", &self.id())
            .field("width", &self.width())
            .field("height", &self.height())
            .field("sample_rate", &self.sample_rate())
            .field("channels", &self.channels())
            .finish()
    }
}

/// Mutable view of codec parameters owned by a stream.
pub struct CodecParametersMut<'a> {
    ptr: *mut AVCodecParameters,
    _marker: PhantomData<&'a mut AVCodecParameters>,
}

impl CodecParametersMut<'_> {
    /// # Safety
    /// `ptr` must be non-null, valid and not aliased for the view's lifetime.
    pub unsafe fn from_raw(ptr: *mut AVCodecParameters) -> Self {
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    fn raw(&mut self) -> &mut AVCodecParameters {
        unsafe { &mut *self.ptr }
    }

    pub fn view(&self) -> CodecParametersRef<'_> {
        unsafe { CodecParametersRef::from_raw(self.ptr) }
    }

    pub fn set_medium(&mut self, medium: ffmpeg::media::Type) {
        self.raw().codec_type = medium.into();
    }

    pub fn set_id(&mut self, id: ffmpeg::codec::Id) {
        self.raw().codec_id = id.into();
    }

    pub fn set_codec_tag(&mut self, tag: u32) {
        self.raw().codec_tag = tag;
    }

    pub fn set_bit_rate(&mut self, bit_rate: i64) {
        self.raw().bit_rate = bit_rate;
    }

    pub fn set_width(&mut self, width: i32) {
        self.raw().width = width;
    }

    pub fn set_height(&mut self, height: i32) {
        self.raw().height = height;
    }

    pub fn set_format(&mut self, format: i32) {
        self.raw().format = format;
    }

    pub fn set_sample_rate(&mut self, rate: i32) {
        self.raw().sample_rate = rate;
    }

    /// Replace the layout with the default native layout for `channels`.
    pub fn set_channels(&mut self, channels: i32) {
        let layout = &mut self.raw().ch_layout;
        unsafe {
            av_channel_layout_uninit(layout);
            av_channel_layout_default(layout, channels);
        }
    }

    pub fn set_channel_layout(&mut self, mask: u64) -> Result<()> {
        let layout = &mut self.raw().ch_layout;
        unsafe {
            av_channel_layout_uninit(layout);
            check(
                "av_channel_layout_from_mask",
                av_channel_layout_from_mask(layout, mask),
            )?;
        }
        Ok(())
    }

    pub fn set_profile(&mut self, profile: i32) {
        self.raw().profile = profile;
    }

    pub fn set_level(&mut self, level: i32) {
        self.raw().level = level;
    }

    pub fn set_frame_size(&mut self, frame_size: i32) {
        self.raw().frame_size = frame_size;
    }
}
