//! Stream views.
//!
//! Streams live inside their [`FormatContext`](crate::FormatContext) and are
//! freed with it, so views here are borrows of the context rather than owners.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use avview_util::{DictionaryMut, DictionaryRef, Rational};
use ffmpeg_the_third as ffmpeg;
use ffmpeg::ffi::{AVDiscard, AVStream};
use ffmpeg::format::stream::Disposition;

use crate::codec_parameters::{CodecParametersMut, CodecParametersRef};
use crate::packet::PacketRef;

/// Which packets a demuxer may drop for this stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "snake_case"))]
pub enum Discard {
    None,
    #[default]
    Default,
    NonRef,
    Bidir,
    NonIntra,
    NonKey,
    All,
}

impl From<AVDiscard> for Discard {
    fn from(value: AVDiscard) -> Self {
        match value {
            AVDiscard::AVDISCARD_NONE => Self::None,
            AVDiscard::AVDISCARD_DEFAULT => Self::Default,
            AVDiscard::AVDISCARD_NONREF => Self::NonRef,
            AVDiscard::AVDISCARD_BIDIR => Self::Bidir,
            AVDiscard::AVDISCARD_NONINTRA => Self::NonIntra,
            AVDiscard::AVDISCARD_NONKEY => Self::NonKey,
            AVDiscard::AVDISCARD_ALL => Self::All,
            #[allow(unreachable_patterns)]
            _ => Self::Default,
        }
    }
}

impl From<Discard> for AVDiscard {
    fn from(value: Discard) -> Self {
        match value {
            Discard::None => AVDiscard::AVDISCARD_NONE,
            Discard::Default => AVDiscard::AVDISCARD_DEFAULT,
            Discard::NonRef => AVDiscard::AVDISCARD_NONREF,
            Discard::Bidir => AVDiscard::AVDISCARD_BIDIR,
            Discard::NonIntra => AVDiscard::AVDISCARD_NONINTRA,
            Discard::NonKey => AVDiscard::AVDISCARD_NONKEY,
            Discard::All => AVDiscard::AVDISCARD_ALL,
        }
    }
}

/// Owned copy of a stream's fields.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamInfo {
    pub index: i32,
    pub id: i32,
    pub medium: String,
    pub codec: String,
    pub time_base: Rational,
    pub avg_frame_rate: Rational,
    pub r_frame_rate: Rational,
    pub sample_aspect_ratio: Rational,
    pub start_time: i64,
    pub duration: i64,
    pub nb_frames: i64,
    pub discard: Discard,
    pub disposition: i32,
    pub width: i32,
    pub height: i32,
    pub sample_rate: i32,
    pub channels: i32,
    pub metadata: BTreeMap<String, String>,
}

fn medium_name(medium: ffmpeg::media::Type) -> &'static str {
    match medium {
        ffmpeg::media::Type::Video => "video",
        ffmpeg::media::Type::Audio => "audio",
        ffmpeg::media::Type::Subtitle => "subtitle",
        ffmpeg::media::Type::Data => "data",
        ffmpeg::media::Type::Attachment => "attachment",
        ffmpeg::media::Type::Unknown => "unknown",
    }
}

/// Read-only view of an `AVStream`.
#[derive(Clone, Copy)]
pub struct StreamRef<'a> {
    ptr: *const AVStream,
    _marker: PhantomData<&'a AVStream>,
}

impl<'a> StreamRef<'a> {
    /// # Safety
    /// `ptr` must be non-null and valid for `'a`.
    pub unsafe fn from_raw(ptr: *const AVStream) -> Self {
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    fn raw(&self) -> &'a AVStream {
        unsafe { &*self.ptr }
    }

    pub fn as_ptr(&self) -> *const AVStream {
        self.ptr
    }

    /// Position in the owning context's stream list.
    pub fn index(&self) -> i32 {
        self.raw().index
    }

    /// Format-specific stream id.
    pub fn id(&self) -> i32 {
        self.raw().id
    }

    pub fn codec_parameters(&self) -> CodecParametersRef<'a> {
        unsafe { CodecParametersRef::from_raw(self.raw().codecpar) }
    }

    pub fn metadata(&self) -> DictionaryRef<'a> {
        unsafe { DictionaryRef::from_raw(self.raw().metadata) }
    }

    /// Cover art packet; empty unless the disposition has `ATTACHED_PIC`.
    pub fn attached_pic(&self) -> PacketRef<'a> {
        unsafe { PacketRef::from_raw(&self.raw().attached_pic) }
    }

    pub fn avg_frame_rate(&self) -> Rational {
        self.raw().avg_frame_rate.into()
    }

    /// Lowest frame rate that can represent every timestamp exactly.
    pub fn r_frame_rate(&self) -> Rational {
        self.raw().r_frame_rate.into()
    }

    pub fn sample_aspect_ratio(&self) -> Rational {
        self.raw().sample_aspect_ratio.into()
    }

    pub fn time_base(&self) -> Rational {
        self.raw().time_base.into()
    }

    pub fn discard(&self) -> Discard {
        self.raw().discard.into()
    }

    pub fn disposition(&self) -> Disposition {
        Disposition::from_bits_truncate(self.raw().disposition)
    }

    pub fn event_flags(&self) -> i32 {
        self.raw().event_flags
    }

    /// Side data entries, which now live on the codec parameters.
    pub fn nb_side_data(&self) -> usize {
        self.codec_parameters().nb_coded_side_data()
    }

    /// Duration in `time_base` units.
    pub fn duration(&self) -> i64 {
        self.raw().duration
    }

    pub fn nb_frames(&self) -> i64 {
        self.raw().nb_frames
    }

    pub fn start_time(&self) -> i64 {
        self.raw().start_time
    }

    pub fn info(&self) -> StreamInfo {
        let par = self.codec_parameters();
        StreamInfo {
            index: self.index(),
            id: self.id(),
            medium: medium_name(par.medium()).to_string(),
            codec: par.id().name().to_string(),
            time_base: self.time_base(),
            avg_frame_rate: self.avg_frame_rate(),
            r_frame_rate: self.r_frame_rate(),
            sample_aspect_ratio: self.sample_aspect_ratio(),
            start_time: self.start_time(),
            duration: self.duration(),
            nb_frames: self.nb_frames(),
            discard: self.discard(),
            disposition: self.raw().disposition,
            width: par.width(),
            height: par.height(),
            sample_rate: par.sample_rate(),
            channels: par.channels(),
            metadata: self.metadata().to_map(),
        }
    }
}

impl std::fmt::Debug for StreamRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamRef")
            .field("index", &self.index())
            .field("id", &self.id())
            .field("time_base", &self.time_base())
            .field("codec_parameters", &self.codec_parameters())
            .finish()
    }
}

/// Mutable view of an `AVStream`, used when building an output context.
pub struct StreamMut<'a> {
    ptr: *mut AVStream,
    _marker: PhantomData<&'a mut AVStream>,
}

impl StreamMut<'_> {
    /// # Safety
    /// `ptr` must be non-null, valid and not aliased for the view's lifetime.
    pub unsafe fn from_raw(ptr: *mut AVStream) -> Self {
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    fn raw(&mut self) -> &mut AVStream {
        unsafe { &mut *self.ptr }
    }

    pub fn view(&self) -> StreamRef<'_> {
        unsafe { StreamRef::from_raw(self.ptr) }
    }

    pub fn set_id(&mut self, id: i32) {
        self.raw().id = id;
    }

    pub fn set_time_base(&mut self, time_base: Rational) {
        self.raw().time_base = time_base.into();
    }

    pub fn set_avg_frame_rate(&mut self, rate: Rational) {
        self.raw().avg_frame_rate = rate.into();
    }

    pub fn set_r_frame_rate(&mut self, rate: Rational) {
        self.raw().r_frame_rate = rate.into();
    }

    pub fn set_sample_aspect_ratio(&mut self, ratio: Rational) {
        self.raw().sample_aspect_ratio = ratio.into();
    }

    pub fn set_discard(&mut self, discard: Discard) {
        self.raw().discard = discard.into();
    }

    pub fn set_disposition(&mut self, disposition: Disposition) {
        self.raw().disposition = disposition.bits();
    }

    pub fn set_duration(&mut self, duration: i64) {
        self.raw().duration = duration;
    }

    pub fn set_nb_frames(&mut self, nb_frames: i64) {
        self.raw().nb_frames = nb_frames;
    }

    pub fn set_start_time(&mut self, start_time: i64) {
        self.raw().start_time = start_time;
    }

    pub fn metadata_mut(&mut self) -> DictionaryMut<'_> {
        unsafe { DictionaryMut::from_raw(&mut self.raw().metadata) }
    }

    pub fn codec_parameters_mut(&mut self) -> CodecParametersMut<'_> {
        unsafe { CodecParametersMut::from_raw(self.raw().codecpar) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FormatContext;

    #[test]
    fn test_discard_round_trip() {
        for d in [
            Discard::None,
            Discard::Default,
            Discard::NonRef,
            Discard::Bidir,
            Discard::NonIntra,
            Discard::NonKey,
            Discard::All,
        ] {
            assert_eq!(Discard::from(AVDiscard::from(d)), d);
        }
        assert_eq!(Discard::default(), Discard::Default);
    }

    #[test]
    fn test_new_stream_defaults() {
        let mut ctx = FormatContext::alloc().unwrap();
        let stream = ctx.new_stream().unwrap();
        let view = stream.view();

        assert_eq!(view.index(), 0);
        assert_eq!(view.discard(), Discard::Default);
        assert!(view.disposition().is_empty());
        assert!(view.metadata().is_empty());
        assert!(view.attached_pic().is_empty());
        assert_eq!(view.nb_side_data(), 0);
        assert_eq!(view.codec_parameters().medium(), ffmpeg::media::Type::Unknown);
    }

    #[test]
    fn test_setters_read_back() {
        let mut ctx = FormatContext::alloc().unwrap();
        let mut stream = ctx.new_stream().unwrap();

        stream.set_id(0x1011);
        stream.set_time_base(Rational::new(1, 90_000));
        stream.set_avg_frame_rate(Rational::new(24_000, 1001));
        stream.set_r_frame_rate(Rational::new(24, 1));
        stream.set_sample_aspect_ratio(Rational::new(1, 1));
        stream.set_discard(Discard::NonKey);
        stream.set_disposition(Disposition::DEFAULT | Disposition::FORCED);
        stream.set_duration(900_000);
        stream.set_nb_frames(240);
        stream.set_start_time(3003);
        stream.metadata_mut().set("language", "eng").unwrap();

        let view = stream.view();
        assert_eq!(view.id(), 0x1011);
        assert_eq!(view.time_base(), Rational::new(1, 90_000));
        assert_eq!(view.avg_frame_rate(), Rational::new(24_000, 1001));
        assert_eq!(view.r_frame_rate(), Rational::new(24, 1));
        assert_eq!(view.sample_aspect_ratio(), Rational::new(1, 1));
        assert_eq!(view.discard(), Discard::NonKey);
        assert!(view.disposition().contains(Disposition::FORCED));
        assert_eq!(view.duration(), 900_000);
        assert_eq!(view.nb_frames(), 240);
        assert_eq!(view.start_time(), 3003);
        assert_eq!(view.metadata().get("language"), Some("eng"));
    }

    #[test]
    fn test_codec_parameters_setters() {
        let mut ctx = FormatContext::alloc().unwrap();
        let mut stream = ctx.new_stream().unwrap();
        {
            let mut par = stream.codec_parameters_mut();
            par.set_medium(ffmpeg::media::Type::Video);
            par.set_id(ffmpeg::codec::Id::H264);
            par.set_width(1920);
            par.set_height(1080);
            par.set_bit_rate(8_000_000);
            par.set_profile(100);
            par.set_level(41);
        }

        let par = stream.view().codec_parameters();
        assert_eq!(par.medium(), ffmpeg::media::Type::Video);
        assert_eq!(par.id(), ffmpeg::codec::Id::H264);
        assert_eq!((par.width(), par.height()), (1920, 1080));
        assert_eq!(par.bit_rate(), 8_000_000);
        assert_eq!(par.profile(), 100);
        assert_eq!(par.level(), 41);
        assert!(par.extradata().is_empty());
    }

    #[test]
    fn test_audio_parameters() {
        let mut ctx = FormatContext::alloc().unwrap();
        let mut stream = ctx.new_stream().unwrap();
        {
            let mut par = stream.codec_parameters_mut();
            par.set_medium(ffmpeg::media::Type::Audio);
            par.set_sample_rate(48_000);
            par.set_channels(6);
            par.set_frame_size(1024);
        }
        let par = stream.view().codec_parameters();
        assert_eq!(par.sample_rate(), 48_000);
        assert_eq!(par.channels(), 6);
        assert_eq!(par.frame_size(), 1024);

        stream
            .codec_parameters_mut()
            .set_channel_layout(ffmpeg::ffi::AV_CH_LAYOUT_STEREO)
            .unwrap();
        assert_eq!(stream.view().codec_parameters().channels(), 2);
    }

    #[test]
    fn test_info_snapshot() {
        let mut ctx = FormatContext::alloc().unwrap();
        let mut stream = ctx.new_stream().unwrap();
        stream.set_time_base(Rational::new(1, 1000));
        stream.metadata_mut().set("title", "Main").unwrap();
        stream
            .codec_parameters_mut()
            .set_medium(ffmpeg::media::Type::Subtitle);

        let info = stream.view().info();
        assert_eq!(info.index, 0);
        assert_eq!(info.medium, "subtitle");
        assert_eq!(info.time_base, Rational::new(1, 1000));
        assert_eq!(info.metadata.get("title").map(String::as_str), Some("Main"));
    }
}
