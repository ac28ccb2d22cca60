//! Pixel format descriptors and chroma subsampling.

use std::ffi::CStr;

use ffmpeg_the_third::ffi::{
    av_pix_fmt_count_planes, av_pix_fmt_desc_get, AVPixFmtDescriptor, AVPixelFormat,
    AV_PIX_FMT_FLAG_PAL, AV_PIX_FMT_FLAG_PLANAR, AV_PIX_FMT_FLAG_RGB,
};
use ffmpeg_the_third::format::Pixel;

/// Convert a raw `format` tag into a pixel format.
///
/// Returns `None` for negative tags (unset) and tags outside the range the
/// linked libavutil knows about.
pub fn pixel_from_raw(raw: i32) -> Option<Pixel> {
    if raw < 0 || raw >= AVPixelFormat::AV_PIX_FMT_NB as i32 {
        return None;
    }
    // SAFETY: range-checked against AV_PIX_FMT_NB; the enum is dense below it.
    let native: AVPixelFormat = unsafe { std::mem::transmute(raw) };
    Some(Pixel::from(native))
}

/// Chroma subsampling ratios for planar YUV layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum ChromaSubsampling {
    /// Full-resolution chroma.
    Yuv444,
    /// Half width.
    Yuv422,
    /// Half width, half height.
    Yuv420,
    /// Half height.
    Yuv440,
    /// Quarter width.
    Yuv411,
    /// Quarter width, half height.
    Yuv410,
}

impl ChromaSubsampling {
    /// Map descriptor shifts (`log2_chroma_w`, `log2_chroma_h`) to a ratio.
    pub const fn from_log2(w: u8, h: u8) -> Option<Self> {
        match (w, h) {
            (0, 0) => Some(Self::Yuv444),
            (1, 0) => Some(Self::Yuv422),
            (1, 1) => Some(Self::Yuv420),
            (0, 1) => Some(Self::Yuv440),
            (2, 0) => Some(Self::Yuv411),
            (2, 1) => Some(Self::Yuv410),
            _ => None,
        }
    }

    pub const fn log2(self) -> (u8, u8) {
        match self {
            Self::Yuv444 => (0, 0),
            Self::Yuv422 => (1, 0),
            Self::Yuv420 => (1, 1),
            Self::Yuv440 => (0, 1),
            Self::Yuv411 => (2, 0),
            Self::Yuv410 => (2, 1),
        }
    }

    /// Chroma plane dimensions for a luma size, rounding up odd edges.
    pub const fn chroma_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        let (w, h) = self.log2();
        (ceil_rshift(width, w), ceil_rshift(height, h))
    }
}

const fn ceil_rshift(value: u32, shift: u8) -> u32 {
    value.div_ceil(1 << shift)
}

/// View of libavutil's static descriptor for one pixel format.
#[derive(Clone, Copy)]
pub struct PixelDescriptor {
    format: Pixel,
    desc: &'static AVPixFmtDescriptor,
}

impl PixelDescriptor {
    /// Look up the descriptor; `None` for `Pixel::None` and unknown formats.
    pub fn of(format: Pixel) -> Option<Self> {
        let ptr = unsafe { av_pix_fmt_desc_get(format.into()) };
        // Descriptors live in a static table inside libavutil.
        unsafe { ptr.as_ref() }.map(|desc| Self { format, desc })
    }

    pub fn format(&self) -> Pixel {
        self.format
    }

    pub fn name(&self) -> &'static str {
        unsafe { CStr::from_ptr(self.desc.name) }
            .to_str()
            .unwrap_or("unknown")
    }

    /// Number of data planes (`av_pix_fmt_count_planes`).
    pub fn plane_count(&self) -> usize {
        let n = unsafe { av_pix_fmt_count_planes(self.format.into()) };
        n.max(0) as usize
    }

    pub fn component_count(&self) -> u8 {
        self.desc.nb_components
    }

    pub fn log2_chroma_w(&self) -> u8 {
        self.desc.log2_chroma_w
    }

    pub fn log2_chroma_h(&self) -> u8 {
        self.desc.log2_chroma_h
    }

    pub fn is_planar(&self) -> bool {
        self.has_flag(AV_PIX_FMT_FLAG_PLANAR as u64)
    }

    pub fn has_palette(&self) -> bool {
        self.has_flag(AV_PIX_FMT_FLAG_PAL as u64)
    }

    pub fn is_rgb(&self) -> bool {
        self.has_flag(AV_PIX_FMT_FLAG_RGB as u64)
    }

    /// Bit depth of the first component.
    pub fn depth(&self) -> u32 {
        self.desc.comp[0].depth as u32
    }

    /// Subsampling of a three-plane YUV layout; `None` for RGB and packed formats.
    pub fn subsampling(&self) -> Option<ChromaSubsampling> {
        // Semi-planar layouts (NV12 and friends) interleave Cb and Cr in one plane.
        if self.is_rgb()
            || !self.is_planar()
            || self.component_count() < 3
            || self.plane_count() < 3
        {
            return None;
        }
        ChromaSubsampling::from_log2(self.log2_chroma_w(), self.log2_chroma_h())
    }

    /// Rows stored in `plane` for a picture of `height` rows.
    pub fn plane_height(&self, plane: usize, height: u32) -> u32 {
        // Chroma planes are the middle ones; alpha keeps full height.
        if plane == 1 || plane == 2 {
            ceil_rshift(height, self.log2_chroma_h())
        } else {
            height
        }
    }

    fn has_flag(&self, flag: u64) -> bool {
        self.desc.flags & flag != 0
    }
}

impl std::fmt::Debug for PixelDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelDescriptor")
            .field("name", &self.name())
            .field("planes", &self.plane_count())
            .field("log2_chroma_w", &self.log2_chroma_w())
            .field("log2_chroma_h", &self.log2_chroma_h())
            .finish()
    }
}
