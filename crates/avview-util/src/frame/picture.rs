//! Copying pictures between frames and host-side images.
//!
//! Extraction always uses the frame's real pixel width; the line size is only
//! the source stride, so row padding never leaks into the output.

use ffmpeg_the_third::format::Pixel;
use image::RgbaImage;

use super::Frame;
use crate::error::{Error, Result};
use crate::pixel::{ChromaSubsampling, PixelDescriptor};

/// Planar 8-bit Y'CbCr picture held in host memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YCbCrImage {
    pub width: u32,
    pub height: u32,
    pub subsampling: ChromaSubsampling,
    pub y: Vec<u8>,
    pub cb: Vec<u8>,
    pub cr: Vec<u8>,
    /// Bytes per luma row.
    pub y_stride: usize,
    /// Bytes per chroma row.
    pub c_stride: usize,
}

impl YCbCrImage {
    /// Zero-filled image with tightly packed rows.
    pub fn new(width: u32, height: u32, subsampling: ChromaSubsampling) -> Self {
        let (cw, ch) = subsampling.chroma_dimensions(width, height);
        let c_len = cw as usize * ch as usize;
        Self {
            width,
            height,
            subsampling,
            y: vec![0; width as usize * height as usize],
            cb: vec![0; c_len],
            cr: vec![0; c_len],
            y_stride: width as usize,
            c_stride: cw as usize,
        }
    }

    pub fn chroma_dimensions(&self) -> (u32, u32) {
        self.subsampling.chroma_dimensions(self.width, self.height)
    }

    /// Index into `y` for the sample at `(x, y)`.
    pub fn y_offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.y_stride + x as usize
    }

    /// Index into `cb`/`cr` for the chroma sample covering luma `(x, y)`.
    pub fn c_offset(&self, x: u32, y: u32) -> usize {
        let (sw, sh) = self.subsampling.log2();
        (y >> sh) as usize * self.c_stride + (x >> sw) as usize
    }

    /// `(Y, Cb, Cr)` at luma position `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let c = self.c_offset(x, y);
        Some((
            *self.y.get(self.y_offset(x, y))?,
            *self.cb.get(c)?,
            *self.cr.get(c)?,
        ))
    }

    fn check_layout(&self) -> Result<()> {
        let (cw, ch) = self.chroma_dimensions();
        let fits = |len: usize, stride: usize, w: u32, h: u32| {
            h == 0 || (stride >= w as usize && len >= stride * (h as usize - 1) + w as usize)
        };
        if !fits(self.y.len(), self.y_stride, self.width, self.height)
            || !fits(self.cb.len(), self.c_stride, cw, ch)
            || !fits(self.cr.len(), self.c_stride, cw, ch)
        {
            return Err(Error::invalid_input(format!(
                "{}x{} {:?} image buffers are too small for their strides",
                self.width, self.height, self.subsampling
            )));
        }
        Ok(())
    }
}

fn planar_format(subsampling: ChromaSubsampling) -> Pixel {
    match subsampling {
        ChromaSubsampling::Yuv444 => Pixel::YUV444P,
        ChromaSubsampling::Yuv422 => Pixel::YUV422P,
        ChromaSubsampling::Yuv420 => Pixel::YUV420P,
        ChromaSubsampling::Yuv440 => Pixel::YUV440P,
        ChromaSubsampling::Yuv411 => Pixel::YUV411P,
        ChromaSubsampling::Yuv410 => Pixel::YUV410P,
    }
}

impl Frame {
    fn dimensions(&self) -> Result<(u32, u32)> {
        match (u32::try_from(self.width()), u32::try_from(self.height())) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
            _ => Err(Error::invalid_input(format!(
                "frame has no picture ({}x{})",
                self.width(),
                self.height()
            ))),
        }
    }

    /// Copy `rows` rows of `row_bytes` from a plane into a tight buffer.
    fn copy_plane(&self, plane: usize, row_bytes: usize, rows: usize) -> Result<Vec<u8>> {
        let ptr = self.data()[plane];
        let stride = self.linesize()[plane];
        if ptr.is_null() {
            return Err(Error::invalid_input(format!("plane {plane} has no data")));
        }
        let stride = usize::try_from(stride)
            .ok()
            .filter(|s| *s >= row_bytes)
            .ok_or_else(|| {
                Error::unsupported(format!(
                    "plane {plane} stride {stride} for {row_bytes}-byte rows"
                ))
            })?;

        let mut out = Vec::with_capacity(row_bytes * rows);
        for row in 0..rows {
            let src = unsafe { std::slice::from_raw_parts(ptr.add(row * stride), row_bytes) };
            out.extend_from_slice(src);
        }
        Ok(out)
    }

    /// Copy the luma and chroma planes of a planar 8-bit YUV frame.
    pub fn picture(&self) -> Result<YCbCrImage> {
        let (width, height) = self.dimensions()?;
        let format = self
            .pixel_format()
            .ok_or_else(|| Error::unsupported(format!("pixel format {}", self.format())))?;
        let desc = PixelDescriptor::of(format)
            .ok_or_else(|| Error::unsupported(format!("{format:?} has no descriptor")))?;
        let subsampling = desc
            .subsampling()
            .ok_or_else(|| Error::unsupported(format!("{} is not planar YUV", desc.name())))?;
        if desc.depth() > 8 {
            return Err(Error::unsupported(format!(
                "{} has {}-bit samples",
                desc.name(),
                desc.depth()
            )));
        }

        let (cw, ch) = subsampling.chroma_dimensions(width, height);

        #[cfg(feature = "tracing")]
        tracing::debug!(width, height, ?subsampling, "extracting YCbCr picture");

        Ok(YCbCrImage {
            width,
            height,
            subsampling,
            y: self.copy_plane(0, width as usize, height as usize)?,
            cb: self.copy_plane(1, cw as usize, ch as usize)?,
            cr: self.copy_plane(2, cw as usize, ch as usize)?,
            y_stride: width as usize,
            c_stride: cw as usize,
        })
    }

    /// Copy a packed RGBA or BGRA frame into an [`RgbaImage`].
    pub fn picture_rgba(&self) -> Result<RgbaImage> {
        let (width, height) = self.dimensions()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(width, height, format = self.format(), "extracting RGBA picture");

        let row_bytes = width as usize * 4;
        let buf = match self.pixel_format() {
            Some(Pixel::RGBA) => self.copy_plane(0, row_bytes, height as usize)?,
            Some(Pixel::BGRA) => {
                let mut buf = self.copy_plane(0, row_bytes, height as usize)?;
                for px in buf.chunks_exact_mut(4) {
                    px.swap(0, 2);
                }
                buf
            }
            other => {
                return Err(Error::unsupported(format!(
                    "RGBA extraction from {other:?}"
                )))
            }
        };

        RgbaImage::from_raw(width, height, buf)
            .ok_or_else(|| Error::invalid_input("RGBA buffer does not match dimensions"))
    }

    /// Copy `image` into this frame's own buffers.
    ///
    /// The frame must already have matching dimensions and a planar format
    /// with the same subsampling. Shared buffers are detached first.
    pub fn set_picture(&mut self, image: &YCbCrImage) -> Result<()> {
        let (width, height) = self.dimensions()?;
        if (width, height) != (image.width, image.height) {
            return Err(Error::invalid_input(format!(
                "image is {}x{}, frame is {width}x{height}",
                image.width, image.height
            )));
        }
        let subsampling = self
            .pixel_format()
            .and_then(PixelDescriptor::of)
            .filter(|d| d.depth() <= 8)
            .and_then(|d| d.subsampling());
        if subsampling != Some(image.subsampling) {
            return Err(Error::unsupported(format!(
                "{:?} image into frame format {}",
                image.subsampling,
                self.format()
            )));
        }
        image.check_layout()?;
        self.make_writable()?;

        let (cw, ch) = image.chroma_dimensions();
        let planes = [
            (&image.y, image.y_stride, width as usize, height as usize),
            (&image.cb, image.c_stride, cw as usize, ch as usize),
            (&image.cr, image.c_stride, cw as usize, ch as usize),
        ];
        for (plane, (src, src_stride, row_bytes, rows)) in planes.into_iter().enumerate() {
            let dst_stride = self.linesize()[plane] as usize;
            let dst = self
                .plane_mut(plane)
                .ok_or_else(|| Error::invalid_input(format!("plane {plane} is not writable")))?;
            for row in 0..rows {
                let from = &src[row * src_stride..row * src_stride + row_bytes];
                dst[row * dst_stride..row * dst_stride + row_bytes].copy_from_slice(from);
            }
        }
        Ok(())
    }

    /// Allocate a frame in the planar format matching `image` and copy it in.
    pub fn from_picture(image: &YCbCrImage) -> Result<Frame> {
        let width = i32::try_from(image.width)
            .map_err(|_| Error::invalid_input("image width out of range"))?;
        let height = i32::try_from(image.height)
            .map_err(|_| Error::invalid_input("image height out of range"))?;

        let mut frame = Frame::new()?;
        frame.set_video_format(width, height, planar_format(image.subsampling))?;
        frame.set_picture(image)?;
        Ok(frame)
    }
}
