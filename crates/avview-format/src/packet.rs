//! Read-only packet view.

use std::marker::PhantomData;

use ffmpeg_the_third::ffi::{AVPacket, AV_PKT_FLAG_KEY};

/// Borrowed view of an `AVPacket` embedded in another record, such as a
/// stream's attached picture.
#[derive(Clone, Copy)]
pub struct PacketRef<'a> {
    ptr: *const AVPacket,
    _marker: PhantomData<&'a AVPacket>,
}

impl<'a> PacketRef<'a> {
    /// # Safety
    /// `ptr` must be non-null and valid for `'a`.
    pub unsafe fn from_raw(ptr: *const AVPacket) -> Self {
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    fn raw(&self) -> &'a AVPacket {
        unsafe { &*self.ptr }
    }

    pub fn as_ptr(&self) -> *const AVPacket {
        self.ptr
    }

    pub fn pts(&self) -> i64 {
        self.raw().pts
    }

    pub fn dts(&self) -> i64 {
        self.raw().dts
    }

    pub fn duration(&self) -> i64 {
        self.raw().duration
    }

    pub fn size(&self) -> usize {
        self.raw().size.max(0) as usize
    }

    pub fn stream_index(&self) -> i32 {
        self.raw().stream_index
    }

    pub fn flags(&self) -> i32 {
        self.raw().flags
    }

    pub fn is_key(&self) -> bool {
        self.flags() & AV_PKT_FLAG_KEY as i32 != 0
    }

    /// Packet payload; empty when the packet carries no data.
    pub fn data(&self) -> &'a [u8] {
        let raw = self.raw();
        if raw.data.is_null() {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(raw.data, self.size()) }
    }

    pub fn is_empty(&self) -> bool {
        self.raw().data.is_null() || self.size() == 0
    }
}

impl std::fmt::Debug for PacketRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketRef")
            .field("pts", &self.pts())
            .field("dts", &self.dts())
            .field("size", &self.size())
            .field("stream_index", &self.stream_index())
            .finish()
    }
}
