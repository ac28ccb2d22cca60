//! Typed side data attached to a frame.

use std::marker::PhantomData;

use ffmpeg_the_third::ffi::{
    av_frame_get_side_data, av_frame_new_side_data, av_frame_remove_side_data, AVFrameSideData,
};

pub use ffmpeg_the_third::ffi::AVFrameSideDataType as SideDataType;

use super::Frame;
use crate::dictionary::DictionaryRef;
use crate::error::{Error, Result};

/// Read-only side data entry owned by a frame.
#[derive(Clone, Copy)]
pub struct SideData<'a> {
    ptr: *const AVFrameSideData,
    _marker: PhantomData<&'a AVFrameSideData>,
}

impl<'a> SideData<'a> {
    pub fn kind(&self) -> SideDataType {
        unsafe { (*self.ptr).type_ }
    }

    pub fn len(&self) -> usize {
        unsafe { (*self.ptr).size }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data(&self) -> &'a [u8] {
        let data = unsafe { (*self.ptr).data };
        if data.is_null() {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(data, self.len()) }
    }

    pub fn metadata(&self) -> DictionaryRef<'a> {
        unsafe { DictionaryRef::from_raw((*self.ptr).metadata) }
    }
}

impl std::fmt::Debug for SideData<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SideData")
            .field("kind", &self.kind())
            .field("len", &self.len())
            .finish()
    }
}

/// Freshly attached side data whose payload can be filled in.
pub struct SideDataMut<'a> {
    ptr: *mut AVFrameSideData,
    _marker: PhantomData<&'a mut AVFrameSideData>,
}

impl SideDataMut<'_> {
    pub fn kind(&self) -> SideDataType {
        unsafe { (*self.ptr).type_ }
    }

    pub fn len(&self) -> usize {
        unsafe { (*self.ptr).size }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data(&self) -> &[u8] {
        let data = unsafe { (*self.ptr).data };
        if data.is_null() {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(data, self.len()) }
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        let data = unsafe { (*self.ptr).data };
        if data.is_null() {
            return &mut [];
        }
        unsafe { std::slice::from_raw_parts_mut(data, self.len()) }
    }
}

impl Frame {
    /// Attach a zero-filled side data entry of `size` bytes.
    pub fn new_side_data(&mut self, kind: SideDataType, size: usize) -> Result<SideDataMut<'_>> {
        let ptr = unsafe { av_frame_new_side_data(self.as_mut_ptr(), kind, size) };
        if ptr.is_null() {
            return Err(Error::Allocation("AVFrameSideData"));
        }
        let mut entry = SideDataMut {
            ptr,
            _marker: PhantomData,
        };
        entry.data_mut().fill(0);
        Ok(entry)
    }

    /// First side data entry of the given kind.
    pub fn side_data(&self, kind: SideDataType) -> Option<SideData<'_>> {
        let ptr = unsafe { av_frame_get_side_data(self.as_ptr(), kind) };
        if ptr.is_null() {
            None
        } else {
            Some(SideData {
                ptr,
                _marker: PhantomData,
            })
        }
    }

    /// Remove and free every side data entry of the given kind.
    pub fn remove_side_data(&mut self, kind: SideDataType) {
        unsafe { av_frame_remove_side_data(self.as_mut_ptr(), kind) }
    }

    /// All side data entries in attachment order.
    pub fn side_data_iter(&self) -> impl Iterator<Item = SideData<'_>> + '_ {
        let frame = unsafe { &*self.as_ptr() };
        let count = frame.nb_side_data.max(0) as usize;
        (0..count).filter_map(move |i| {
            let ptr = unsafe { *frame.side_data.add(i) };
            (!ptr.is_null()).then_some(SideData {
                ptr,
                _marker: PhantomData,
            })
        })
    }
}
