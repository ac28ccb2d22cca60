//! Reference-counted buffer views.

use std::marker::PhantomData;

use ffmpeg_the_third::ffi::{av_buffer_get_ref_count, av_buffer_is_writable, AVBufferRef};

/// Borrowed view of an `AVBufferRef` backing one or more frame planes.
#[derive(Clone, Copy)]
pub struct BufferRef<'a> {
    ptr: *const AVBufferRef,
    _marker: PhantomData<&'a AVBufferRef>,
}

impl<'a> BufferRef<'a> {
    /// # Safety
    /// `ptr` must be non-null and stay valid for `'a`.
    pub unsafe fn from_raw(ptr: *const AVBufferRef) -> Self {
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    pub fn as_ptr(&self) -> *const AVBufferRef {
        self.ptr
    }

    /// Size of the referenced data in bytes.
    pub fn len(&self) -> usize {
        unsafe { (*self.ptr).size as usize }
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

    /// Number of references to the underlying buffer.
    pub fn ref_count(&self) -> usize {
        unsafe { av_buffer_get_ref_count(self.ptr) as usize }
    }

    /// True when this is the only reference and the buffer is not read-only.
    pub fn is_writable(&self) -> bool {
        unsafe { av_buffer_is_writable(self.ptr) != 0 }
    }
}

impl std::fmt::Debug for BufferRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferRef")
            .field("len", &self.len())
            .field("ref_count", &self.ref_count())
            .finish()
    }
}
