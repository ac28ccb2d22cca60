//! Views over native `AVDictionary` metadata stores.
//!
//! The dictionary stays in native memory; only [`DictionaryRef::to_map`]
//! makes a host copy.

use std::collections::BTreeMap;
use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::ptr;

use ffmpeg_the_third::ffi::{
    av_dict_count, av_dict_get, av_dict_set, AVDictionary, AVDictionaryEntry,
    AV_DICT_IGNORE_SUFFIX, AV_DICT_MATCH_CASE,
};

use crate::error::{check, Result};

/// Read-only view of a dictionary owned by some native record.
///
/// A null dictionary behaves as an empty one.
#[derive(Clone, Copy)]
pub struct DictionaryRef<'a> {
    ptr: *const AVDictionary,
    _marker: PhantomData<&'a AVDictionary>,
}

impl<'a> DictionaryRef<'a> {
    /// Wrap a raw dictionary pointer.
    ///
    /// # Safety
    /// `ptr` must be null or point to a live dictionary that outlives `'a`
    /// and is not mutated while the view exists.
    pub unsafe fn from_raw(ptr: *const AVDictionary) -> Self {
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    pub fn as_ptr(&self) -> *const AVDictionary {
        self.ptr
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        if self.ptr.is_null() {
            return 0;
        }
        unsafe { av_dict_count(self.ptr) as usize }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a value by exact, case-sensitive key.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        if self.ptr.is_null() {
            return None;
        }
        let key = CString::new(key).ok()?;
        let entry =
            unsafe { av_dict_get(self.ptr, key.as_ptr(), ptr::null(), AV_DICT_MATCH_CASE as i32) };
        if entry.is_null() {
            return None;
        }
        unsafe { CStr::from_ptr((*entry).value) }.to_str().ok()
    }

    /// Iterate entries in insertion order. Entries that are not UTF-8 are skipped.
    pub fn iter(&self) -> Iter<'a> {
        Iter {
            ptr: self.ptr,
            prev: ptr::null(),
            _marker: PhantomData,
        }
    }

    /// Copy all entries into a host-side map.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

impl std::fmt::Debug for DictionaryRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for DictionaryRef<'a> {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over dictionary entries.
pub struct Iter<'a> {
    ptr: *const AVDictionary,
    prev: *const AVDictionaryEntry,
    _marker: PhantomData<&'a AVDictionary>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.ptr.is_null() {
            return None;
        }
        loop {
            let entry = unsafe {
                av_dict_get(
                    self.ptr,
                    c"".as_ptr(),
                    self.prev,
                    AV_DICT_IGNORE_SUFFIX as i32,
                )
            };
            if entry.is_null() {
                return None;
            }
            self.prev = entry;

            let (key, value) =
                unsafe { (CStr::from_ptr((*entry).key), CStr::from_ptr((*entry).value)) };
            if let (Ok(key), Ok(value)) = (key.to_str(), value.to_str()) {
                return Some((key, value));
            }
        }
    }
}

/// Mutable view over the dictionary slot of a native record.
///
/// `av_dict_set` may reallocate the dictionary, so this view holds the
/// address of the record's pointer field rather than the dictionary itself.
pub struct DictionaryMut<'a> {
    slot: *mut *mut AVDictionary,
    _marker: PhantomData<&'a mut AVDictionary>,
}

impl<'a> DictionaryMut<'a> {
    /// Wrap the address of a record's dictionary field.
    ///
    /// # Safety
    /// `slot` must point to a dictionary field owned by a live record that
    /// outlives `'a`, with no other outstanding views.
    pub unsafe fn from_raw(slot: *mut *mut AVDictionary) -> Self {
        Self {
            slot,
            _marker: PhantomData,
        }
    }

    /// Insert or overwrite an entry.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let key = CString::new(key)?;
        let value = CString::new(value)?;
        check("av_dict_set", unsafe {
            av_dict_set(self.slot, key.as_ptr(), value.as_ptr(), 0)
        })?;
        Ok(())
    }

    /// Remove an entry if present.
    pub fn remove(&mut self, key: &str) -> Result<()> {
        let key = CString::new(key)?;
        check("av_dict_set", unsafe {
            av_dict_set(self.slot, key.as_ptr(), ptr::null(), AV_DICT_MATCH_CASE as i32)
        })?;
        Ok(())
    }

    pub fn view(&self) -> DictionaryRef<'_> {
        unsafe { DictionaryRef::from_raw(*self.slot) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg_the_third::ffi::av_dict_free;

    struct Owned(*mut AVDictionary);

    impl Drop for Owned {
        fn drop(&mut self) {
            unsafe { av_dict_free(&mut self.0) }
        }
    }

    #[test]
    fn test_null_dictionary_is_empty() {
        let dict = unsafe { DictionaryRef::from_raw(ptr::null()) };
        assert!(dict.is_empty());
        assert_eq!(dict.get("title"), None);
        assert_eq!(dict.iter().count(), 0);
    }

    #[test]
    fn test_set_get_remove() {
        let mut owned = Owned(ptr::null_mut());
        let mut dict = unsafe { DictionaryMut::from_raw(&mut owned.0) };

        dict.set("language", "eng").unwrap();
        dict.set("title", "Commentary").unwrap();
        dict.set("title", "Director").unwrap();

        assert_eq!(dict.view().len(), 2);
        assert_eq!(dict.view().get("title"), Some("Director"));
        assert_eq!(dict.view().get("TITLE"), None);

        dict.remove("language").unwrap();
        assert_eq!(dict.view().get("language"), None);
        assert_eq!(dict.view().len(), 1);
    }

    #[test]
    fn test_iter_in_insertion_order() {
        let mut owned = Owned(ptr::null_mut());
        let mut dict = unsafe { DictionaryMut::from_raw(&mut owned.0) };
        dict.set("b", "2").unwrap();
        dict.set("a", "1").unwrap();

        let entries: Vec<_> = dict.view().iter().collect();
        assert_eq!(entries, vec![("b", "2"), ("a", "1")]);

        let map = dict.view().to_map();
        assert_eq!(map.get("a").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_interior_nul_is_rejected() {
        let mut owned = Owned(ptr::null_mut());
        let mut dict = unsafe { DictionaryMut::from_raw(&mut owned.0) };
        assert!(dict.set("bad\0key", "v").is_err());
    }
}
