// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Owned pixel memory obtained from the native library.
//!
//! A [`NativeBuffer`] is tagged with the allocator that produced it, so the matching
//! native release routine is chosen at compile time. Memory is released exactly
//! once: explicitly through [`NativeBuffer::release`] or when the buffer is dropped.
//! Both paths go through the same guarded dispose step.

use std::fmt;
use std::marker::PhantomData;
use std::os::raw::c_void;
use std::ptr;
use std::sync::Arc;

use crate::errors::{NativeError, NativeResult};
use crate::native::api::NativeApi;
use crate::native::NativeLibrary;
use crate::observability::messages::native::BufferDoubleRelease;
use crate::observability::messages::StructuredLog;

mod sealed {
    pub trait Sealed {}
}

/// The native allocator a buffer came from.
pub trait Allocator: sealed::Sealed {
    const NAME: &'static str;

    /// Hand `data` back to the routine that owns it.
    ///
    /// # Safety
    /// `data` must be non-null, come from this allocator of `api`'s library and not
    /// have been released yet.
    unsafe fn release(api: &NativeApi, data: *mut u8);
}

/// Memory returned by the native image decoder; released with its image free routine.
#[derive(Debug)]
pub enum DecoderAlloc {}

/// Memory requested directly from the native heap; released with the generic free.
#[derive(Debug)]
pub enum HeapAlloc {}

impl sealed::Sealed for DecoderAlloc {}
impl sealed::Sealed for HeapAlloc {}

impl Allocator for DecoderAlloc {
    const NAME: &'static str = "decoder";

    unsafe fn release(api: &NativeApi, data: *mut u8) {
        (api.image_free)(data as *mut c_void);
    }
}

impl Allocator for HeapAlloc {
    const NAME: &'static str = "heap";

    unsafe fn release(api: &NativeApi, data: *mut u8) {
        (api.free)(data as *mut c_void);
    }
}

/// A decoded or allocated image in native memory.
///
/// `len() == width * height * channels`. Channel layouts: 1 gray, 2 gray+alpha,
/// 3 RGB, 4 RGBA.
pub struct NativeBuffer<A: Allocator> {
    library: Arc<NativeLibrary>,
    data: *mut u8,
    width: u32,
    height: u32,
    channels: u32,
    disposed: bool,
    _allocator: PhantomData<fn() -> A>,
}

// The buffer is the sole owner of `data`; moving it to another thread moves that
// ownership with it. It is deliberately not `Sync`.
unsafe impl<A: Allocator> Send for NativeBuffer<A> {}

pub type DecodedImage = NativeBuffer<DecoderAlloc>;
pub type HeapImage = NativeBuffer<HeapAlloc>;

impl<A: Allocator> NativeBuffer<A> {
    /// Take ownership of native memory.
    ///
    /// # Safety
    /// `data` must be null or point to `width * height * channels` bytes obtained
    /// from allocator `A` of `library` that nobody else will release.
    pub(crate) unsafe fn from_raw(
        library: Arc<NativeLibrary>,
        data: *mut u8,
        width: u32,
        height: u32,
        channels: u32,
    ) -> Self {
        Self {
            library,
            data,
            width,
            height,
            channels,
            disposed: false,
            _allocator: PhantomData,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row size in bytes.
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    pub fn is_null(&self) -> bool {
        self.data.is_null()
    }

    pub fn is_released(&self) -> bool {
        self.disposed
    }

    pub fn allocator(&self) -> &'static str {
        A::NAME
    }

    pub fn library(&self) -> &Arc<NativeLibrary> {
        &self.library
    }

    pub fn as_slice(&self) -> NativeResult<&[u8]> {
        if self.disposed {
            return Err(NativeError::Released);
        }
        if self.data.is_null() {
            return Ok(&[]);
        }
        // SAFETY: `data` is live and owns `len()` bytes per the `from_raw` contract.
        Ok(unsafe { std::slice::from_raw_parts(self.data, self.len()) })
    }

    pub fn as_mut_slice(&mut self) -> NativeResult<&mut [u8]> {
        if self.disposed {
            return Err(NativeError::Released);
        }
        if self.data.is_null() {
            return Ok(&mut []);
        }
        // SAFETY: as above, and `&mut self` guarantees exclusive access.
        Ok(unsafe { std::slice::from_raw_parts_mut(self.data, self.len()) })
    }

    /// Release the native memory now.
    ///
    /// A second call does not reach the native free routine; it fails with
    /// [`NativeError::AlreadyReleased`]. Releasing a null buffer succeeds without a
    /// native call.
    pub fn release(&mut self) -> NativeResult<()> {
        if self.disposed {
            BufferDoubleRelease {
                allocator: A::NAME,
                width: self.width,
                height: self.height,
                channels: self.channels,
            }
            .log();
            return Err(NativeError::AlreadyReleased);
        }
        self.dispose();
        Ok(())
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        let data = std::mem::replace(&mut self.data, ptr::null_mut());
        if !data.is_null() {
            // SAFETY: `data` came from allocator `A` of this library and the
            // disposed flag guarantees this is the only release.
            unsafe { A::release(self.library.api(), data) };
        }
    }
}

impl<A: Allocator> Drop for NativeBuffer<A> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<A: Allocator> fmt::Debug for NativeBuffer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeBuffer")
            .field("allocator", &A::NAME)
            .field("library", &self.library.name())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .field("released", &self.disposed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::testing::{counting_library, Counters};

    #[test]
    fn test_double_release_frees_once() {
        let library = counting_library();
        let mut buffer = library.allocate(2, 2, 4).unwrap();

        assert!(buffer.release().is_ok());
        assert!(matches!(buffer.release(), Err(NativeError::AlreadyReleased)));
        drop(buffer);

        assert_eq!(Counters::heap_frees(), 1);
        assert_eq!(Counters::image_frees(), 0);
    }

    #[test]
    fn test_drop_releases_once() {
        let library = counting_library();
        {
            let _buffer = library.allocate(4, 4, 1).unwrap();
        }
        assert_eq!(Counters::heap_frees(), 1);
    }

    #[test]
    fn test_null_buffer_release_is_noop() {
        let library = counting_library();
        let mut buffer = library.allocate(0, 0, 4).unwrap();

        assert!(buffer.is_null());
        assert!(buffer.release().is_ok());
        drop(buffer);
        assert_eq!(Counters::heap_frees(), 0);
    }

    #[test]
    fn test_decoded_buffer_uses_decoder_free() {
        let library = counting_library();
        let path = crate::native::testing::existing_file();
        let buffer = library.decode(path.path()).unwrap();
        drop(buffer);

        assert_eq!(Counters::image_frees(), 1);
        assert_eq!(Counters::heap_frees(), 0);
    }

    #[test]
    fn test_access_after_release_fails() {
        let library = counting_library();
        let mut buffer = library.allocate(1, 1, 3).unwrap();
        buffer.as_mut_slice().unwrap().copy_from_slice(&[1, 2, 3]);
        assert_eq!(buffer.as_slice().unwrap(), &[1, 2, 3]);

        buffer.release().unwrap();
        assert!(matches!(buffer.as_slice(), Err(NativeError::Released)));
        assert!(matches!(buffer.as_mut_slice(), Err(NativeError::Released)));
    }
}
