// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::ffi::{CStr, CString};
use std::os::raw::c_int;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::{Library, Symbol};

use crate::errors::{NativeError, NativeResult};
use crate::native::api::{NativeApi, NativeSymbols, DECODE_CHANNELS};
use crate::native::buffer::{Allocator, DecodedImage, HeapImage, NativeBuffer};
use crate::native::builtin;
use crate::observability::messages::native::{LibraryLoadFailed, LibraryLoaded};
use crate::observability::messages::StructuredLog;

const UNKNOWN_FAILURE: &str = "native decoder gave no failure reason";

/// A native image library with its resolved entry points.
///
/// Every buffer created through the library keeps an `Arc` to it, so the shared
/// object stays mapped until the last buffer is released.
pub struct NativeLibrary {
    name: String,
    api: NativeApi,
    builtin: bool,
    _library: Option<Library>,
}

impl NativeLibrary {
    /// Open a shared library and resolve every entry point named in `symbols`.
    ///
    /// Failure here is fatal for the whole build.
    pub fn load(path: impl AsRef<Path>, symbols: &NativeSymbols) -> NativeResult<Arc<Self>> {
        let path = path.as_ref();
        let name = path.display().to_string();

        let result = Self::open(path, &name, symbols);
        match &result {
            Ok(_) => LibraryLoaded {
                library: &name,
                builtin: false,
            }
            .log(),
            Err(error) => LibraryLoadFailed {
                library: &name,
                error,
            }
            .log(),
        }
        result
    }

    fn open(path: &Path, name: &str, symbols: &NativeSymbols) -> NativeResult<Arc<Self>> {
        // SAFETY: loading a shared library runs its initializers; the library is
        // trusted by configuration.
        let library = unsafe { Library::new(path) }.map_err(|e| NativeError::LibraryLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // SAFETY: each symbol is read with the signature the C ABI in `api` declares.
        let api = unsafe {
            NativeApi {
                load: resolve(&library, name, &symbols.load)?,
                image_free: resolve(&library, name, &symbols.image_free)?,
                failure_reason: resolve(&library, name, &symbols.failure_reason)?,
                resize: resolve(&library, name, &symbols.resize)?,
                alloc: resolve(&library, name, &symbols.alloc)?,
                free: resolve(&library, name, &symbols.free)?,
            }
        };

        Ok(Arc::new(Self {
            name: name.to_string(),
            api,
            builtin: false,
            _library: Some(library),
        }))
    }

    /// The in-process backend: `image` crate decoding and the C heap.
    pub fn builtin() -> Arc<Self> {
        LibraryLoaded {
            library: builtin::NAME,
            builtin: true,
        }
        .log();
        Arc::new(Self {
            name: builtin::NAME.to_string(),
            api: builtin::api(),
            builtin: true,
            _library: None,
        })
    }

    /// Wrap an already resolved entry point table.
    pub fn from_api(name: impl Into<String>, api: NativeApi) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            api,
            builtin: false,
            _library: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    pub(crate) fn api(&self) -> &NativeApi {
        &self.api
    }

    /// Decode an image file into an RGBA buffer owned by the decoder's allocator.
    ///
    /// A missing file fails with [`NativeError::FileNotFound`] before the native
    /// decoder is called. A decoder failure carries the decoder's own reason.
    pub fn decode(self: &Arc<Self>, path: &Path) -> NativeResult<DecodedImage> {
        if !path.is_file() {
            return Err(NativeError::FileNotFound(path.to_path_buf()));
        }
        let c_path = c_path(path)?;

        let (mut width, mut height, mut source_channels): (c_int, c_int, c_int) = (0, 0, 0);
        // SAFETY: `c_path` is a valid NUL-terminated string and the out pointers are
        // live locals.
        let data = unsafe {
            (self.api.load)(
                c_path.as_ptr(),
                &mut width,
                &mut height,
                &mut source_channels,
                DECODE_CHANNELS as c_int,
            )
        };
        if data.is_null() {
            return Err(NativeError::Decode {
                path: path.to_path_buf(),
                reason: self.failure_reason(),
            });
        }

        // SAFETY: non-null decoder output holds width * height * DECODE_CHANNELS
        // bytes owned by the decoder allocator. Owning it right away means the
        // early return below still frees it.
        let buffer = unsafe {
            NativeBuffer::from_raw(
                Arc::clone(self),
                data,
                width.max(0) as u32,
                height.max(0) as u32,
                DECODE_CHANNELS,
            )
        };
        if buffer.is_empty() {
            return Err(NativeError::Decode {
                path: path.to_path_buf(),
                reason: format!("decoder returned invalid dimensions {}x{}", width, height),
            });
        }

        tracing::debug!(
            path = %path.display(),
            width = buffer.width(),
            height = buffer.height(),
            source_channels,
            "decoded image"
        );
        Ok(buffer)
    }

    /// Allocate an uninitialized `width * height * channels` buffer on the native heap.
    ///
    /// Zero-sized requests produce a null buffer without a native call.
    pub fn allocate(self: &Arc<Self>, width: u32, height: u32, channels: u32) -> NativeResult<HeapImage> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels as usize))
            .filter(|n| c_int::try_from(*n).is_ok())
            .ok_or(NativeError::DimensionsTooLarge {
                width,
                height,
                channels,
            })?;

        let data = if len == 0 {
            std::ptr::null_mut()
        } else {
            // SAFETY: plain allocation call with a non-zero size.
            let data = unsafe { (self.api.alloc)(len) } as *mut u8;
            if data.is_null() {
                return Err(NativeError::AllocationFailed(len));
            }
            data
        };

        // SAFETY: `data` is null or `len` bytes from this library's heap allocator.
        Ok(unsafe { NativeBuffer::from_raw(Arc::clone(self), data, width, height, channels) })
    }

    /// Allocate `len` raw bytes (a `len x 1` single-channel buffer).
    pub fn allocate_bytes(self: &Arc<Self>, len: usize) -> NativeResult<HeapImage> {
        let width = u32::try_from(len).map_err(|_| NativeError::DimensionsTooLarge {
            width: u32::MAX,
            height: 1,
            channels: 1,
        })?;
        self.allocate(width, 1, 1)
    }

    /// Resample `source` into `destination` with the native resize routine.
    pub fn resize<A: Allocator, B: Allocator>(
        &self,
        source: &NativeBuffer<A>,
        destination: &mut NativeBuffer<B>,
    ) -> NativeResult<()> {
        if source.channels() != destination.channels() {
            return Err(NativeError::ShapeMismatch {
                source_channels: source.channels(),
                destination_channels: destination.channels(),
            });
        }
        let failed = || NativeError::ResizeFailed {
            from_width: source.width(),
            from_height: source.height(),
            to_width: destination.width(),
            to_height: destination.height(),
        };
        if source.is_empty() || destination.is_empty() {
            return Err(failed());
        }
        let err = failed();

        let (src_w, src_h, src_stride) = (
            to_c_int(source.width())?,
            to_c_int(source.height())?,
            to_c_int(source.stride() as u32)?,
        );
        let (dst_w, dst_h, dst_stride) = (
            to_c_int(destination.width())?,
            to_c_int(destination.height())?,
            to_c_int(destination.stride() as u32)?,
        );
        let channels = source.channels() as c_int;

        let input = source.as_slice()?;
        let output = destination.as_mut_slice()?;
        // SAFETY: both slices are live, sized by their own dimensions and strides,
        // and do not overlap because `destination` is borrowed mutably.
        let ok = unsafe {
            (self.api.resize)(
                input.as_ptr(),
                src_w,
                src_h,
                src_stride,
                output.as_mut_ptr(),
                dst_w,
                dst_h,
                dst_stride,
                channels,
            )
        };

        if ok == 0 {
            return Err(err);
        }
        Ok(())
    }

    fn failure_reason(&self) -> String {
        // SAFETY: returns null or a NUL-terminated string owned by the library.
        let reason = unsafe { (self.api.failure_reason)() };
        if reason.is_null() {
            return UNKNOWN_FAILURE.to_string();
        }
        // SAFETY: checked non-null above.
        unsafe { CStr::from_ptr(reason) }.to_string_lossy().into_owned()
    }
}

impl std::fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeLibrary")
            .field("name", &self.name)
            .field("builtin", &self.builtin)
            .finish()
    }
}

/// Read one exported function pointer.
///
/// # Safety
/// `T` must be the function pointer type the symbol was exported with.
unsafe fn resolve<T: Copy>(library: &Library, name: &str, symbol: &str) -> NativeResult<T> {
    let missing = || NativeError::MissingSymbol {
        library: name.to_string(),
        symbol: symbol.to_string(),
    };
    if symbol.is_empty() {
        return Err(missing());
    }
    let resolved: Symbol<T> = library.get(symbol.as_bytes()).map_err(|_| missing())?;
    Ok(*resolved)
}

fn c_path(path: &Path) -> NativeResult<CString> {
    let invalid = || NativeError::InvalidPath(PathBuf::from(path));
    let text = path.to_str().ok_or_else(invalid)?;
    CString::new(text).map_err(|_| invalid())
}

fn to_c_int(value: u32) -> NativeResult<c_int> {
    c_int::try_from(value).map_err(|_| NativeError::DimensionsTooLarge {
        width: value,
        height: 1,
        channels: 1,
    })
}
