// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! C ABI of the native image library.
//!
//! The entry points follow the stb_image / stb_image_resize conventions. Buffers
//! returned by `load` must go back through `image_free`; buffers obtained from
//! `alloc` must go back through `free`.

use serde::Deserialize;
use std::os::raw::{c_char, c_int, c_void};

/// Channel count every decoded image is expanded to (RGBA).
pub const DECODE_CHANNELS: u32 = 4;

/// `stbi_load(filename, &x, &y, &channels_in_file, desired_channels)`.
pub type LoadFn = unsafe extern "C" fn(
    filename: *const c_char,
    width: *mut c_int,
    height: *mut c_int,
    channels_in_file: *mut c_int,
    desired_channels: c_int,
) -> *mut u8;

/// `stbi_image_free(data)`.
pub type ImageFreeFn = unsafe extern "C" fn(data: *mut c_void);

/// `stbi_failure_reason()`; the string stays valid until the next decoder call on the thread.
pub type FailureReasonFn = unsafe extern "C" fn() -> *const c_char;

/// `stbir_resize_uint8(...)`, returns non-zero on success. A stride of 0 means
/// tightly packed rows.
pub type ResizeFn = unsafe extern "C" fn(
    input: *const u8,
    input_width: c_int,
    input_height: c_int,
    input_stride: c_int,
    output: *mut u8,
    output_width: c_int,
    output_height: c_int,
    output_stride: c_int,
    channels: c_int,
) -> c_int;

/// `malloc(size)`.
pub type AllocFn = unsafe extern "C" fn(size: usize) -> *mut c_void;

/// `free(ptr)`.
pub type FreeFn = unsafe extern "C" fn(ptr: *mut c_void);

/// Resolved entry points of one native image library.
#[derive(Clone, Copy)]
pub struct NativeApi {
    pub load: LoadFn,
    pub image_free: ImageFreeFn,
    pub failure_reason: FailureReasonFn,
    pub resize: ResizeFn,
    pub alloc: AllocFn,
    pub free: FreeFn,
}

/// Exported symbol names looked up when a library is loaded from disk.
///
/// # Example
/// ```yaml
/// native:
///   library: "lib/libstb_image.so"
///   symbols:
///     alloc: "stb_malloc"
///     free: "stb_free"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NativeSymbols {
    pub load: String,
    pub image_free: String,
    pub failure_reason: String,
    pub resize: String,
    pub alloc: String,
    pub free: String,
}

impl Default for NativeSymbols {
    fn default() -> Self {
        Self {
            load: "stbi_load".to_string(),
            image_free: "stbi_image_free".to_string(),
            failure_reason: "stbi_failure_reason".to_string(),
            resize: "stbir_resize_uint8".to_string(),
            alloc: "malloc".to_string(),
            free: "free".to_string(),
        }
    }
}

impl NativeSymbols {
    /// `(field, symbol)` pairs, in lookup order.
    pub fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("load", &self.load),
            ("image_free", &self.image_free),
            ("failure_reason", &self.failure_reason),
            ("resize", &self.resize),
            ("alloc", &self.alloc),
            ("free", &self.free),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_symbols_follow_stb_names() {
        let symbols = NativeSymbols::default();
        assert_eq!(symbols.load, "stbi_load");
        assert_eq!(symbols.image_free, "stbi_image_free");
        assert_eq!(symbols.free, "free");
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let symbols: NativeSymbols = serde_yaml::from_str("alloc: stb_malloc\nfree: stb_free\n").unwrap();
        assert_eq!(symbols.alloc, "stb_malloc");
        assert_eq!(symbols.free, "stb_free");
        assert_eq!(symbols.load, "stbi_load");
    }
}
