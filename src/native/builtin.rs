// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process implementation of the native image ABI.
//!
//! Decoding is done with the `image` crate and pixel memory lives on the C heap, so
//! buffers handed out here follow exactly the same ownership rules as buffers from
//! a shared library loaded at runtime.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, LumaA, Pixel, Rgb, Rgba};

use crate::native::api::NativeApi;

pub const NAME: &str = "builtin";

thread_local! {
    static FAILURE_REASON: RefCell<CString> = RefCell::new(CString::default());
}

pub fn api() -> NativeApi {
    NativeApi {
        load,
        image_free: free,
        failure_reason,
        resize,
        alloc,
        free,
    }
}

fn set_failure(reason: impl Into<String>) {
    let reason = CString::new(reason.into().replace('\0', " ")).unwrap_or_default();
    FAILURE_REASON.with(|slot| *slot.borrow_mut() = reason);
}

unsafe extern "C" fn load(
    filename: *const c_char,
    width: *mut c_int,
    height: *mut c_int,
    channels_in_file: *mut c_int,
    desired_channels: c_int,
) -> *mut u8 {
    if filename.is_null() || width.is_null() || height.is_null() {
        set_failure("null argument");
        return std::ptr::null_mut();
    }
    let path = match CStr::from_ptr(filename).to_str() {
        Ok(path) => path.to_owned(),
        Err(_) => {
            set_failure("path is not valid UTF-8");
            return std::ptr::null_mut();
        }
    };

    let decoded = catch_unwind(|| decode(&path, desired_channels));
    let (pixels, w, h, source_channels) = match decoded {
        Ok(Ok(decoded)) => decoded,
        Ok(Err(reason)) => {
            set_failure(reason);
            return std::ptr::null_mut();
        }
        Err(_) => {
            set_failure("decoder panicked");
            return std::ptr::null_mut();
        }
    };

    let (Ok(w), Ok(h)) = (c_int::try_from(w), c_int::try_from(h)) else {
        set_failure("image too large");
        return std::ptr::null_mut();
    };

    let data = libc::malloc(pixels.len().max(1)) as *mut u8;
    if data.is_null() {
        set_failure("out of memory");
        return std::ptr::null_mut();
    }
    std::ptr::copy_nonoverlapping(pixels.as_ptr(), data, pixels.len());

    *width = w;
    *height = h;
    if !channels_in_file.is_null() {
        *channels_in_file = source_channels;
    }
    data
}

fn decode(path: &str, desired_channels: c_int) -> Result<(Vec<u8>, u32, u32, c_int), String> {
    let image = image::open(path).map_err(|e| e.to_string())?;
    let source_channels = c_int::from(image.color().channel_count());
    let (width, height) = (image.width(), image.height());

    let pixels = match desired_channels {
        0 => image.into_bytes(),
        1 => image.into_luma8().into_raw(),
        2 => image.into_luma_alpha8().into_raw(),
        3 => image.into_rgb8().into_raw(),
        4 => image.into_rgba8().into_raw(),
        other => return Err(format!("unsupported channel count {}", other)),
    };
    Ok((pixels, width, height, source_channels))
}

unsafe extern "C" fn failure_reason() -> *const c_char {
    FAILURE_REASON.with(|slot| slot.borrow().as_ptr())
}

#[allow(clippy::too_many_arguments)]
unsafe extern "C" fn resize(
    input: *const u8,
    input_width: c_int,
    input_height: c_int,
    input_stride: c_int,
    output: *mut u8,
    output_width: c_int,
    output_height: c_int,
    output_stride: c_int,
    channels: c_int,
) -> c_int {
    let Some(source) = Plane::new(input_width, input_height, input_stride, channels) else {
        return 0;
    };
    let Some(target) = Plane::new(output_width, output_height, output_stride, channels) else {
        return 0;
    };
    if input.is_null() || output.is_null() {
        return 0;
    }

    let input = std::slice::from_raw_parts(input, source.span());
    let output = std::slice::from_raw_parts_mut(output, target.span());

    let resized = catch_unwind(AssertUnwindSafe(|| {
        let packed = source.pack(input);
        let (w, h) = (target.width, target.height);
        match channels {
            1 => resample::<Luma<u8>>(packed, source.width, source.height, w, h),
            2 => resample::<LumaA<u8>>(packed, source.width, source.height, w, h),
            3 => resample::<Rgb<u8>>(packed, source.width, source.height, w, h),
            4 => resample::<Rgba<u8>>(packed, source.width, source.height, w, h),
            _ => None,
        }
    }));

    match resized {
        Ok(Some(pixels)) => {
            target.unpack(&pixels, output);
            1
        }
        _ => 0,
    }
}

unsafe extern "C" fn alloc(size: usize) -> *mut c_void {
    libc::malloc(size)
}

unsafe extern "C" fn free(ptr: *mut c_void) {
    libc::free(ptr)
}

fn resample<P>(packed: Vec<u8>, width: u32, height: u32, to_width: u32, to_height: u32) -> Option<Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let image: ImageBuffer<P, Vec<u8>> = ImageBuffer::from_raw(width, height, packed)?;
    Some(imageops::resize(&image, to_width, to_height, FilterType::Triangle).into_raw())
}

/// Geometry of one side of a resize call.
struct Plane {
    width: u32,
    height: u32,
    row: usize,
    stride: usize,
}

impl Plane {
    fn new(width: c_int, height: c_int, stride: c_int, channels: c_int) -> Option<Self> {
        let width = u32::try_from(width).ok().filter(|w| *w > 0)?;
        let height = u32::try_from(height).ok().filter(|h| *h > 0)?;
        let channels = usize::try_from(channels).ok().filter(|c| (1..=4).contains(c))?;
        let row = width as usize * channels;
        let stride = match usize::try_from(stride).ok()? {
            0 => row,
            s if s >= row => s,
            _ => return None,
        };
        Some(Self {
            width,
            height,
            row,
            stride,
        })
    }

    /// Bytes covered by the plane in memory; the last row is not padded.
    fn span(&self) -> usize {
        self.stride * (self.height as usize - 1) + self.row
    }

    fn pack(&self, data: &[u8]) -> Vec<u8> {
        data.chunks(self.stride)
            .flat_map(|line| &line[..self.row])
            .copied()
            .collect()
    }

    fn unpack(&self, pixels: &[u8], out: &mut [u8]) {
        for (line, src) in out.chunks_mut(self.stride).zip(pixels.chunks(self.row)) {
            line[..self.row].copy_from_slice(src);
        }
    }
}
