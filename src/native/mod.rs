// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Native image library boundary.
//!
//! * [`NativeLibrary`] - resolved entry points of a shared library, or the builtin backend
//! * [`NativeBuffer`] - pixel memory tagged with the allocator that must release it
//!
//! Decoded images and heap allocations are distinct types ([`DecodedImage`] and
//! [`HeapImage`]), so a buffer can never be handed to the wrong free routine.

pub mod api;
mod buffer;
mod builtin;
mod library;

pub use api::{NativeApi, NativeSymbols, DECODE_CHANNELS};
pub use buffer::{Allocator, DecodedImage, DecoderAlloc, HeapAlloc, HeapImage, NativeBuffer};
pub use library::NativeLibrary;

use std::path::Path;
use std::sync::Arc;

use crate::errors::NativeResult;

/// Open the library named in configuration, or fall back to the builtin backend.
pub fn open(library: Option<&Path>, symbols: &NativeSymbols) -> NativeResult<Arc<NativeLibrary>> {
    match library {
        Some(path) => NativeLibrary::load(path, symbols),
        None => Ok(NativeLibrary::builtin()),
    }
}
