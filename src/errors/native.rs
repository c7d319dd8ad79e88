// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for the native image library boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the native library or handling its buffers.
///
/// `LibraryLoad` and `MissingSymbol` are startup failures that abort the whole
/// build. The remaining variants surface while a single item is being built and are
/// wrapped into an `ItemError` by the processor that hit them.
#[derive(Error, Debug)]
pub enum NativeError {
    /// The native library itself could not be opened.
    #[error("Failed to load native library '{}': {reason}", path.display())]
    LibraryLoad { path: PathBuf, reason: String },

    /// A required entry point is not exported by the native library.
    #[error("Native library '{library}' does not export '{symbol}'")]
    MissingSymbol { library: String, symbol: String },

    /// The image to decode does not exist. The decoder is never called.
    #[error("Image file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The path cannot be handed to the native decoder (interior NUL byte).
    #[error("Image path cannot be passed to the native decoder: {}", .0.display())]
    InvalidPath(PathBuf),

    /// The native decoder reported a failure.
    #[error("Failed to decode '{}': {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    /// The native allocator returned null.
    #[error("Native allocation of {0} bytes failed")]
    AllocationFailed(usize),

    /// Requested dimensions overflow the addressable size.
    #[error("Buffer dimensions {width}x{height}x{channels} are too large")]
    DimensionsTooLarge { width: u32, height: u32, channels: u32 },

    /// An explicit release was requested for a buffer that was already released.
    #[error("Native buffer was already released")]
    AlreadyReleased,

    /// Pixel data was accessed after the buffer was released.
    #[error("Native buffer was accessed after release")]
    Released,

    /// Source and destination buffers do not share a channel layout.
    #[error("Channel count mismatch: source has {source_channels}, destination has {destination_channels}")]
    ShapeMismatch {
        source_channels: u32,
        destination_channels: u32,
    },

    /// The native resize routine reported a failure.
    #[error("Native resize from {from_width}x{from_height} to {to_width}x{to_height} failed")]
    ResizeFailed {
        from_width: u32,
        from_height: u32,
        to_width: u32,
        to_height: u32,
    },
}

pub type NativeResult<T> = Result<T, NativeError>;

impl NativeError {
    /// Whether the error makes the native layer unusable for the rest of the build.
    pub fn is_build_fatal(&self) -> bool {
        matches!(
            self,
            NativeError::LibraryLoad { .. } | NativeError::MissingSymbol { .. }
        )
    }
}
