// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the native image library boundary.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Native library is ready for use.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use asset_mill::observability::messages::native::LibraryLoaded;
///
/// let msg = LibraryLoaded {
///     library: "libstb_image.so",
///     builtin: false,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct LibraryLoaded<'a> {
    pub library: &'a str,
    pub builtin: bool,
}

impl Display for LibraryLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.builtin {
            write!(f, "Using builtin native image backend '{}'", self.library)
        } else {
            write!(f, "Loaded native image library '{}'", self.library)
        }
    }
}

impl StructuredLog for LibraryLoaded<'_> {
    fn log(&self) {
        tracing::info!(library = self.library, builtin = self.builtin, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("native_library", span_name = name, library = self.library)
    }
}

/// Native library could not be loaded; the build cannot start.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct LibraryLoadFailed<'a> {
    pub library: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for LibraryLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Native image library '{}' is unusable: {}",
            self.library, self.error
        )
    }
}

impl StructuredLog for LibraryLoadFailed<'_> {
    fn log(&self) {
        tracing::error!(library = self.library, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("native_library", span_name = name, library = self.library)
    }
}

/// A second explicit release was requested for a native buffer.
///
/// # Log Level
/// `warn!` - Programmer error caught by the ownership guard
pub struct BufferDoubleRelease<'a> {
    pub allocator: &'a str,
    pub width: u32,
    pub height: u32,
    pub channels: u32,
}

impl Display for BufferDoubleRelease<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Ignored second release of {}x{}x{} {} buffer",
            self.width, self.height, self.channels, self.allocator
        )
    }
}

impl StructuredLog for BufferDoubleRelease<'_> {
    fn log(&self) {
        tracing::warn!(
            allocator = self.allocator,
            width = self.width,
            height = self.height,
            channels = self.channels,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("native_buffer", span_name = name, allocator = self.allocator)
    }
}
