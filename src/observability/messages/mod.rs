// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human readable line and
//! [`StructuredLog`] to emit the same event with structured fields attached.
//!
//! # Organization
//!
//! * `build` - build run lifecycle and worker events
//! * `item` - stage execution and item diagnostics
//! * `native` - native library and buffer ownership events
//! * `params` - parameter file parsing warnings

use tracing::Span;

pub mod build;
pub mod item;
pub mod native;
pub mod params;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the event at the message's level.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
