// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Message types follow a struct-based pattern with `Display` plus [`StructuredLog`]
//! so that log text lives in one place instead of being scattered through the
//! pipeline as string literals.
//!
//! # Architecture
//!
//! * `messages::build` - build run lifecycle and worker events
//! * `messages::item` - per-item stage execution and item diagnostics
//! * `messages::native` - native library loading and buffer ownership events
//! * `messages::params` - parameter file parsing warnings
//! * `logger` - the build-wide sink that item diagnostics are routed to
//!
//! # Usage
//!
//! ```rust
//! use asset_mill::observability::messages::item::ItemStarted;
//! use asset_mill::observability::messages::StructuredLog;
//!
//! let msg = ItemStarted {
//!     item_name: "textures.ui.button",
//!     batch_index: 0,
//!     content_type: "texture",
//!     worker_id: 1,
//! };
//!
//! msg.log();
//! ```

pub mod logger;
pub mod messages;

pub use logger::{BuildLogger, LogRecord, MemoryLogger, Severity, TracingLogger};
