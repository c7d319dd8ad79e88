// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for per-item stage execution events.
//!
//! This module contains message types for logging events related to:
//! * Item build lifecycle (start, completion, failure, skip)
//! * Diagnostics a processor emits through its item context
//! * Processor instance construction and disposal

use crate::errors::ItemError;
use crate::observability::messages::StructuredLog;
use crate::observability::Severity;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Item build started on a worker.
///
/// # Log Level
/// `debug!` - Diagnostic detail
///
/// # Example
/// ```
/// use asset_mill::observability::messages::item::ItemStarted;
///
/// let msg = ItemStarted {
///     item_name: "textures.ui.button",
///     batch_index: 3,
///     content_type: "texture",
///     worker_id: 0,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct ItemStarted<'a> {
    pub item_name: &'a str,
    pub batch_index: usize,
    pub content_type: &'a str,
    pub worker_id: usize,
}

impl Display for ItemStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Building '{}' (#{}) as {} on worker {}",
            self.item_name, self.batch_index, self.content_type, self.worker_id
        )
    }
}

impl StructuredLog for ItemStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            item = self.item_name,
            batch_index = self.batch_index,
            content_type = self.content_type,
            worker_id = self.worker_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "item",
            span_name = name,
            item = self.item_name,
            batch_index = self.batch_index,
            content_type = self.content_type,
            worker_id = self.worker_id,
        )
    }
}

/// Item built successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ItemCompleted<'a> {
    pub item_name: &'a str,
    pub batch_index: usize,
    pub loops: usize,
    pub output_bytes: usize,
    pub compress: bool,
    pub duration: Duration,
}

impl Display for ItemCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Built '{}' (#{}): {} loops, {} bytes, compress={}, duration={:?}",
            self.item_name,
            self.batch_index,
            self.loops,
            self.output_bytes,
            self.compress,
            self.duration
        )
    }
}

impl StructuredLog for ItemCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            item = self.item_name,
            batch_index = self.batch_index,
            loops = self.loops,
            output_bytes = self.output_bytes,
            compress = self.compress,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "item_completed",
            span_name = name,
            item = self.item_name,
            batch_index = self.batch_index,
        )
    }
}

/// Item failed; the build continues with other items.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ItemFailed<'a> {
    pub error: &'a ItemError,
}

impl Display for ItemFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.error)?;
        for cause in self.error.cause_chain() {
            write!(f, "\n  caused by: {}", cause)?;
        }
        Ok(())
    }
}

impl StructuredLog for ItemFailed<'_> {
    fn log(&self) {
        let item = self.error.item();
        let site = self.error.site();
        tracing::error!(
            item = item.name(),
            batch_index = item.batch_index(),
            content_type = item.content_type(),
            site_function = site.function.as_deref().unwrap_or("<unknown>"),
            site_file = &*site.file,
            site_line = site.line,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        let item = self.error.item();
        tracing::error_span!(
            "item_failed",
            span_name = name,
            item = item.name(),
            batch_index = item.batch_index(),
        )
    }
}

/// Item was not built because dispatch stopped or no processor claims it.
///
/// # Log Level
/// `warn!` - Degraded behavior
pub struct ItemSkipped<'a> {
    pub item_name: &'a str,
    pub batch_index: usize,
    pub reason: &'a str,
}

impl Display for ItemSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipped '{}' (#{}): {}",
            self.item_name, self.batch_index, self.reason
        )
    }
}

impl StructuredLog for ItemSkipped<'_> {
    fn log(&self) {
        tracing::warn!(
            item = self.item_name,
            batch_index = self.batch_index,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("item_skipped", span_name = name, item = self.item_name)
    }
}

/// A diagnostic line a processor emitted through its item context.
///
/// # Log Level
/// Follows `severity`
pub struct ItemDiagnostic<'a> {
    pub item_name: &'a str,
    pub batch_index: usize,
    pub message: &'a str,
    pub severity: Severity,
    pub important: bool,
}

impl Display for ItemDiagnostic<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.important {
            write!(f, "[{} #{}] (!) {}", self.item_name, self.batch_index, self.message)
        } else {
            write!(f, "[{} #{}] {}", self.item_name, self.batch_index, self.message)
        }
    }
}

impl StructuredLog for ItemDiagnostic<'_> {
    fn log(&self) {
        match self.severity {
            Severity::Info => tracing::info!(
                item = self.item_name,
                batch_index = self.batch_index,
                important = self.important,
                "{}", self
            ),
            Severity::Warn => tracing::warn!(
                item = self.item_name,
                batch_index = self.batch_index,
                important = self.important,
                "{}", self
            ),
            Severity::Error => tracing::error!(
                item = self.item_name,
                batch_index = self.batch_index,
                important = self.important,
                "{}", self
            ),
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "item_diagnostic",
            span_name = name,
            item = self.item_name,
            batch_index = self.batch_index,
        )
    }
}

/// A pooled processor instance was created for a worker.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct ProcessorInstantiated<'a> {
    pub content_type: &'a str,
    pub display_name: &'a str,
    pub worker_id: usize,
}

impl Display for ProcessorInstantiated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Created {} processor ('{}') for worker {}",
            self.display_name, self.content_type, self.worker_id
        )
    }
}

impl StructuredLog for ProcessorInstantiated<'_> {
    fn log(&self) {
        tracing::debug!(
            content_type = self.content_type,
            worker_id = self.worker_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "processor",
            span_name = name,
            content_type = self.content_type,
            worker_id = self.worker_id,
        )
    }
}
