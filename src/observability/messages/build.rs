// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for build run lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Content discovery
//! * Build start, completion and early abort
//! * Worker lifecycle

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Content discovery finished.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use asset_mill::observability::messages::build::ContentDiscovered;
///
/// let msg = ContentDiscovered {
///     root: "content",
///     item_count: 12,
///     ignored_count: 3,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ContentDiscovered<'a> {
    pub root: &'a str,
    pub item_count: usize,
    pub ignored_count: usize,
}

impl Display for ContentDiscovered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Discovered {} content items under '{}' ({} files ignored)",
            self.item_count, self.root, self.ignored_count
        )
    }
}

impl StructuredLog for ContentDiscovered<'_> {
    fn log(&self) {
        tracing::info!(
            root = self.root,
            item_count = self.item_count,
            ignored_count = self.ignored_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "discovery",
            span_name = name,
            root = self.root,
            item_count = self.item_count,
        )
    }
}

/// Build started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct BuildStarted<'a> {
    pub strategy: &'a str,
    pub item_count: usize,
    pub worker_count: usize,
}

impl Display for BuildStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting build with {} strategy: {} items, {} workers",
            self.strategy, self.item_count, self.worker_count
        )
    }
}

impl StructuredLog for BuildStarted<'_> {
    fn log(&self) {
        tracing::info!(
            strategy = self.strategy,
            item_count = self.item_count,
            worker_count = self.worker_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "build",
            span_name = name,
            strategy = self.strategy,
            item_count = self.item_count,
            worker_count = self.worker_count,
        )
    }
}

/// Build completed (with or without item failures).
///
/// # Log Level
/// `info!` when every item was built, `warn!` otherwise
pub struct BuildCompleted {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration: Duration,
}

impl Display for BuildCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Build finished in {:?}: {} built, {} failed, {} skipped",
            self.duration, self.succeeded, self.failed, self.skipped
        )
    }
}

impl StructuredLog for BuildCompleted {
    fn log(&self) {
        if self.failed == 0 && self.skipped == 0 {
            tracing::info!(
                succeeded = self.succeeded,
                failed = self.failed,
                skipped = self.skipped,
                duration_ms = self.duration.as_millis() as u64,
                "{}", self
            );
        } else {
            tracing::warn!(
                succeeded = self.succeeded,
                failed = self.failed,
                skipped = self.skipped,
                duration_ms = self.duration.as_millis() as u64,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "build_completed",
            span_name = name,
            succeeded = self.succeeded,
            failed = self.failed,
        )
    }
}

/// Dispatch stopped early because of the fail-fast strategy.
///
/// # Log Level
/// `warn!` - Degraded behavior
pub struct BuildAborted<'a> {
    pub failed_item: &'a str,
    pub batch_index: usize,
}

impl Display for BuildAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Fail-fast: item '{}' (#{}) failed, no further items will be dispatched",
            self.failed_item, self.batch_index
        )
    }
}

impl StructuredLog for BuildAborted<'_> {
    fn log(&self) {
        tracing::warn!(
            failed_item = self.failed_item,
            batch_index = self.batch_index,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "build_aborted",
            span_name = name,
            failed_item = self.failed_item,
        )
    }
}

/// Worker finished its share of the batch and disposed its processor pool.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct WorkerFinished {
    pub worker_id: usize,
    pub items_processed: usize,
    pub pooled_processors: usize,
}

impl Display for WorkerFinished {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} finished: {} items, {} pooled processors disposed",
            self.worker_id, self.items_processed, self.pooled_processors
        )
    }
}

impl StructuredLog for WorkerFinished {
    fn log(&self) {
        tracing::debug!(
            worker_id = self.worker_id,
            items_processed = self.items_processed,
            pooled_processors = self.pooled_processors,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("worker", span_name = name, worker_id = self.worker_id)
    }
}
