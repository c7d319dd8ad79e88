// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-item diagnostics handed to a processor for every stage.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use crate::content::{ContentItem, ParamBlock};
use crate::errors::{BoxedCause, CallSite, ItemError};
use crate::observability::{BuildLogger, LogRecord, Severity};

/// What a running stage can see of the build: the item identity, its parameters,
/// the loop position and a logger tagged with the item.
///
/// Failures are raised through the `throw*` methods, which capture the caller's
/// location so the build report can point at the exact processor line.
///
/// ```
/// use asset_mill::content::{ContentItem, ItemContext, ParamBlock};
/// use asset_mill::observability::MemoryLogger;
/// use std::sync::Arc;
///
/// let item = Arc::new(ContentItem::new("ui.button", "png", "texture", 2, "ui/button.png"));
/// let params = ParamBlock::new();
/// let logger = MemoryLogger::new();
/// let ctx = ItemContext::new(&item, &params, &logger, 0);
///
/// ctx.warn("no mip levels requested");
/// let err = ctx.throw("unsupported bit depth");
///
/// assert!(ctx.is_first_loop());
/// assert_eq!(logger.records()[0].batch_index, 2);
/// assert_eq!(err.item().name(), "ui.button");
/// ```
#[derive(Clone, Copy)]
pub struct ItemContext<'a> {
    item: &'a Arc<ContentItem>,
    params: &'a ParamBlock,
    logger: &'a dyn BuildLogger,
    loop_index: usize,
}

impl<'a> ItemContext<'a> {
    pub fn new(
        item: &'a Arc<ContentItem>,
        params: &'a ParamBlock,
        logger: &'a dyn BuildLogger,
        loop_index: usize,
    ) -> Self {
        Self {
            item,
            params,
            logger,
            loop_index,
        }
    }

    pub fn item(&self) -> &Arc<ContentItem> {
        self.item
    }

    pub fn name(&self) -> &str {
        self.item.name()
    }

    pub fn extension(&self) -> &str {
        self.item.extension()
    }

    pub fn content_type(&self) -> &str {
        self.item.content_type()
    }

    pub fn batch_index(&self) -> usize {
        self.item.batch_index()
    }

    pub fn source_path(&self) -> &Path {
        self.item.source()
    }

    pub fn params(&self) -> &ParamBlock {
        self.params
    }

    /// Number of completed read/process/write iterations.
    pub fn loop_index(&self) -> usize {
        self.loop_index
    }

    pub fn is_first_loop(&self) -> bool {
        self.loop_index == 0
    }

    pub fn log(&self, severity: Severity, message: impl Into<String>, important: bool) {
        self.logger.log(LogRecord {
            item_name: self.item.name().to_string(),
            batch_index: self.item.batch_index(),
            message: message.into(),
            severity,
            important,
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Severity::Info, message, false);
    }

    /// Info line flagged as important for the build report.
    pub fn notice(&self, message: impl Into<String>) {
        self.log(Severity::Info, message, true);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(Severity::Warn, message, false);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Severity::Error, message, false);
    }

    /// Raise a failure for this item at the caller's location.
    #[track_caller]
    pub fn throw(&self, message: impl Into<String>) -> ItemError {
        self.throw_at(CallSite::caller(), message, None)
    }

    /// Raise `error` for this item; its display text becomes the message and the
    /// error itself is kept as the cause.
    #[track_caller]
    pub fn throw_error<E>(&self, error: E) -> ItemError
    where
        E: Error + Send + Sync + 'static,
    {
        let message = error.to_string();
        self.throw_at(CallSite::caller(), message, Some(Box::new(error)))
    }

    /// Raise a failure with `cause` as its inner error.
    #[track_caller]
    pub fn throw_with(&self, message: impl Into<String>, cause: impl Into<BoxedCause>) -> ItemError {
        self.throw_at(CallSite::caller(), message, Some(cause.into()))
    }

    /// Raise a failure recorded at an explicit call site.
    pub fn throw_at(
        &self,
        site: CallSite,
        message: impl Into<String>,
        cause: Option<BoxedCause>,
    ) -> ItemError {
        ItemError::new(message, Arc::clone(self.item), site, cause)
    }
}

/// Turns lower-level failures into an [`ItemError`] raised at the caller's line.
///
/// ```
/// use asset_mill::content::{ContentItem, ItemContext, ParamBlock, ThrowExt};
/// use asset_mill::observability::MemoryLogger;
/// use std::sync::Arc;
///
/// let item = Arc::new(ContentItem::new("data.table", "bin", "blob", 0, "data/table.bin"));
/// let params = ParamBlock::new();
/// let logger = MemoryLogger::new();
/// let ctx = ItemContext::new(&item, &params, &logger, 0);
///
/// let parsed: Result<u32, _> = "x".parse::<u32>();
/// let err = parsed.or_throw(&ctx, "bad row count").unwrap_err();
/// assert_eq!(err.message(), "bad row count");
/// assert_eq!(err.cause_chain().len(), 1);
/// ```
pub trait ThrowExt<T> {
    fn or_throw(self, ctx: &ItemContext<'_>, message: &str) -> Result<T, ItemError>;
}

impl<T, E> ThrowExt<T> for Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    #[track_caller]
    fn or_throw(self, ctx: &ItemContext<'_>, message: &str) -> Result<T, ItemError> {
        let site = CallSite::caller();
        self.map_err(|e| ctx.throw_at(site, message, Some(Box::new(e))))
    }
}
