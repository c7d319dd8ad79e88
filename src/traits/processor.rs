// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::io::{BufRead, Write};

use crate::content::ItemContext;
use crate::errors::ItemResult;

/// Staged handler for one content type.
///
/// A processor is driven through a fixed sequence for every item:
///
/// ```text
/// reset -> begin -> { read -> process -> write }+ -> end
/// ```
///
/// The loop always runs at least once, even when the first `read` returns `false`.
/// Whole-file processors return `false` from their first `read`; streaming
/// processors keep returning `true` while input remains.
///
/// One instance lives per worker thread and is reused across many items, so
/// `reset` must clear everything a previous item left behind. Instances are never
/// shared between threads while an item is running, which is why the trait only
/// requires `Send`.
///
/// Failures should be raised through the `throw*` methods of [`ItemContext`] so
/// every error carries the item and the line that raised it.
pub trait Processor: Send {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Clear all per-item state. Called before every item, including the first.
    fn reset(&mut self);

    /// Read item-level header or metadata and prepare the loop. No bulk work here.
    fn begin(&mut self, ctx: &ItemContext<'_>, input: &mut dyn BufRead) -> ItemResult<()>;

    /// Read the next chunk. Returns `true` when another iteration is needed.
    fn read(&mut self, ctx: &ItemContext<'_>, input: &mut dyn BufRead) -> ItemResult<bool>;

    /// Transform the chunk that was just read. No stream I/O.
    fn process(&mut self, ctx: &ItemContext<'_>) -> ItemResult<()>;

    /// Serialize the processed chunk. On the first loop this also writes the
    /// output header.
    fn write(&mut self, ctx: &ItemContext<'_>, output: &mut dyn Write) -> ItemResult<()>;

    /// Finalize the output after the last loop. `Ok(true)` asks the packager to
    /// compress the payload.
    fn end(&mut self, ctx: &ItemContext<'_>, output: &mut dyn Write) -> ItemResult<bool>;

    /// Drop any native resources still held. Called after a failed run and when
    /// the owning instance is disposed.
    fn release_resources(&mut self) {}
}
