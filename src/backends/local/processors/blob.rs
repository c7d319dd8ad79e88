// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::io::{BufRead, Read, Write};

use crate::content::{ItemContext, ThrowExt};
use crate::errors::ItemResult;
use crate::traits::Processor;

pub const CONTENT_TYPE: &str = "blob";
pub const DISPLAY_NAME: &str = "Raw Blob";
pub const EXTENSIONS: &[&str] = &["bin", "dat", "txt", "json", "wav", "ogg"];

/// Output magic of a built blob.
pub const MAGIC: &[u8; 4] = b"MBLB";

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Streaming pass-through processor.
///
/// The source is copied in fixed-size chunks, one loop iteration per chunk, so
/// arbitrarily large files never need to be held in memory. Output is
/// `MBLB | chunk bytes... | total length u64` (little endian).
///
/// Parameters:
/// * `chunk_size` - bytes per loop iteration (default 64 KiB)
pub struct BlobProcessor {
    chunk_size: usize,
    chunk: Vec<u8>,
    total: u64,
}

impl Default for BlobProcessor {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk: Vec::new(),
            total: 0,
        }
    }
}

impl Processor for BlobProcessor {
    fn name(&self) -> &'static str {
        "blob"
    }

    fn reset(&mut self) {
        self.chunk_size = DEFAULT_CHUNK_SIZE;
        self.chunk.clear();
        self.total = 0;
    }

    fn begin(&mut self, ctx: &ItemContext<'_>, _input: &mut dyn BufRead) -> ItemResult<()> {
        if let Some(parsed) = ctx.params().get_parsed::<usize>("chunk_size") {
            let size = parsed.or_throw(ctx, "invalid chunk_size parameter")?;
            if size == 0 {
                crate::throw!(ctx, "chunk_size must be greater than zero");
            }
            self.chunk_size = size;
        }
        Ok(())
    }

    fn read(&mut self, ctx: &ItemContext<'_>, input: &mut dyn BufRead) -> ItemResult<bool> {
        self.chunk.clear();
        Read::take(&mut *input, self.chunk_size as u64)
            .read_to_end(&mut self.chunk)
            .or_throw(ctx, "failed to read source chunk")?;
        let remaining = input.fill_buf().or_throw(ctx, "failed to read source chunk")?;
        Ok(!remaining.is_empty())
    }

    fn process(&mut self, _ctx: &ItemContext<'_>) -> ItemResult<()> {
        self.total += self.chunk.len() as u64;
        Ok(())
    }

    fn write(&mut self, ctx: &ItemContext<'_>, output: &mut dyn Write) -> ItemResult<()> {
        if ctx.is_first_loop() {
            output.write_all(MAGIC).or_throw(ctx, "failed to write blob header")?;
        }
        output.write_all(&self.chunk).or_throw(ctx, "failed to write blob chunk")
    }

    fn end(&mut self, ctx: &ItemContext<'_>, output: &mut dyn Write) -> ItemResult<bool> {
        output
            .write_all(&self.total.to_le_bytes())
            .or_throw(ctx, "failed to write blob trailer")?;
        if ctx.loop_index() > 1 {
            ctx.info(format!("Streamed {} bytes in {} chunks", self.total, ctx.loop_index()));
        }
        Ok(false)
    }
}
