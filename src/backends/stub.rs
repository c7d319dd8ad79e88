// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use parking_lot::Mutex;
use std::io::{BufRead, Write};
use std::sync::Arc;

use crate::content::{ItemContext, ThrowExt};
use crate::engine::Stage;
use crate::errors::ItemResult;
use crate::native::{HeapImage, NativeLibrary};
use crate::traits::Processor;

/// Shared record of the stages a processor ran, e.g. `read@2`.
#[derive(Debug, Clone, Default)]
pub struct StageLog(Arc<Mutex<Vec<String>>>);

impl StageLog {
    fn push(&self, stage: &str, ctx: Option<&ItemContext<'_>>) {
        let event = match ctx {
            Some(ctx) => format!("{}@{}", stage, ctx.loop_index()),
            None => stage.to_string(),
        };
        self.0.lock().push(event);
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Number of events for `stage`.
    pub fn count(&self, stage: &str) -> usize {
        self.0
            .lock()
            .iter()
            .filter(|e| e.split('@').next() == Some(stage))
            .count()
    }
}

/// Records every stage call and asks for `chunks` loop iterations.
///
/// Output: `H` on the first write, `.` on every write, `E` at the end.
pub struct RecordingProcessor {
    chunks: usize,
    log: StageLog,
}

impl RecordingProcessor {
    pub fn new(chunks: usize, log: StageLog) -> Self {
        Self {
            chunks: chunks.max(1),
            log,
        }
    }
}

impl Processor for RecordingProcessor {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn reset(&mut self) {
        self.log.push("reset", None);
    }

    fn begin(&mut self, ctx: &ItemContext<'_>, _input: &mut dyn BufRead) -> ItemResult<()> {
        self.log.push("begin", Some(ctx));
        Ok(())
    }

    fn read(&mut self, ctx: &ItemContext<'_>, _input: &mut dyn BufRead) -> ItemResult<bool> {
        self.log.push("read", Some(ctx));
        Ok(ctx.loop_index() + 1 < self.chunks)
    }

    fn process(&mut self, ctx: &ItemContext<'_>) -> ItemResult<()> {
        self.log.push("process", Some(ctx));
        Ok(())
    }

    fn write(&mut self, ctx: &ItemContext<'_>, output: &mut dyn Write) -> ItemResult<()> {
        self.log.push("write", Some(ctx));
        if ctx.is_first_loop() {
            output.write_all(b"H").or_throw(ctx, "header write failed")?;
        }
        output.write_all(b".").or_throw(ctx, "chunk write failed")
    }

    fn end(&mut self, ctx: &ItemContext<'_>, output: &mut dyn Write) -> ItemResult<bool> {
        self.log.push("end", Some(ctx));
        output.write_all(b"E").or_throw(ctx, "trailer write failed")?;
        Ok(true)
    }
}

/// Throws `"<stage> failed"` from the configured stage.
pub struct FailingProcessor {
    stage: Stage,
}

impl FailingProcessor {
    pub fn new(stage: Stage) -> Self {
        Self { stage }
    }

    fn check(&self, stage: Stage, ctx: &ItemContext<'_>) -> ItemResult<()> {
        if stage == self.stage {
            return Err(ctx.throw(format!("{} failed", stage)));
        }
        Ok(())
    }
}

impl Processor for FailingProcessor {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn reset(&mut self) {}

    fn begin(&mut self, ctx: &ItemContext<'_>, _input: &mut dyn BufRead) -> ItemResult<()> {
        self.check(Stage::Begin, ctx)
    }

    fn read(&mut self, ctx: &ItemContext<'_>, _input: &mut dyn BufRead) -> ItemResult<bool> {
        self.check(Stage::Read, ctx)?;
        Ok(false)
    }

    fn process(&mut self, ctx: &ItemContext<'_>) -> ItemResult<()> {
        self.check(Stage::Process, ctx)
    }

    fn write(&mut self, ctx: &ItemContext<'_>, _output: &mut dyn Write) -> ItemResult<()> {
        self.check(Stage::Write, ctx)
    }

    fn end(&mut self, ctx: &ItemContext<'_>, _output: &mut dyn Write) -> ItemResult<bool> {
        self.check(Stage::End, ctx)?;
        Ok(false)
    }
}

/// Panics in `process`.
pub struct PanickingProcessor;

impl Processor for PanickingProcessor {
    fn name(&self) -> &'static str {
        "panicking"
    }

    fn reset(&mut self) {}

    fn begin(&mut self, _ctx: &ItemContext<'_>, _input: &mut dyn BufRead) -> ItemResult<()> {
        Ok(())
    }

    fn read(&mut self, _ctx: &ItemContext<'_>, _input: &mut dyn BufRead) -> ItemResult<bool> {
        Ok(false)
    }

    fn process(&mut self, _ctx: &ItemContext<'_>) -> ItemResult<()> {
        panic!("decoder exploded")
    }

    fn write(&mut self, _ctx: &ItemContext<'_>, _output: &mut dyn Write) -> ItemResult<()> {
        Ok(())
    }

    fn end(&mut self, _ctx: &ItemContext<'_>, _output: &mut dyn Write) -> ItemResult<bool> {
        Ok(false)
    }
}

/// Allocates a native buffer in `read` and keeps it until reset or release.
pub struct BufferHoldingProcessor {
    library: Arc<NativeLibrary>,
    buffer: Option<HeapImage>,
    fail_in_end: bool,
}

impl BufferHoldingProcessor {
    pub fn new(library: Arc<NativeLibrary>) -> Self {
        Self {
            library,
            buffer: None,
            fail_in_end: false,
        }
    }

    pub fn failing_in_end(library: Arc<NativeLibrary>) -> Self {
        Self {
            fail_in_end: true,
            ..Self::new(library)
        }
    }
}

impl Processor for BufferHoldingProcessor {
    fn name(&self) -> &'static str {
        "buffer_holding"
    }

    fn reset(&mut self) {
        self.buffer = None;
    }

    fn begin(&mut self, _ctx: &ItemContext<'_>, _input: &mut dyn BufRead) -> ItemResult<()> {
        Ok(())
    }

    fn read(&mut self, ctx: &ItemContext<'_>, _input: &mut dyn BufRead) -> ItemResult<bool> {
        self.buffer = Some(self.library.allocate(2, 2, 4).or_throw(ctx, "allocation failed")?);
        Ok(false)
    }

    fn process(&mut self, _ctx: &ItemContext<'_>) -> ItemResult<()> {
        Ok(())
    }

    fn write(&mut self, _ctx: &ItemContext<'_>, _output: &mut dyn Write) -> ItemResult<()> {
        Ok(())
    }

    fn end(&mut self, ctx: &ItemContext<'_>, _output: &mut dyn Write) -> ItemResult<bool> {
        if self.fail_in_end {
            return Err(ctx.throw("end failed"));
        }
        Ok(false)
    }

    fn release_resources(&mut self) {
        self.buffer = None;
    }
}
