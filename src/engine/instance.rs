// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Drives one processor through its stage sequence.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::io::{BufRead, Write};
use std::panic::{catch_unwind, AssertUnwindSafe, Location};
use std::sync::{Arc, OnceLock};

use crate::content::{ContentItem, ItemContext, ParamBlock};
use crate::errors::{CallSite, ItemError, ItemResult};
use crate::observability::BuildLogger;
use crate::traits::Processor;

/// One step of the processor lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Reset,
    Begin,
    Read,
    Process,
    Write,
    End,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Reset => "reset",
            Stage::Begin => "begin",
            Stage::Read => "read",
            Stage::Process => "process",
            Stage::Write => "write",
            Stage::End => "end",
        };
        f.write_str(name)
    }
}

/// What a completed run reports to the packager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Completed read/process/write iterations; always at least 1.
    pub loops: usize,
    /// Whether the processor asked for the payload to be compressed.
    pub compress: bool,
}

/// A processor owned by one worker and reused for every item of its content type.
///
/// Disposal is idempotent: [`dispose`](Self::dispose) and `Drop` share one guarded
/// path, so native resources held by the processor are released exactly once.
pub struct ProcessorInstance {
    processor: Box<dyn Processor>,
    content_type: String,
    loop_index: usize,
    stage: Stage,
    disposed: bool,
}

impl ProcessorInstance {
    pub fn new(content_type: impl Into<String>, processor: Box<dyn Processor>) -> Self {
        Self {
            processor,
            content_type: content_type.into(),
            loop_index: 0,
            stage: Stage::Reset,
            disposed: false,
        }
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn processor_name(&self) -> &'static str {
        self.processor.name()
    }

    /// Loop position of the current or most recent item.
    pub fn loop_index(&self) -> usize {
        self.loop_index
    }

    /// Stage that ran last; after a failed run this is the stage that failed.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Build one item.
    ///
    /// Runs `reset -> begin -> {read -> process -> write}+ -> end`. A stage error
    /// stops the run at once and is returned unchanged. A panic inside a stage is
    /// turned into an [`ItemError`] naming the stage, so one broken item cannot
    /// take the worker down; its call site is where the panic happened. Errors
    /// raised without a function name are attributed to `<processor>::<stage>`.
    /// After any failure the processor is asked to release its resources.
    #[track_caller]
    pub fn run(
        &mut self,
        item: &Arc<ContentItem>,
        params: &ParamBlock,
        logger: &dyn BuildLogger,
        input: &mut dyn BufRead,
        output: &mut dyn Write,
    ) -> ItemResult<RunSummary> {
        let caller = Location::caller();
        if self.disposed {
            return Err(ItemError::new(
                format!("'{}' processor instance has been disposed", self.content_type),
                Arc::clone(item),
                CallSite::from_location(caller, None),
                None,
            ));
        }

        install_panic_hook();
        take_panic_site();

        self.loop_index = 0;
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.drive(item, params, logger, input, output)
        }));

        let stage_function = format!("{}::{}", self.processor.name(), self.stage);
        let result = match outcome {
            Ok(result) => result.map_err(|err| err.or_function(|| stage_function)),
            Err(payload) => {
                let site = take_panic_site().unwrap_or_else(|| CallSite::from_location(caller, None));
                Err(ItemError::new(
                    format!(
                        "{} stage of '{}' panicked: {}",
                        self.stage,
                        self.processor.name(),
                        panic_message(payload.as_ref())
                    ),
                    Arc::clone(item),
                    site.with_function(stage_function),
                    None,
                ))
            }
        };

        if result.is_err() {
            self.release_after_failure();
        }
        result
    }

    fn drive(
        &mut self,
        item: &Arc<ContentItem>,
        params: &ParamBlock,
        logger: &dyn BuildLogger,
        input: &mut dyn BufRead,
        output: &mut dyn Write,
    ) -> ItemResult<RunSummary> {
        self.stage = Stage::Reset;
        self.processor.reset();

        let ctx = ItemContext::new(item, params, logger, self.loop_index);
        self.stage = Stage::Begin;
        self.processor.begin(&ctx, input)?;

        loop {
            let ctx = ItemContext::new(item, params, logger, self.loop_index);

            self.stage = Stage::Read;
            let more = self.processor.read(&ctx, input)?;
            self.stage = Stage::Process;
            self.processor.process(&ctx)?;
            self.stage = Stage::Write;
            self.processor.write(&ctx, output)?;

            self.loop_index += 1;
            if !more {
                break;
            }
        }

        let ctx = ItemContext::new(item, params, logger, self.loop_index);
        self.stage = Stage::End;
        let compress = self.processor.end(&ctx, output)?;

        Ok(RunSummary {
            loops: self.loop_index,
            compress,
        })
    }

    fn release_after_failure(&mut self) {
        let processor = &mut self.processor;
        if catch_unwind(AssertUnwindSafe(|| processor.release_resources())).is_err() {
            tracing::error!(
                content_type = %self.content_type,
                "processor panicked while releasing resources after a failed item"
            );
        }
    }

    /// Release everything the processor holds. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.processor.release_resources();
    }
}

impl Drop for ProcessorInstance {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for ProcessorInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorInstance")
            .field("processor", &self.processor.name())
            .field("content_type", &self.content_type)
            .field("loop_index", &self.loop_index)
            .field("disposed", &self.disposed)
            .finish()
    }
}

thread_local! {
    static PANIC_SITE: RefCell<Option<CallSite>> = const { RefCell::new(None) };
}

/// Chain a hook that remembers where the latest panic on each thread happened.
fn install_panic_hook() {
    static PANIC_HOOK_INIT: OnceLock<()> = OnceLock::new();
    PANIC_HOOK_INIT.get_or_init(|| {
        let previous_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            if let Some(location) = panic_info.location() {
                let site = CallSite::at(location.file().to_string(), location.line(), location.column());
                let _ = PANIC_SITE.try_with(|slot| {
                    if let Ok(mut slot) = slot.try_borrow_mut() {
                        *slot = Some(site);
                    }
                });
            }
            previous_hook(panic_info);
        }));
    });
}

fn take_panic_site() -> Option<CallSite> {
    PANIC_SITE
        .try_with(|slot| slot.try_borrow_mut().ok().and_then(|mut slot| slot.take()))
        .ok()
        .flatten()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
