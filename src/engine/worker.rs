// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker loop shared by the executors.
//!
//! Each worker runs on its own blocking thread and owns a [`ProcessorPool`], so a
//! processor instance never leaves the thread that created it. Workers pull the
//! next undispatched item from a shared cursor until the batch is exhausted or a
//! fail-fast abort stops dispatching.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::content::{ContentItem, ParamBlock};
use crate::engine::output::OutputStore;
use crate::engine::pool::ProcessorPool;
use crate::engine::report::{BuildReport, ItemOutcome, ItemReport};
use crate::errors::{BuildError, BuildResult, CallSite, FailureStrategy, ItemError};
use crate::observability::messages::build::{BuildAborted, BuildCompleted, BuildStarted, WorkerFinished};
use crate::observability::messages::item::{ItemCompleted, ItemFailed, ItemSkipped, ItemStarted};
use crate::observability::messages::params::ParamLineRejected;
use crate::observability::messages::StructuredLog;
use crate::observability::{BuildLogger, LogRecord, MemoryLogger, Severity};
use crate::traits::BuildJob;

const ABORTED_REASON: &str = "build aborted after an earlier failure";

/// Path of the parameter sidecar for `source`: `x.png` -> `x.png.<extension>`.
pub fn sidecar_path(source: &Path, extension: &str) -> PathBuf {
    let mut path = OsString::from(source.as_os_str());
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

/// Read the parameter sidecar of `item`, if there is one.
///
/// Lines the parser refuses are reported as warnings against the item and skipped.
pub fn load_params(item: &ContentItem, extension: &str, logger: &dyn BuildLogger) -> ParamBlock {
    let path = sidecar_path(item.source(), extension);
    let warn = |message: String| {
        logger.log(LogRecord {
            item_name: item.name().to_string(),
            batch_index: item.batch_index(),
            message,
            severity: Severity::Warn,
            important: false,
        })
    };

    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return ParamBlock::new(),
        Err(e) => {
            warn(format!("Ignoring unreadable parameter file '{}': {}", path.display(), e));
            return ParamBlock::new();
        }
    };

    let (block, rejected) = ParamBlock::parse_lines(&text);
    let source = path.display().to_string();
    for line in &rejected {
        let message = ParamLineRejected {
            source: &source,
            line_number: line.line_number,
            line: &line.line,
            reason: line.reason.as_str(),
        };
        message.log();
        warn(message.to_string());
    }
    block
}

/// One build worker and the processor instances it owns.
pub struct Worker {
    id: usize,
    pool: ProcessorPool,
    store: Arc<dyn OutputStore>,
    logger: Arc<dyn BuildLogger>,
    params_extension: String,
    processed: usize,
}

impl Worker {
    pub fn new(id: usize, job: &BuildJob, logger: Arc<dyn BuildLogger>) -> Self {
        Self {
            id,
            pool: ProcessorPool::new(id, Arc::clone(&job.registry)),
            store: Arc::clone(&job.store),
            logger,
            params_extension: job.params_extension.clone(),
            processed: 0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Build one item and commit its output. Never panics on item failures.
    pub fn build(&mut self, item: &Arc<ContentItem>) -> ItemOutcome {
        let started = Instant::now();
        self.processed += 1;
        ItemStarted {
            item_name: item.name(),
            batch_index: item.batch_index(),
            content_type: item.content_type(),
            worker_id: self.id,
        }
        .log();

        let outcome = self.run(item).and_then(|(payload, loops, compress)| {
            self.store
                .commit(item, &payload)
                .map_err(|e| item_error(item, "Failed to store built output", Some(e)))?;
            Ok(ItemOutcome::Built {
                bytes: payload.len(),
                loops,
                compress,
            })
        });

        match outcome {
            Ok(outcome) => {
                if let ItemOutcome::Built {
                    bytes,
                    loops,
                    compress,
                } = outcome
                {
                    ItemCompleted {
                        item_name: item.name(),
                        batch_index: item.batch_index(),
                        loops,
                        output_bytes: bytes,
                        compress,
                        duration: started.elapsed(),
                    }
                    .log();
                }
                outcome
            }
            Err(error) => {
                ItemFailed { error: &error }.log();
                ItemOutcome::failed(&error)
            }
        }
    }

    fn run(&mut self, item: &Arc<ContentItem>) -> Result<(Vec<u8>, usize, bool), ItemError> {
        let params = load_params(item, &self.params_extension, self.logger.as_ref());

        let file = File::open(item.source())
            .map_err(|e| item_error(item, "Failed to open source file", Some(e)))?;
        let mut input = BufReader::new(file);
        let mut output = Vec::new();

        let instance = self
            .pool
            .acquire(item.content_type())
            .map_err(|e| item_error(item, "No processor for content type", Some(e)))?;
        let summary = instance.run(item, &params, self.logger.as_ref(), &mut input, &mut output)?;

        Ok((output, summary.loops, summary.compress))
    }

    /// Dispose the worker's processors.
    pub fn finish(mut self) {
        WorkerFinished {
            worker_id: self.id,
            items_processed: self.processed,
            pooled_processors: self.pool.len(),
        }
        .log();
        self.pool.shutdown();
    }
}

#[track_caller]
fn item_error<E>(item: &Arc<ContentItem>, message: &str, cause: Option<E>) -> ItemError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ItemError::new(
        message,
        Arc::clone(item),
        CallSite::caller(),
        cause.map(|e| Box::new(e) as crate::errors::BoxedCause),
    )
}

/// Run `job` on `worker_count` blocking workers and assemble the report.
pub async fn run_workers(
    executor: &str,
    job: BuildJob,
    worker_count: usize,
    failure_strategy: FailureStrategy,
) -> BuildResult<BuildReport> {
    let started = Instant::now();
    let items = Arc::new(job.items.clone());
    let worker_count = worker_count.clamp(1, items.len().max(1));

    BuildStarted {
        strategy: executor,
        item_count: items.len(),
        worker_count,
    }
    .log();

    let collector = Arc::new(MemoryLogger::forwarding_to(Arc::clone(&job.logger)));
    let cursor = Arc::new(AtomicUsize::new(0));
    let abort = Arc::new(AtomicBool::new(false));

    let mut handles = Vec::with_capacity(worker_count);
    for worker_id in 0..worker_count {
        let mut worker = Worker::new(worker_id, &job, collector.clone() as Arc<dyn BuildLogger>);
        let items = Arc::clone(&items);
        let cursor = Arc::clone(&cursor);
        let abort = Arc::clone(&abort);

        handles.push(tokio::task::spawn_blocking(move || {
            let mut outcomes = Vec::new();
            while !abort.load(Ordering::Acquire) {
                let index = cursor.fetch_add(1, Ordering::AcqRel);
                let Some(item) = items.get(index) else {
                    break;
                };

                let outcome = worker.build(item);
                if outcome.is_failed()
                    && failure_strategy == FailureStrategy::FailFast
                    && !abort.swap(true, Ordering::AcqRel)
                {
                    BuildAborted {
                        failed_item: item.name(),
                        batch_index: item.batch_index(),
                    }
                    .log();
                }
                outcomes.push((index, outcome));
            }
            worker.finish();
            outcomes
        }));
    }

    let mut outcomes: Vec<Option<ItemOutcome>> = (0..items.len()).map(|_| None).collect();
    for (worker_id, handle) in handles.into_iter().enumerate() {
        let finished = handle.await.map_err(|e| BuildError::WorkerFailed {
            worker_id,
            reason: e.to_string(),
        })?;
        for (index, outcome) in finished {
            outcomes[index] = Some(outcome);
        }
    }

    let reports = items
        .iter()
        .zip(outcomes)
        .map(|(item, outcome)| {
            let outcome = outcome.unwrap_or_else(|| {
                ItemSkipped {
                    item_name: item.name(),
                    batch_index: item.batch_index(),
                    reason: ABORTED_REASON,
                }
                .log();
                ItemOutcome::Skipped {
                    reason: ABORTED_REASON.to_string(),
                }
            });
            let mut report = ItemReport::new(item, outcome);
            report.diagnostics = collector.records_for(item.batch_index());
            report
        })
        .collect();

    let report = BuildReport::new(executor, reports, abort.load(Ordering::Acquire), started.elapsed());
    BuildCompleted {
        succeeded: report.succeeded,
        failed: report.failed,
        skipped: report.skipped,
        duration: started.elapsed(),
    }
    .log();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_with_sidecar(dir: &Path, sidecar: Option<&str>) -> ContentItem {
        let source = dir.join("hero.png");
        fs::write(&source, b"x").unwrap();
        if let Some(text) = sidecar {
            fs::write(sidecar_path(&source, "params"), text).unwrap();
        }
        ContentItem::from_source(dir, &source, "texture", 4)
    }

    #[test]
    fn test_sidecar_path_appends_extension() {
        assert_eq!(
            sidecar_path(Path::new("art/hero.png"), "params"),
            PathBuf::from("art/hero.png.params")
        );
    }

    #[test]
    fn test_missing_sidecar_gives_empty_block() {
        let dir = tempfile::tempdir().unwrap();
        let item = item_with_sidecar(dir.path(), None);
        let logger = MemoryLogger::new();

        let params = load_params(&item, "params", &logger);
        assert!(params.is_empty());
        assert!(logger.records().is_empty());
    }

    #[test]
    fn test_rejected_lines_warn_and_skip() {
        let dir = tempfile::tempdir().unwrap();
        let item = item_with_sidecar(
            dir.path(),
            Some("# hero sprite\nmax_size 256\nbroken\nmax_size 512\npremultiply true\n"),
        );
        let logger = MemoryLogger::new();

        let params = load_params(&item, "params", &logger);

        assert_eq!(params.try_get("max_size"), Some("256"));
        assert_eq!(params.try_get("premultiply"), Some("true"));
        assert_eq!(params.comments(), vec!["hero sprite".to_string()]);

        let warnings = logger.records_for(4);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|r| r.severity == Severity::Warn));
        assert!(warnings[0].message.contains(":3"));
        assert!(warnings[1].message.contains("duplicate key"));
    }
}
