// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engine::report::BuildReport;
use crate::engine::worker::run_workers;
use crate::errors::{BuildResult, FailureStrategy};
use crate::traits::executor::{BuildExecutor, BuildJob};

/// Builds items in parallel on a fixed set of worker threads.
///
/// Every worker runs on a blocking thread and owns its own processor pool, so one
/// processor instance exists per worker per content type and none is ever shared.
/// Items are handed out in batch order through a shared cursor; which worker picks
/// up which item is not deterministic, but the report is always in batch order.
///
/// # Examples
///
/// ```rust
/// use asset_mill::engine::WorkerPoolExecutor;
///
/// let executor = WorkerPoolExecutor::new(8);
/// assert_eq!(executor.max_workers(), 8);
///
/// // At least one worker is always used.
/// assert_eq!(WorkerPoolExecutor::new(0).max_workers(), 1);
/// ```
pub struct WorkerPoolExecutor {
    max_workers: usize,
}

impl WorkerPoolExecutor {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }
}

impl Default for WorkerPoolExecutor {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(crate::config::consts::FALLBACK_WORKER_COUNT);
        Self::new(workers)
    }
}

#[async_trait]
impl BuildExecutor for WorkerPoolExecutor {
    async fn execute_with_strategy(
        &self,
        job: BuildJob,
        failure_strategy: FailureStrategy,
    ) -> BuildResult<BuildReport> {
        run_workers(self.name(), job, self.max_workers, failure_strategy).await
    }

    fn name(&self) -> &'static str {
        "worker_pool"
    }
}
