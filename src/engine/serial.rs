// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engine::report::BuildReport;
use crate::engine::worker::run_workers;
use crate::errors::{BuildResult, FailureStrategy};
use crate::traits::executor::{BuildExecutor, BuildJob};

/// Builds items strictly one after another, in batch order, on a single worker.
///
/// Useful for debugging processors and for reproducible logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialExecutor;

impl SerialExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BuildExecutor for SerialExecutor {
    async fn execute_with_strategy(
        &self,
        job: BuildJob,
        failure_strategy: FailureStrategy,
    ) -> BuildResult<BuildReport> {
        run_workers(self.name(), job, 1, failure_strategy).await
    }

    fn name(&self) -> &'static str {
        "serial"
    }
}
