// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::ProcessorRegistry;
use crate::content::ContentItem;
use crate::engine::{BuildReport, OutputStore};
use crate::errors::{BuildResult, FailureStrategy};
use crate::observability::BuildLogger;

/// Everything an executor needs to build one batch of content.
#[derive(Clone)]
pub struct BuildJob {
    /// Items in batch order; `items[i].batch_index() == i`.
    pub items: Vec<Arc<ContentItem>>,
    pub registry: Arc<ProcessorRegistry>,
    pub store: Arc<dyn OutputStore>,
    pub logger: Arc<dyn BuildLogger>,
    /// Extension of parameter sidecar files, without the dot.
    pub params_extension: String,
}

impl std::fmt::Debug for BuildJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildJob")
            .field("item_count", &self.items.len())
            .field("content_types", &self.registry.content_types().collect::<Vec<_>>())
            .field("params_extension", &self.params_extension)
            .finish()
    }
}

#[async_trait]
pub trait BuildExecutor: Send + Sync {
    /// Build every item of `job`, continuing past item failures.
    async fn execute(&self, job: BuildJob) -> BuildResult<BuildReport> {
        self.execute_with_strategy(job, FailureStrategy::default()).await
    }

    /// Build every item of `job`.
    ///
    /// Item failures are recorded in the report; they never make this call fail.
    /// With [`FailureStrategy::FailFast`] no new item is dispatched after the first
    /// failure and undispatched items are reported as skipped. An `Err` means the
    /// build machinery itself broke (a worker died).
    async fn execute_with_strategy(
        &self,
        job: BuildJob,
        failure_strategy: FailureStrategy,
    ) -> BuildResult<BuildReport>;

    fn name(&self) -> &'static str;
}
