// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{BuildConfig, Strategy};
use crate::engine::serial::SerialExecutor;
use crate::engine::worker_pool::WorkerPoolExecutor;
use crate::traits::BuildExecutor;

/// Factory for creating build executors from configuration
pub struct ExecutorFactory;

impl ExecutorFactory {
    /// Create a build executor based on the configuration strategy
    pub fn from_config(cfg: &BuildConfig) -> Box<dyn BuildExecutor> {
        match cfg.strategy {
            Strategy::WorkerPool => {
                Box::new(WorkerPoolExecutor::new(cfg.executor_options.worker_count()))
            }
            Strategy::Serial => Box::new(SerialExecutor::new()),
        }
    }
}
