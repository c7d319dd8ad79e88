// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Build engine: discovery, per-worker processor pools, executors and reporting.

pub mod discovery;
pub mod factory;
pub mod instance;
pub mod output;
pub mod pool;
pub mod report;
pub mod serial;
pub mod worker;
pub mod worker_pool;

pub use discovery::discover_items;
pub use factory::ExecutorFactory;
pub use instance::{ProcessorInstance, RunSummary, Stage};
pub use output::{DirectoryStore, MemoryStore, OutputStore};
pub use pool::ProcessorPool;
pub use report::{BuildReport, ItemOutcome, ItemReport};
pub use serial::SerialExecutor;
pub use worker::{load_params, sidecar_path};
pub use worker_pool::WorkerPoolExecutor;
