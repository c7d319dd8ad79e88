// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::backends::local::LocalProcessorFactory;
use crate::config::{BuildConfig, ProcessorRegistry};
use crate::content::ContentItem;
use crate::engine::factory::ExecutorFactory;
use crate::engine::{discover_items, OutputStore};
use crate::errors::{BuildResult, FailureStrategy};
use crate::native::{self, NativeLibrary};
use crate::observability::BuildLogger;
use crate::traits::{BuildExecutor, BuildJob};

/// Everything needed to run builds for one configuration.
pub struct BuildRuntime {
    pub library: Arc<NativeLibrary>,
    pub registry: Arc<ProcessorRegistry>,
    pub executor: Box<dyn BuildExecutor>,
    pub failure_strategy: FailureStrategy,
    pub params_extension: String,
}

impl BuildRuntime {
    /// Enumerate the items under `cfg.input_root` that a registered processor claims.
    pub fn discover(&self, cfg: &BuildConfig) -> BuildResult<Vec<Arc<ContentItem>>> {
        discover_items(&cfg.input_root, &self.registry, &self.params_extension)
    }

    /// Assemble a job for `items`.
    pub fn job(
        &self,
        items: Vec<Arc<ContentItem>>,
        store: Arc<dyn OutputStore>,
        logger: Arc<dyn BuildLogger>,
    ) -> BuildJob {
        BuildJob {
            items,
            registry: Arc::clone(&self.registry),
            store,
            logger,
            params_extension: self.params_extension.clone(),
        }
    }
}

/// Build runtime builder - wires the native library, processor registry and executor
/// together from configuration.
///
/// # Examples
///
/// ```
/// use asset_mill::config::{parse_config, ConfigFormat, RuntimeBuilder};
/// use std::path::Path;
///
/// let cfg = parse_config(
///     "input_root: content\noutput_root: build\nstrategy: serial\nfailure_strategy: fail_fast\n",
///     ConfigFormat::Yaml,
///     Path::new("build.yaml"),
/// )?;
///
/// let runtime = RuntimeBuilder::from_config(&cfg)?;
///
/// assert_eq!(runtime.executor.name(), "serial");
/// assert!(runtime.library.is_builtin());
/// assert!(runtime.registry.contains("texture"));
/// assert_eq!(runtime.failure_strategy, asset_mill::errors::FailureStrategy::FailFast);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build the runtime for `cfg`.
    ///
    /// A native library that cannot be opened, or that lacks one of the configured
    /// entry points, is a build-fatal error: no item is attempted.
    pub fn from_config(cfg: &BuildConfig) -> BuildResult<BuildRuntime> {
        let library = native::open(cfg.native.library.as_deref(), &cfg.native.symbols)?;
        let registry = LocalProcessorFactory::registry(Arc::clone(&library))?;
        let executor = ExecutorFactory::from_config(cfg);

        Ok(BuildRuntime {
            library,
            registry: Arc::new(registry),
            executor,
            failure_strategy: cfg.failure_strategy,
            params_extension: cfg.params_extension().to_string(),
        })
    }
}
