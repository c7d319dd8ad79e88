// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod build;
mod config;
mod item;
mod native;
mod registry;

pub use build::{BuildError, BuildResult};
pub use config::ConfigError;
pub use item::{BoxedCause, CallSite, ItemError, ItemResult};
pub use native::{NativeError, NativeResult};
pub use registry::RegistryError;

use serde::Deserialize;

/// How the executor reacts to a failed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStrategy {
    /// Record the failure and keep building the remaining items.
    #[default]
    ContinueOnError,
    /// Stop dispatching new items after the first failure. Items already in
    /// flight on other workers still finish.
    FailFast,
}
