// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::{ConfigError, NativeError, RegistryError};

/// Failures that stop a whole build rather than a single item.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Native(#[from] NativeError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Walking the input tree failed.
    #[error("Failed to enumerate content under '{root}': {reason}")]
    Discovery { root: String, reason: String },

    /// Two source files map to the same logical item name.
    #[error("Content items '{first}' and '{second}' both map to item name '{name}'")]
    DuplicateItem {
        name: String,
        first: String,
        second: String,
    },

    /// A worker stopped without returning its results.
    #[error("Build worker {worker_id} terminated abnormally: {reason}")]
    WorkerFailed { worker_id: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BuildResult<T> = Result<T, BuildError>;
