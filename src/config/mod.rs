// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod registry;
mod runtime;

#[cfg(test)]
mod integration_tests;
pub mod consts;

pub use loader::{
    load_and_validate_config, load_config, parse_config, BuildConfig, ConfigFormat, ExecutorOptions,
    NativeConfig, Strategy,
};
pub use registry::{ProcessorDescriptor, ProcessorFactoryFn, ProcessorRegistry};
pub use runtime::{BuildRuntime, RuntimeBuilder};
