// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_PARAMS_EXTENSION, FALLBACK_WORKER_COUNT, MAX_WORKERS};
use crate::errors::{ConfigError, FailureStrategy};
use crate::native::NativeSymbols;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for a content build.
///
/// # Fields
/// * `input_root` - Directory walked for source assets
/// * `output_root` - Directory built items are written to
/// * `strategy` - How items are dispatched to processors
/// * `failure_strategy` - How to react to a failed item (defaults to ContinueOnError)
/// * `executor_options` - Executor-specific options (optional)
/// * `native` - Native image library selection (optional, builtin backend when absent)
/// * `params_extension` - Extension of per-item parameter sidecar files
///
/// # Example
/// ```yaml
/// input_root: "content"
/// output_root: "build/content"
/// strategy: worker_pool
/// failure_strategy: fail_fast
/// executor_options:
///   max_workers: 4
/// native:
///   library: "lib/libstb_image.so"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub failure_strategy: FailureStrategy,
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    #[serde(default)]
    pub native: NativeConfig,
    #[serde(default = "default_params_extension")]
    pub params_extension: String,
}

fn default_params_extension() -> String {
    DEFAULT_PARAMS_EXTENSION.to_string()
}

/// Dispatch strategy for a build.
///
/// # Variants
/// * `WorkerPool` - Items spread over a fixed set of worker threads
/// * `Serial` - Items built one after another on a single worker
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    WorkerPool,
    Serial,
}

/// Executor-specific configuration options.
///
/// # Fields
/// * `max_workers` - Number of worker threads (optional, defaults to available parallelism)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutorOptions {
    pub max_workers: Option<usize>,
}

impl ExecutorOptions {
    /// Configured worker count, or the machine's parallelism, clamped to `1..=MAX_WORKERS`.
    pub fn worker_count(&self) -> usize {
        self.max_workers
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(FALLBACK_WORKER_COUNT)
            })
            .clamp(1, MAX_WORKERS)
    }
}

/// Native image library selection.
///
/// # Example
/// ```yaml
/// native:
///   library: "lib/libstb_image.so"
///   symbols:
///     load: "stbi_load"
///     resize: "stbir_resize_uint8"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeConfig {
    pub library: Option<PathBuf>,
    #[serde(default)]
    pub symbols: NativeSymbols,
}

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "toml" => Some(ConfigFormat::Toml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Json => "JSON",
        }
    }
}

/// Parse configuration text in the given format.
pub fn parse_config(text: &str, format: ConfigFormat, path: &Path) -> Result<BuildConfig, ConfigError> {
    let parse_error = |reason: String| ConfigError::Parse {
        path: path.to_path_buf(),
        format: format.name(),
        reason,
    };
    match format {
        ConfigFormat::Yaml => serde_yaml::from_str(text).map_err(|e| parse_error(e.to_string())),
        ConfigFormat::Toml => toml::from_str(text).map_err(|e| parse_error(e.to_string())),
        ConfigFormat::Json => serde_json::from_str(text).map_err(|e| parse_error(e.to_string())),
    }
}

/// Load a config file; the format is chosen by extension.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BuildConfig, ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, format, path)
}

/// Load a config file and reject values that can never produce a working build.
///
/// Relative roots and library paths are resolved against the config file's directory.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<BuildConfig, ConfigError> {
    let path = path.as_ref();
    let mut cfg = load_config(path)?;
    if let Some(base) = path.parent() {
        cfg.resolve_relative_to(base);
    }
    cfg.validate()?;
    Ok(cfg)
}

impl BuildConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_root.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "input_root",
                reason: "must not be empty".to_string(),
            });
        }
        if self.output_root.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "output_root",
                reason: "must not be empty".to_string(),
            });
        }
        if self.output_root == self.input_root {
            return Err(ConfigError::InvalidValue {
                field: "output_root",
                reason: "must differ from input_root".to_string(),
            });
        }
        let extension = self.params_extension.trim_start_matches('.');
        if extension.is_empty() || extension.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                field: "params_extension",
                reason: format!("'{}' is not a file extension", self.params_extension),
            });
        }
        if let Some((field, _)) = self
            .native
            .symbols
            .entries()
            .into_iter()
            .find(|(_, symbol)| symbol.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: "native.symbols",
                reason: format!("entry point '{}' has an empty symbol name", field),
            });
        }
        Ok(())
    }

    /// Sidecar extension without a leading dot.
    pub fn params_extension(&self) -> &str {
        self.params_extension.trim_start_matches('.')
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() && !p.as_os_str().is_empty() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.input_root);
        resolve(&mut self.output_root);
        if let Some(library) = self.native.library.as_mut() {
            resolve(library);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_config() {
        let yaml = r#"
input_root: content
output_root: build
strategy: serial
failure_strategy: fail_fast
"#;

        let cfg: BuildConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.strategy, Strategy::Serial);
        assert_eq!(cfg.failure_strategy, FailureStrategy::FailFast);
        assert_eq!(cfg.params_extension(), "params");
        assert!(cfg.native.library.is_none());
    }

    #[test]
    fn test_parse_config_table_driven() {
        struct TestCase {
            name: &'static str,
            format: ConfigFormat,
            text: &'static str,
            expected_workers: Option<usize>,
            expected_strategy: Strategy,
        }

        let test_cases = vec![
            TestCase {
                name: "yaml with workers",
                format: ConfigFormat::Yaml,
                text: "input_root: a\noutput_root: b\nexecutor_options:\n  max_workers: 3\n",
                expected_workers: Some(3),
                expected_strategy: Strategy::WorkerPool,
            },
            TestCase {
                name: "toml serial",
                format: ConfigFormat::Toml,
                text: "input_root = \"a\"\noutput_root = \"b\"\nstrategy = \"serial\"\n",
                expected_workers: None,
                expected_strategy: Strategy::Serial,
            },
            TestCase {
                name: "json with native symbols",
                format: ConfigFormat::Json,
                text: r#"{"input_root":"a","output_root":"b","native":{"symbols":{"free":"stb_free"}}}"#,
                expected_workers: None,
                expected_strategy: Strategy::WorkerPool,
            },
        ];

        for test_case in test_cases {
            let cfg = parse_config(test_case.text, test_case.format, Path::new("cfg"))
                .unwrap_or_else(|e| panic!("Test case '{}' failed: {}", test_case.name, e));
            assert_eq!(
                cfg.executor_options.max_workers, test_case.expected_workers,
                "Test case '{}' failed",
                test_case.name
            );
            assert_eq!(
                cfg.strategy, test_case.expected_strategy,
                "Test case '{}' failed",
                test_case.name
            );
            assert!(cfg.validate().is_ok(), "Test case '{}' failed", test_case.name);
        }
    }

    #[test]
    fn test_load_selects_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.toml");
        std::fs::write(&path, "input_root = \"src\"\noutput_root = \"out\"\n").unwrap();

        let cfg = load_and_validate_config(&path).unwrap();
        assert_eq!(cfg.input_root, dir.path().join("src"));
        assert_eq!(cfg.output_root, dir.path().join("out"));
    }

    #[test]
    fn test_unsupported_format_rejected() {
        let result = load_config("build.ini");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_config("/nonexistent/asset-mill/build.yaml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_parse_error_names_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.json");
        std::fs::write(&path, "{ not json").unwrap();

        let error = load_config(&path).unwrap_err();
        assert!(error.to_string().contains("JSON"));
    }

    #[test]
    fn test_validation_failures() {
        struct TestCase {
            name: &'static str,
            yaml: &'static str,
            field: &'static str,
        }

        let test_cases = vec![
            TestCase {
                name: "empty input root",
                yaml: "input_root: ''\noutput_root: b\n",
                field: "input_root",
            },
            TestCase {
                name: "same roots",
                yaml: "input_root: a\noutput_root: a\n",
                field: "output_root",
            },
            TestCase {
                name: "bad params extension",
                yaml: "input_root: a\noutput_root: b\nparams_extension: 'x/y'\n",
                field: "params_extension",
            },
            TestCase {
                name: "blank symbol",
                yaml: "input_root: a\noutput_root: b\nnative:\n  symbols:\n    resize: ' '\n",
                field: "native.symbols",
            },
        ];

        for test_case in test_cases {
            let cfg: BuildConfig = serde_yaml::from_str(test_case.yaml).unwrap();
            match cfg.validate() {
                Err(ConfigError::InvalidValue { field, .. }) => {
                    assert_eq!(field, test_case.field, "Test case '{}' failed", test_case.name)
                }
                other => panic!("Test case '{}' failed: {:?}", test_case.name, other),
            }
        }
    }

    #[test]
    fn test_worker_count_is_clamped() {
        let options = ExecutorOptions {
            max_workers: Some(0),
        };
        assert_eq!(options.worker_count(), 1);

        let options = ExecutorOptions {
            max_workers: Some(10_000),
        };
        assert_eq!(options.worker_count(), MAX_WORKERS);

        assert!(ExecutorOptions::default().worker_count() >= 1);
    }
}
