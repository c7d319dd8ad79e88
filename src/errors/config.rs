// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while loading or validating a build configuration
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file extension does not name a supported format
    UnsupportedFormat {
        path: PathBuf,
    },
    /// The file content could not be deserialized
    Parse {
        path: PathBuf,
        format: &'static str,
        reason: String,
    },
    /// A field holds a value that can never produce a working build
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Failed to read config '{}': {}", path.display(), source)
            }
            ConfigError::UnsupportedFormat { path } => {
                write!(
                    f,
                    "Unsupported config format for '{}': expected .yaml, .yml, .toml or .json",
                    path.display()
                )
            }
            ConfigError::Parse {
                path,
                format,
                reason,
            } => {
                write!(
                    f,
                    "Failed to parse {} config '{}': {}",
                    format,
                    path.display(),
                    reason
                )
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
