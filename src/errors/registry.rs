// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for processor registration and lookup.

use std::error::Error;
use std::fmt;

/// Errors that can occur while registering or resolving processor types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A processor type is already registered under this content-type tag
    DuplicateContentType { content_type: String },

    /// The extension is already claimed by another content type
    ExtensionConflict {
        extension: String,
        existing: String,
        requested: String,
    },

    /// No processor type is registered for the content-type tag
    UnknownContentType { content_type: String },

    /// No processor type claims the file extension
    UnsupportedExtension { extension: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateContentType { content_type } => {
                write!(f, "Content type '{}' is already registered", content_type)
            }
            RegistryError::ExtensionConflict {
                extension,
                existing,
                requested,
            } => {
                write!(
                    f,
                    "Extension '{}' is already claimed by '{}' and cannot be registered for '{}'",
                    extension, existing, requested
                )
            }
            RegistryError::UnknownContentType { content_type } => {
                write!(f, "No processor registered for content type '{}'", content_type)
            }
            RegistryError::UnsupportedExtension { extension } => {
                write!(f, "No processor registered for extension '{}'", extension)
            }
        }
    }
}

impl Error for RegistryError {}
