// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::processors::{blob, texture, BlobProcessor, TextureProcessor};
use crate::config::{ProcessorDescriptor, ProcessorRegistry};
use crate::errors::RegistryError;
use crate::native::NativeLibrary;

/// Registers the built-in (in-process) processor types.
pub struct LocalProcessorFactory;

impl LocalProcessorFactory {
    /// Descriptors for every built-in processor type.
    ///
    /// - "texture" -> TextureProcessor (decodes through `library`)
    /// - "blob" -> BlobProcessor
    pub fn descriptors(library: Arc<NativeLibrary>) -> Vec<ProcessorDescriptor> {
        vec![
            ProcessorDescriptor::new(
                texture::DISPLAY_NAME,
                texture::CONTENT_TYPE,
                texture::EXTENSIONS,
                move || Box::new(TextureProcessor::new(Arc::clone(&library))),
            ),
            ProcessorDescriptor::new(blob::DISPLAY_NAME, blob::CONTENT_TYPE, blob::EXTENSIONS, || {
                Box::new(BlobProcessor::default())
            }),
        ]
    }

    /// Register every built-in processor type with `registry`.
    pub fn register_all(registry: &mut ProcessorRegistry, library: Arc<NativeLibrary>) -> Result<(), RegistryError> {
        for descriptor in Self::descriptors(library) {
            registry.register(descriptor)?;
        }
        Ok(())
    }

    /// A registry holding only the built-in processor types.
    pub fn registry(library: Arc<NativeLibrary>) -> Result<ProcessorRegistry, RegistryError> {
        let mut registry = ProcessorRegistry::new();
        Self::register_all(&mut registry, library)?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_table_driven() {
        struct TestCase {
            extension: &'static str,
            expected_type: &'static str,
            expected_processor: &'static str,
        }

        let test_cases = vec![
            TestCase {
                extension: "png",
                expected_type: "texture",
                expected_processor: "texture",
            },
            TestCase {
                extension: "JPEG",
                expected_type: "texture",
                expected_processor: "texture",
            },
            TestCase {
                extension: "wav",
                expected_type: "blob",
                expected_processor: "blob",
            },
            TestCase {
                extension: ".json",
                expected_type: "blob",
                expected_processor: "blob",
            },
        ];

        let registry = LocalProcessorFactory::registry(NativeLibrary::builtin()).unwrap();
        for test_case in test_cases {
            let descriptor = registry
                .for_extension(test_case.extension)
                .unwrap_or_else(|e| panic!("Extension '{}' failed: {}", test_case.extension, e));
            assert_eq!(descriptor.content_type(), test_case.expected_type);
            assert_eq!(descriptor.create().name(), test_case.expected_processor);
        }
    }

    #[test]
    fn test_registering_twice_conflicts() {
        let library = NativeLibrary::builtin();
        let mut registry = LocalProcessorFactory::registry(library.clone()).unwrap();

        let err = LocalProcessorFactory::register_all(&mut registry, library).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateContentType { .. }));
        assert_eq!(registry.len(), 2);
    }
}
