// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::RegistryError;
use crate::traits::Processor;

/// Constructs a fresh processor; called once per worker per content type.
pub type ProcessorFactoryFn = Arc<dyn Fn() -> Box<dyn Processor> + Send + Sync>;

/// Registration metadata for one processor type.
///
/// Metadata only: the registry never calls into a processor, it hands the factory
/// to whichever worker needs an instance.
#[derive(Clone)]
pub struct ProcessorDescriptor {
    display_name: String,
    content_type: String,
    extensions: Vec<String>,
    factory: ProcessorFactoryFn,
}

impl ProcessorDescriptor {
    pub fn new<F>(display_name: impl Into<String>, content_type: impl Into<String>, extensions: &[&str], factory: F) -> Self
    where
        F: Fn() -> Box<dyn Processor> + Send + Sync + 'static,
    {
        Self {
            display_name: display_name.into(),
            content_type: content_type.into(),
            extensions: extensions.iter().map(|e| normalize_extension(e)).collect(),
            factory: Arc::new(factory),
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Default extensions, lower case without a leading dot.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn create(&self) -> Box<dyn Processor> {
        (self.factory)()
    }
}

impl fmt::Debug for ProcessorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorDescriptor")
            .field("display_name", &self.display_name)
            .field("content_type", &self.content_type)
            .field("extensions", &self.extensions)
            .finish()
    }
}

/// Maps content-type tags and file extensions to processor types.
///
/// Populated explicitly at startup; lookups are read-only afterwards and the
/// registry is shared between workers behind an `Arc`.
///
/// # Example
/// ```
/// use asset_mill::config::{ProcessorDescriptor, ProcessorRegistry};
/// use asset_mill::backends::local::BlobProcessor;
///
/// let mut registry = ProcessorRegistry::new();
/// registry
///     .register(ProcessorDescriptor::new("Raw Blob", "blob", &["bin", ".DAT"], || {
///         Box::new(BlobProcessor::default())
///     }))
///     .unwrap();
///
/// assert_eq!(registry.for_extension("dat").unwrap().content_type(), "blob");
/// assert!(registry.get("texture").is_err());
/// ```
#[derive(Debug, Default)]
pub struct ProcessorRegistry {
    descriptors: Vec<ProcessorDescriptor>,
    by_type: HashMap<String, usize>,
    by_extension: HashMap<String, usize>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a processor type.
    ///
    /// Fails without changing the registry when the content type is already taken
    /// or one of its extensions belongs to another type.
    pub fn register(&mut self, descriptor: ProcessorDescriptor) -> Result<(), RegistryError> {
        if self.by_type.contains_key(descriptor.content_type()) {
            return Err(RegistryError::DuplicateContentType {
                content_type: descriptor.content_type().to_string(),
            });
        }
        for extension in descriptor.extensions() {
            if let Some(&existing) = self.by_extension.get(extension) {
                return Err(RegistryError::ExtensionConflict {
                    extension: extension.clone(),
                    existing: self.descriptors[existing].content_type().to_string(),
                    requested: descriptor.content_type().to_string(),
                });
            }
        }

        let index = self.descriptors.len();
        self.by_type.insert(descriptor.content_type().to_string(), index);
        for extension in descriptor.extensions() {
            self.by_extension.insert(extension.clone(), index);
        }
        tracing::debug!(
            content_type = descriptor.content_type(),
            display_name = descriptor.display_name(),
            extensions = ?descriptor.extensions(),
            "registered processor type"
        );
        self.descriptors.push(descriptor);
        Ok(())
    }

    pub fn get(&self, content_type: &str) -> Result<&ProcessorDescriptor, RegistryError> {
        self.by_type
            .get(content_type)
            .map(|&index| &self.descriptors[index])
            .ok_or_else(|| RegistryError::UnknownContentType {
                content_type: content_type.to_string(),
            })
    }

    /// Lookup by file extension; case-insensitive, a leading dot is ignored.
    pub fn for_extension(&self, extension: &str) -> Result<&ProcessorDescriptor, RegistryError> {
        let extension = normalize_extension(extension);
        self.by_extension
            .get(&extension)
            .map(|&index| &self.descriptors[index])
            .ok_or(RegistryError::UnsupportedExtension { extension })
    }

    pub fn contains(&self, content_type: &str) -> bool {
        self.by_type.contains_key(content_type)
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ProcessorDescriptor> {
        self.descriptors.iter()
    }

    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.content_type())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{RecordingProcessor, StageLog};

    fn descriptor(content_type: &str, extensions: &[&str]) -> ProcessorDescriptor {
        ProcessorDescriptor::new(
            format!("{} processor", content_type),
            content_type,
            extensions,
            || Box::new(RecordingProcessor::new(1, StageLog::default())),
        )
    }

    #[test]
    fn test_register_and_lookup_table_driven() {
        struct TestCase {
            name: &'static str,
            lookup: &'static str,
            expected_type: Option<&'static str>,
        }

        let mut registry = ProcessorRegistry::new();
        registry.register(descriptor("texture", &["png", "JPG"])).unwrap();
        registry.register(descriptor("blob", &[".bin"])).unwrap();

        let test_cases = vec![
            TestCase {
                name: "plain extension",
                lookup: "png",
                expected_type: Some("texture"),
            },
            TestCase {
                name: "registered upper case",
                lookup: "jpg",
                expected_type: Some("texture"),
            },
            TestCase {
                name: "lookup with dot and case",
                lookup: ".BIN",
                expected_type: Some("blob"),
            },
            TestCase {
                name: "unknown extension",
                lookup: "wav",
                expected_type: None,
            },
        ];

        for test_case in test_cases {
            let found = registry.for_extension(test_case.lookup).ok().map(|d| d.content_type());
            assert_eq!(found, test_case.expected_type, "Test case '{}' failed", test_case.name);
        }

        assert_eq!(registry.content_types().collect::<Vec<_>>(), vec!["texture", "blob"]);
    }

    #[test]
    fn test_duplicate_content_type_rejected() {
        let mut registry = ProcessorRegistry::new();
        registry.register(descriptor("texture", &["png"])).unwrap();

        let err = registry.register(descriptor("texture", &["tga"])).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateContentType {
                content_type: "texture".to_string()
            }
        );
        assert!(registry.for_extension("tga").is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_extension_conflict_leaves_registry_untouched() {
        let mut registry = ProcessorRegistry::new();
        registry.register(descriptor("texture", &["png"])).unwrap();

        let err = registry.register(descriptor("sprite", &["gif", "PNG"])).unwrap_err();
        assert!(matches!(err, RegistryError::ExtensionConflict { ref existing, .. } if existing == "texture"));
        assert!(!registry.contains("sprite"));
        assert!(registry.for_extension("gif").is_err());
    }

    #[test]
    fn test_factory_builds_fresh_instances() {
        let mut registry = ProcessorRegistry::new();
        registry.register(descriptor("blob", &["bin"])).unwrap();

        let descriptor = registry.get("blob").unwrap();
        let first = descriptor.create();
        let second = descriptor.create();
        assert_eq!(first.name(), "recording");
        assert_eq!(second.name(), "recording");
        assert!(matches!(
            registry.get("audio"),
            Err(RegistryError::UnknownContentType { .. })
        ));
    }
}
