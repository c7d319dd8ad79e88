// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ProcessorRegistry;
use crate::engine::instance::ProcessorInstance;
use crate::errors::RegistryError;
use crate::observability::messages::item::ProcessorInstantiated;
use crate::observability::messages::StructuredLog;

/// The processor instances of one worker, one per content type.
///
/// The pool is owned by exactly one worker, so the `(worker, content type)` key of
/// an instance is implicit: the worker is whoever holds the pool. Instances are
/// created on first use and reused for every later item of the same type.
pub struct ProcessorPool {
    worker_id: usize,
    registry: Arc<ProcessorRegistry>,
    instances: HashMap<String, ProcessorInstance>,
}

impl ProcessorPool {
    pub fn new(worker_id: usize, registry: Arc<ProcessorRegistry>) -> Self {
        Self {
            worker_id,
            registry,
            instances: HashMap::new(),
        }
    }

    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    /// The instance for `content_type`, constructing it on first use.
    pub fn acquire(&mut self, content_type: &str) -> Result<&mut ProcessorInstance, RegistryError> {
        match self.instances.entry(content_type.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let descriptor = self.registry.get(content_type)?;
                let instance = ProcessorInstance::new(descriptor.content_type(), descriptor.create());
                ProcessorInstantiated {
                    content_type: descriptor.content_type(),
                    display_name: descriptor.display_name(),
                    worker_id: self.worker_id,
                }
                .log();
                Ok(entry.insert(instance))
            }
        }
    }

    pub fn contains(&self, content_type: &str) -> bool {
        self.instances.contains_key(content_type)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Dispose every instance and empty the pool.
    pub fn shutdown(&mut self) {
        for (_, mut instance) in self.instances.drain() {
            instance.dispose();
        }
    }
}

impl Drop for ProcessorPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ProcessorPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorPool")
            .field("worker_id", &self.worker_id)
            .field("content_types", &self.instances.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{BufferHoldingProcessor, RecordingProcessor, StageLog};
    use crate::config::ProcessorDescriptor;
    use crate::native::testing::{counting_library, Counters};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registry(created: Arc<AtomicUsize>) -> Arc<ProcessorRegistry> {
        let mut registry = ProcessorRegistry::new();
        registry
            .register(ProcessorDescriptor::new("Blob", "blob", &["bin"], move || {
                created.fetch_add(1, Ordering::SeqCst);
                Box::new(RecordingProcessor::new(1, StageLog::default()))
            }))
            .unwrap();
        Arc::new(registry)
    }

    #[test]
    fn test_instance_is_created_once_per_type() {
        let created = Arc::new(AtomicUsize::new(0));
        let mut pool = ProcessorPool::new(0, registry(created.clone()));

        pool.acquire("blob").unwrap();
        pool.acquire("blob").unwrap();

        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert_eq!(pool.len(), 1);
        assert!(pool.contains("blob"));
    }

    #[test]
    fn test_pools_never_share_instances() {
        let created = Arc::new(AtomicUsize::new(0));
        let registry = registry(created.clone());
        let mut first = ProcessorPool::new(0, registry.clone());
        let mut second = ProcessorPool::new(1, registry);

        first.acquire("blob").unwrap();
        second.acquire("blob").unwrap();

        assert_eq!(created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unknown_type_is_registry_error() {
        let mut pool = ProcessorPool::new(0, registry(Arc::new(AtomicUsize::new(0))));

        assert!(matches!(
            pool.acquire("texture"),
            Err(RegistryError::UnknownContentType { .. })
        ));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_shutdown_disposes_instances() {
        let library = counting_library();
        let mut registry = ProcessorRegistry::new();
        let factory_library = library.clone();
        registry
            .register(ProcessorDescriptor::new("Holder", "texture", &["png"], move || {
                Box::new(BufferHoldingProcessor::new(factory_library.clone()))
            }))
            .unwrap();

        let mut pool = ProcessorPool::new(0, Arc::new(registry));
        let item = Arc::new(crate::content::ContentItem::new("a", "png", "texture", 0, "a.png"));
        let logger = crate::observability::MemoryLogger::new();
        pool.acquire("texture")
            .unwrap()
            .run(
                &item,
                &crate::content::ParamBlock::new(),
                &logger,
                &mut std::io::Cursor::new(Vec::new()),
                &mut Vec::new(),
            )
            .unwrap();

        pool.shutdown();
        assert!(pool.is_empty());
        assert_eq!(Counters::heap_frees(), 1);

        drop(pool);
        assert_eq!(Counters::heap_frees(), 1);
    }
}
