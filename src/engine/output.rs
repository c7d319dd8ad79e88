// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::content::ContentItem;

/// Destination for finished item payloads.
///
/// Executors stage each item's output in memory and only hand it to the store once
/// every stage succeeded, so a failed item never leaves partial output behind.
pub trait OutputStore: Send + Sync {
    fn commit(&self, item: &ContentItem, payload: &[u8]) -> io::Result<()>;
}

/// Writes `<root>/<item name>.<content type>` files.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, item: &ContentItem) -> PathBuf {
        self.root
            .join(format!("{}.{}", item.name(), item.content_type()))
    }
}

impl OutputStore for DirectoryStore {
    fn commit(&self, item: &ContentItem, payload: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(item);
        let staging = path.with_extension(format!("{}.partial", item.content_type()));
        fs::write(&staging, payload)?;
        fs::rename(&staging, &path)
    }
}

/// Keeps payloads in memory; used for dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    payloads: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.payloads.lock().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.payloads.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.payloads.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.lock().is_empty()
    }
}

impl OutputStore for MemoryStore {
    fn commit(&self, item: &ContentItem, payload: &[u8]) -> io::Result<()> {
        self.payloads
            .lock()
            .insert(item.name().to_string(), payload.to_vec());
        Ok(())
    }
}
