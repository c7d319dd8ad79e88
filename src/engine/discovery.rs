// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::config::ProcessorRegistry;
use crate::content::ContentItem;
use crate::errors::{BuildError, BuildResult};
use crate::observability::messages::build::ContentDiscovered;
use crate::observability::messages::StructuredLog;

/// Enumerate the content under `root`.
///
/// Files are visited in sorted path order and numbered in that order. Parameter
/// sidecars (`*.<params_extension>`) and files no processor claims are ignored.
/// Two files with the same logical name (`hero.bin` and `hero.txt`) would overwrite
/// each other's output, so they fail discovery.
pub fn discover_items(
    root: &Path,
    registry: &ProcessorRegistry,
    params_extension: &str,
) -> BuildResult<Vec<Arc<ContentItem>>> {
    if !root.is_dir() {
        return Err(BuildError::Discovery {
            root: root.display().to_string(),
            reason: "not a directory".to_string(),
        });
    }

    let mut items = Vec::new();
    let mut sources: HashMap<String, PathBuf> = HashMap::new();
    let mut ignored = 0;
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| BuildError::Discovery {
            root: root.display().to_string(),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            ignored += 1;
            continue;
        };
        if extension.eq_ignore_ascii_case(params_extension) {
            continue;
        }
        match registry.for_extension(extension) {
            Ok(descriptor) => {
                let item = ContentItem::from_source(root, path, descriptor.content_type(), items.len());
                if let Some(first) = sources.get(item.name()) {
                    return Err(BuildError::DuplicateItem {
                        name: item.name().to_string(),
                        first: first.display().to_string(),
                        second: path.display().to_string(),
                    });
                }
                sources.insert(item.name().to_string(), path.to_path_buf());
                items.push(Arc::new(item));
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), reason = %e, "ignoring file");
                ignored += 1;
            }
        }
    }

    ContentDiscovered {
        root: &root.display().to_string(),
        item_count: items.len(),
        ignored_count: ignored,
    }
    .log();
    Ok(items)
}
