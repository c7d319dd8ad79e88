// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::path::{Path, PathBuf};

/// Identity of one source asset within a build batch.
///
/// A `ContentItem` is immutable once constructed. The scheduler owns it (behind an
/// `Arc`) and hands shared references to the item context and to any `ItemError`
/// raised while the item is being built.
///
/// # Example
/// ```
/// use asset_mill::content::ContentItem;
///
/// let item = ContentItem::from_source(
///     "content",
///     "content/textures/ui/button.png",
///     "texture",
///     3,
/// );
///
/// assert_eq!(item.name(), "textures.ui.button");
/// assert_eq!(item.extension(), "png");
/// assert_eq!(item.batch_index(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    name: String,
    extension: String,
    content_type: String,
    batch_index: usize,
    source: PathBuf,
}

impl ContentItem {
    pub fn new(
        name: impl Into<String>,
        extension: impl Into<String>,
        content_type: impl Into<String>,
        batch_index: usize,
        source: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            extension: extension.into(),
            content_type: content_type.into(),
            batch_index,
            source: source.into(),
        }
    }

    /// Build an item from a source path found under `root`.
    ///
    /// The logical name is the path relative to `root` with its extension
    /// stripped and every separator (`/` or `\`) turned into a `.`. Paths that do
    /// not live under `root` are named from their full path instead.
    pub fn from_source(
        root: impl AsRef<Path>,
        path: impl AsRef<Path>,
        content_type: impl Into<String>,
        batch_index: usize,
    ) -> Self {
        let path = path.as_ref();
        let relative = path.strip_prefix(root.as_ref()).unwrap_or(path);
        let extension = relative
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            name: logical_name(relative),
            extension,
            content_type: content_type.into(),
            batch_index,
            source: path.to_path_buf(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source file extension, without the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Zero-based position within the current build batch.
    pub fn batch_index(&self) -> usize {
        self.batch_index
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl fmt::Display for ContentItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.batch_index)
    }
}

fn logical_name(relative: &Path) -> String {
    let text = relative.to_string_lossy();
    let stem = match (relative.extension(), text.rfind('.')) {
        (Some(_), Some(dot)) => &text[..dot],
        _ => &text[..],
    };

    stem.split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join(".")
}
