// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Key/value parameter blocks read from content declarations.
//!
//! A block is built line by line while a project or sidecar file is parsed and is
//! read-only afterwards. Keys are unique and case-sensitive. The sentinel key `!!`
//! never becomes a stored key: its values are appended to the comment list.

use std::str::FromStr;

/// Sentinel key whose values are collected as comments.
pub const COMMENT_KEY: &str = "!!";

/// Prefix marking internal/directive keys that are hidden from the standard view.
pub const DIRECTIVE_PREFIX: char = '!';

/// Prefix of a comment line in a parameter file.
pub const COMMENT_LINE_PREFIX: char = '#';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamBlock {
    entries: Vec<(String, String)>,
    comments: Vec<String>,
}

/// A line `parse_lines` could not take into the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    /// One-based line number within the parsed text.
    pub line_number: usize,
    pub line: String,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The line has no whitespace separating a key from a value.
    Malformed,
    /// The key was already present in the block.
    DuplicateKey,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Malformed => "missing whitespace between key and value",
            RejectReason::DuplicateKey => "duplicate key",
        }
    }
}

impl ParamBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair, refusing keys that are already present.
    ///
    /// The sentinel key `!!` always succeeds and appends `value` to the comment
    /// list instead.
    ///
    /// ```
    /// use asset_mill::content::ParamBlock;
    ///
    /// let mut block = ParamBlock::new();
    /// assert!(block.try_add("width", "10"));
    /// assert!(!block.try_add("width", "20"));
    /// assert_eq!(block.try_get("width"), Some("10"));
    /// ```
    pub fn try_add(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if key == COMMENT_KEY {
            self.comments.push(value.into());
            return true;
        }
        if self.contains_key(&key) {
            return false;
        }
        self.entries.push((key, value.into()));
        true
    }

    /// Split `line` at its first space or tab and add the result.
    ///
    /// The value has leading whitespace trimmed and is empty when the separator is
    /// the last character. Lines without any space or tab are rejected without
    /// touching the block.
    pub fn try_parse(&mut self, line: &str) -> bool {
        match split_line(line) {
            Some((key, value)) => self.try_add(key, value),
            None => false,
        }
    }

    /// Linear, case-sensitive lookup returning the first match.
    pub fn try_get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up `key` and parse its value.
    ///
    /// Returns `None` when the key is absent, `Some(Err(_))` when the value does not
    /// parse as `T`.
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Option<Result<T, T::Err>> {
        self.try_get(key).map(|v| v.trim().parse::<T>())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.comments.is_empty()
    }

    /// Copy of the comment list, in insertion order.
    pub fn comments(&self) -> Vec<String> {
        self.comments.clone()
    }

    /// Copy of the entries whose key does not start with `!`.
    pub fn standard_params(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter(|(k, _)| !k.starts_with(DIRECTIVE_PREFIX))
            .cloned()
            .collect()
    }

    /// Parse a whole parameter file.
    ///
    /// Blank lines are skipped and lines starting with `#` are stored as comments.
    /// Every other line goes through [`ParamBlock::try_parse`]; lines it refuses are
    /// returned so the caller can warn and move on.
    pub fn parse_lines(text: &str) -> (Self, Vec<RejectedLine>) {
        let mut block = Self::new();
        let mut rejected = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            let trimmed = line.trim_start();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(comment) = trimmed.strip_prefix(COMMENT_LINE_PREFIX) {
                block.try_add(COMMENT_KEY, comment.trim());
                continue;
            }

            let reason = match split_line(trimmed) {
                None => Some(RejectReason::Malformed),
                Some((key, value)) if !block.try_add(key, value) => Some(RejectReason::DuplicateKey),
                Some(_) => None,
            };

            if let Some(reason) = reason {
                rejected.push(RejectedLine {
                    line_number: index + 1,
                    line: line.to_string(),
                    reason,
                });
            }
        }

        (block, rejected)
    }
}

fn split_line(line: &str) -> Option<(&str, &str)> {
    let split = line.find([' ', '\t'])?;
    let key = &line[..split];
    let value = line[split + 1..].trim_start();
    Some((key, value))
}
