// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Build-wide sink for item diagnostics.

use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;

use crate::observability::messages::item::ItemDiagnostic;
use crate::observability::messages::StructuredLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warn => write!(f, "warn"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One diagnostic line tagged with the item it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub item_name: String,
    pub batch_index: usize,
    pub message: String,
    pub severity: Severity,
    pub important: bool,
}

/// Receives every diagnostic a processor emits during a build.
///
/// Shared by all workers, so implementations must be thread-safe.
pub trait BuildLogger: Send + Sync {
    fn log(&self, record: LogRecord);
}

impl<T: BuildLogger + ?Sized> BuildLogger for std::sync::Arc<T> {
    fn log(&self, record: LogRecord) {
        (**self).log(record);
    }
}

/// Routes item diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl BuildLogger for TracingLogger {
    fn log(&self, record: LogRecord) {
        ItemDiagnostic {
            item_name: &record.item_name,
            batch_index: record.batch_index,
            message: &record.message,
            severity: record.severity,
            important: record.important,
        }
        .log();
    }
}

/// Keeps every record in memory, optionally forwarding it to another logger.
///
/// Used by the executor to attach diagnostics to the build report and by tests to
/// observe what a processor logged.
#[derive(Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<LogRecord>>,
    forward: Option<Box<dyn BuildLogger>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forwarding_to(logger: impl BuildLogger + 'static) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            forward: Some(Box::new(logger)),
        }
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Records logged for the item at `batch_index`.
    pub fn records_for(&self, batch_index: usize) -> Vec<LogRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.batch_index == batch_index)
            .cloned()
            .collect()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|r| r.severity == severity)
            .count()
    }
}

impl BuildLogger for MemoryLogger {
    fn log(&self, record: LogRecord) {
        if let Some(forward) = &self.forward {
            forward.log(record.clone());
        }
        self.records.lock().push(record);
    }
}
