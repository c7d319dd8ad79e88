// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::time::Duration;

use crate::content::ContentItem;
use crate::errors::ItemError;
use crate::observability::LogRecord;

/// Result of one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Built {
        bytes: usize,
        loops: usize,
        compress: bool,
    },
    Failed {
        message: String,
        /// Where the failure was raised, e.g. `texture::read (src/x.rs:40)`.
        site: String,
        causes: Vec<String>,
    },
    Skipped {
        reason: String,
    },
}

impl ItemOutcome {
    pub fn failed(error: &ItemError) -> Self {
        ItemOutcome::Failed {
            message: error.message().to_string(),
            site: error.site().to_string(),
            causes: error.cause_chain(),
        }
    }

    pub fn is_built(&self) -> bool {
        matches!(self, ItemOutcome::Built { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ItemOutcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ItemOutcome::Skipped { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemReport {
    pub name: String,
    pub batch_index: usize,
    pub content_type: String,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<LogRecord>,
}

impl ItemReport {
    pub fn new(item: &ContentItem, outcome: ItemOutcome) -> Self {
        Self {
            name: item.name().to_string(),
            batch_index: item.batch_index(),
            content_type: item.content_type().to_string(),
            outcome,
            diagnostics: Vec::new(),
        }
    }
}

/// Per-item outcomes of a build, in batch order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    pub executor: String,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub aborted: bool,
    pub duration_ms: u128,
    pub items: Vec<ItemReport>,
}

impl BuildReport {
    /// Assemble a report; items are sorted by batch index.
    pub fn new(executor: &str, mut items: Vec<ItemReport>, aborted: bool, duration: Duration) -> Self {
        items.sort_by_key(|item| item.batch_index);
        let count = |f: fn(&ItemOutcome) -> bool| items.iter().filter(|i| f(&i.outcome)).count();
        Self {
            executor: executor.to_string(),
            succeeded: count(ItemOutcome::is_built),
            failed: count(ItemOutcome::is_failed),
            skipped: count(ItemOutcome::is_skipped),
            aborted,
            duration_ms: duration.as_millis(),
            items,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }

    pub fn item(&self, name: &str) -> Option<&ItemReport> {
        self.items.iter().find(|i| i.name == name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(name: &str, batch_index: usize, outcome: ItemOutcome) -> ItemReport {
        ItemReport::new(&ContentItem::new(name, "bin", "blob", batch_index, name), outcome)
    }

    #[test]
    fn test_report_counts_and_orders() {
        let items = vec![
            report("c", 2, ItemOutcome::Skipped { reason: "aborted".into() }),
            report(
                "a",
                0,
                ItemOutcome::Built {
                    bytes: 10,
                    loops: 1,
                    compress: false,
                },
            ),
            report(
                "b",
                1,
                ItemOutcome::Failed {
                    message: "bad".into(),
                    site: "x.rs:1".into(),
                    causes: vec![],
                },
            ),
        ];

        let report = BuildReport::new("serial", items, true, Duration::from_millis(5));

        assert_eq!((report.succeeded, report.failed, report.skipped), (1, 1, 1));
        assert_eq!(
            report.items.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        assert!(!report.is_success());
        assert!(report.item("b").unwrap().outcome.is_failed());
    }

    #[test]
    fn test_report_json_shape() {
        let items = vec![report(
            "a",
            0,
            ItemOutcome::Built {
                bytes: 3,
                loops: 2,
                compress: true,
            },
        )];
        let json = BuildReport::new("worker_pool", items, false, Duration::ZERO)
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["items"][0]["status"], "built");
        assert_eq!(value["items"][0]["loops"], 2);
        assert!(value["items"][0].get("diagnostics").is_none());
        assert_eq!(value["succeeded"], 1);
    }
}
