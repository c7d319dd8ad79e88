// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for parameter file parsing.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A parameter line was skipped.
///
/// # Log Level
/// `warn!` - Validation failure, item still builds
///
/// # Example
/// ```
/// use asset_mill::observability::messages::params::ParamLineRejected;
///
/// let msg = ParamLineRejected {
///     source: "content/ui/button.png.params",
///     line_number: 4,
///     line: "max_size",
///     reason: "missing whitespace between key and value",
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct ParamLineRejected<'a> {
    pub source: &'a str,
    pub line_number: usize,
    pub line: &'a str,
    pub reason: &'a str,
}

impl Display for ParamLineRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: skipped parameter line '{}': {}",
            self.source, self.line_number, self.line, self.reason
        )
    }
}

impl StructuredLog for ParamLineRejected<'_> {
    fn log(&self) {
        tracing::warn!(
            source = self.source,
            line_number = self.line_number,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("params", span_name = name, source = self.source)
    }
}
