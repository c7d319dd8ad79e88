// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-item failures correlated to the content item and the call site that raised them.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use crate::content::ContentItem;

/// Boxed cause carried by an [`ItemError`].
pub type BoxedCause = Box<dyn Error + Send + Sync + 'static>;

/// Source location an [`ItemError`] was raised from.
///
/// File, line and column come from `#[track_caller]` or, for a panic, from the
/// panic itself. The [`throw!`](crate::throw) macro records the enclosing function;
/// otherwise the executor fills in `<processor>::<stage>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub function: Option<Cow<'static, str>>,
    pub file: Cow<'static, str>,
    pub line: u32,
    pub column: u32,
}

impl CallSite {
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller(), None)
    }

    pub fn from_location(location: &'static Location<'static>, function: Option<&'static str>) -> Self {
        Self {
            function: function.map(Cow::Borrowed),
            file: Cow::Borrowed(location.file()),
            line: location.line(),
            column: location.column(),
        }
    }

    /// A site that is not a `'static` location, such as one captured by a panic hook.
    pub fn at(file: impl Into<Cow<'static, str>>, line: u32, column: u32) -> Self {
        Self {
            function: None,
            file: file.into(),
            line,
            column,
        }
    }

    pub fn with_function(mut self, function: impl Into<Cow<'static, str>>) -> Self {
        self.function = Some(function.into());
        self
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.function {
            Some(function) => write!(f, "{} ({}:{})", function, self.file, self.line),
            None => write!(f, "{}:{}", self.file, self.line),
        }
    }
}

/// A fatal condition for one content item.
///
/// Raised by a processor stage (usually through [`ItemContext`](crate::content::ItemContext))
/// and caught by the executor, which records it against the item and carries on with
/// the rest of the batch. It is never retried.
#[derive(Debug)]
pub struct ItemError {
    message: String,
    item: Arc<ContentItem>,
    site: CallSite,
    cause: Option<BoxedCause>,
}

pub type ItemResult<T> = Result<T, ItemError>;

impl ItemError {
    pub fn new(
        message: impl Into<String>,
        item: Arc<ContentItem>,
        site: CallSite,
        cause: Option<BoxedCause>,
    ) -> Self {
        Self {
            message: message.into(),
            item,
            site,
            cause,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn item(&self) -> &Arc<ContentItem> {
        &self.item
    }

    pub fn site(&self) -> &CallSite {
        &self.site
    }

    /// Name the function the error was raised in, unless it is already known.
    pub fn or_function(mut self, function: impl FnOnce() -> String) -> Self {
        if self.site.function.is_none() {
            self.site.function = Some(Cow::Owned(function()));
        }
        self
    }

    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Display text of every error in the cause chain, outermost first.
    pub fn cause_chain(&self) -> Vec<String> {
        let mut chain = Vec::new();
        let mut next: Option<&(dyn Error + 'static)> = self.source();
        while let Some(err) = next {
            chain.push(err.to_string());
            next = err.source();
        }
        chain
    }
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Item '{}' (#{}) failed at {}: {}",
            self.item.name(),
            self.item.batch_index(),
            self.site,
            self.message
        )
    }
}

impl Error for ItemError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| cause.as_ref() as &(dyn Error + 'static))
    }
}

/// Name of the function enclosing the macro call site.
#[doc(hidden)]
#[macro_export]
macro_rules! __function_name {
    () => {{
        fn marker() {}
        let name = ::std::any::type_name_of_val(&marker);
        name.strip_suffix("::marker").unwrap_or(name)
    }};
}

/// Return early from a processor stage with an [`ItemError`] raised at this line.
///
/// Unlike the `ItemContext::throw*` methods, the macro also records the name of the
/// enclosing function.
///
/// ```
/// use asset_mill::content::{ContentItem, ItemContext, ParamBlock};
/// use asset_mill::errors::ItemResult;
/// use asset_mill::observability::MemoryLogger;
/// use std::sync::Arc;
///
/// fn check_header(ctx: &ItemContext<'_>, magic: &[u8]) -> ItemResult<()> {
///     if magic != b"MTEX" {
///         asset_mill::throw!(ctx, "bad magic {:?}", magic);
///     }
///     Ok(())
/// }
///
/// let item = Arc::new(ContentItem::new("ui.button", "png", "texture", 0, "ui/button.png"));
/// let params = ParamBlock::new();
/// let logger = MemoryLogger::new();
/// let ctx = ItemContext::new(&item, &params, &logger, 0);
///
/// let err = check_header(&ctx, b"NOPE").unwrap_err();
/// assert!(err.site().function.as_deref().unwrap().ends_with("check_header"));
/// ```
#[macro_export]
macro_rules! throw {
    ($ctx:expr, $($arg:tt)+) => {
        return ::std::result::Result::Err($ctx.throw_at(
            $crate::errors::CallSite::from_location(
                ::std::panic::Location::caller(),
                ::std::option::Option::Some($crate::__function_name!()),
            ),
            ::std::format!($($arg)+),
            ::std::option::Option::None,
        ))
    };
}
