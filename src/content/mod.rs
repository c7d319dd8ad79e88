// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Content items and the per-item data a processor works with.

mod context;
mod item;
pub mod params;

pub use context::{ItemContext, ThrowExt};
pub use item::ContentItem;
pub use params::{ParamBlock, RejectReason, RejectedLine};
