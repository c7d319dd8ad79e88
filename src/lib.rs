// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! asset-mill: a content build pipeline.
//!
//! Source assets are discovered under an input tree, matched to a processor type by
//! extension, and built by staged processors (`reset`, `begin`, then
//! `read`/`process`/`write` in a loop, then `end`) on a pool of workers. Each worker
//! owns its processor instances, so a processor never runs on two threads at once.

pub mod backends;   // processor implementations
pub mod config;     // config + registry + runtime wiring
pub mod content;    // content items, params, item context
pub mod engine;     // executors, workers, output, reports
pub mod errors;     // error handling
pub mod native;     // native image library boundary
pub mod observability;
pub mod traits;     // processor + executor abstractions
