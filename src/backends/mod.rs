// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Processor implementations for asset-mill.
//!
//! Each processor implements the staged [`Processor`](crate::traits::Processor)
//! contract and is made available to a build by registering a
//! [`ProcessorDescriptor`](crate::config::ProcessorDescriptor) for its content type.
//!
//! # Available Backends
//!
//! ## Local Backend
//! In-process processors shipped with the tool:
//! - **texture**: whole-file image import through the native image library, with
//!   optional downsizing and alpha premultiplication
//! - **blob**: chunked pass-through for arbitrary files, one loop iteration per chunk
//!
//! ## Stub Backend (Test-Only)
//! Processors that record stage calls, fail or panic in a chosen stage, or hold
//! native buffers. Only compiled for tests.
//!
//! # Examples
//!
//! ```rust
//! use asset_mill::backends::local::LocalProcessorFactory;
//! use asset_mill::native::NativeLibrary;
//!
//! let registry = LocalProcessorFactory::registry(NativeLibrary::builtin())?;
//! assert!(registry.contains("texture"));
//! assert_eq!(registry.for_extension("wav")?.content_type(), "blob");
//! # Ok::<(), asset_mill::errors::RegistryError>(())
//! ```

pub mod local;
#[cfg(test)]
pub mod stub;
