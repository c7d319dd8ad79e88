// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod blob;
pub mod texture;

pub use blob::BlobProcessor;
pub use texture::TextureProcessor;
