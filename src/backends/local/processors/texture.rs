// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::io::{BufRead, Write};
use std::sync::Arc;

use crate::content::{ItemContext, ThrowExt};
use crate::errors::ItemResult;
use crate::native::{DecodedImage, HeapImage, NativeLibrary};
use crate::traits::Processor;

pub const CONTENT_TYPE: &str = "texture";
pub const DISPLAY_NAME: &str = "Texture";
pub const EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tga", "gif"];

/// Output magic of a built texture.
pub const MAGIC: &[u8; 4] = b"MTEX";

/// Whole-file texture importer.
///
/// The image is decoded through the native library in a single `read`, optionally
/// downsized through a native heap buffer, and written as
/// `MTEX | width u32 | height u32 | channels u32 | pixels` (little endian).
///
/// Parameters:
/// * `max_size` - longest side in pixels; larger images are downsized
/// * `premultiply` - `true` multiplies colour channels by alpha
pub struct TextureProcessor {
    library: Arc<NativeLibrary>,
    max_size: Option<u32>,
    premultiply: bool,
    decoded: Option<DecodedImage>,
    resized: Option<HeapImage>,
}

impl TextureProcessor {
    pub fn new(library: Arc<NativeLibrary>) -> Self {
        Self {
            library,
            max_size: None,
            premultiply: false,
            decoded: None,
            resized: None,
        }
    }

    /// Dimensions and pixels of the buffer that will be written.
    fn current(&self, ctx: &ItemContext<'_>) -> ItemResult<(u32, u32, u32, &[u8])> {
        let (width, height, channels, pixels) = match (&self.resized, &self.decoded) {
            (Some(buffer), _) => (buffer.width(), buffer.height(), buffer.channels(), buffer.as_slice()),
            (None, Some(buffer)) => (buffer.width(), buffer.height(), buffer.channels(), buffer.as_slice()),
            (None, None) => return Err(ctx.throw("no image has been read")),
        };
        let pixels = pixels.or_throw(ctx, "image buffer is no longer available")?;
        Ok((width, height, channels, pixels))
    }

    fn downsize(&mut self, ctx: &ItemContext<'_>, max_size: u32) -> ItemResult<()> {
        let Some(decoded) = self.decoded.as_mut() else {
            return Err(ctx.throw("no image has been read"));
        };
        let (width, height) = (decoded.width(), decoded.height());
        let Some((to_width, to_height)) = fit_within(width, height, max_size) else {
            return Ok(());
        };

        let mut resized = self
            .library
            .allocate(to_width, to_height, decoded.channels())
            .or_throw(ctx, "failed to allocate resize target")?;
        self.library
            .resize(decoded, &mut resized)
            .or_throw(ctx, "failed to resize texture")?;

        // The source pixels are not needed past this point.
        decoded
            .release()
            .or_throw(ctx, "failed to release decoded image")?;
        self.resized = Some(resized);

        ctx.info(format!(
            "Downsized from {}x{} to {}x{}",
            width, height, to_width, to_height
        ));
        Ok(())
    }
}

impl Processor for TextureProcessor {
    fn name(&self) -> &'static str {
        "texture"
    }

    fn reset(&mut self) {
        self.max_size = None;
        self.premultiply = false;
        self.decoded = None;
        self.resized = None;
    }

    fn begin(&mut self, ctx: &ItemContext<'_>, input: &mut dyn BufRead) -> ItemResult<()> {
        let header = input.fill_buf().or_throw(ctx, "failed to read texture source")?;
        if header.is_empty() {
            return Err(ctx.throw("texture source is empty"));
        }

        self.max_size = match ctx.params().get_parsed::<u32>("max_size") {
            None => None,
            Some(Ok(0)) => return Err(ctx.throw("max_size must be greater than zero")),
            Some(Ok(size)) => Some(size),
            Some(Err(e)) => return Err(ctx.throw_with("invalid max_size parameter", e)),
        };
        self.premultiply = match ctx.params().get_parsed::<bool>("premultiply") {
            None => false,
            Some(result) => result.or_throw(ctx, "invalid premultiply parameter")?,
        };
        Ok(())
    }

    fn read(&mut self, ctx: &ItemContext<'_>, _input: &mut dyn BufRead) -> ItemResult<bool> {
        let decoded = self
            .library
            .decode(ctx.source_path())
            .or_throw(ctx, "failed to import texture")?;
        self.decoded = Some(decoded);
        Ok(false)
    }

    fn process(&mut self, ctx: &ItemContext<'_>) -> ItemResult<()> {
        if let Some(max_size) = self.max_size {
            self.downsize(ctx, max_size)?;
        }
        if self.premultiply {
            let pixels = match (&mut self.resized, &mut self.decoded) {
                (Some(buffer), _) => buffer.as_mut_slice(),
                (None, Some(buffer)) => buffer.as_mut_slice(),
                (None, None) => return Err(ctx.throw("no image has been read")),
            };
            premultiply_alpha(pixels.or_throw(ctx, "image buffer is no longer available")?);
        }
        Ok(())
    }

    fn write(&mut self, ctx: &ItemContext<'_>, output: &mut dyn Write) -> ItemResult<()> {
        let (width, height, channels, pixels) = self.current(ctx)?;
        if ctx.is_first_loop() {
            let mut header = Vec::with_capacity(16);
            header.extend_from_slice(MAGIC);
            header.extend_from_slice(&width.to_le_bytes());
            header.extend_from_slice(&height.to_le_bytes());
            header.extend_from_slice(&channels.to_le_bytes());
            output.write_all(&header).or_throw(ctx, "failed to write texture header")?;
        }
        output.write_all(pixels).or_throw(ctx, "failed to write texture pixels")
    }

    fn end(&mut self, ctx: &ItemContext<'_>, output: &mut dyn Write) -> ItemResult<bool> {
        output.flush().or_throw(ctx, "failed to flush texture output")?;
        self.release_resources();
        Ok(true)
    }

    fn release_resources(&mut self) {
        self.resized = None;
        self.decoded = None;
    }
}

/// Scale `width x height` so the longest side is `max_size`; `None` when it already fits.
fn fit_within(width: u32, height: u32, max_size: u32) -> Option<(u32, u32)> {
    let longest = width.max(height);
    if longest <= max_size {
        return None;
    }
    let scale = |side: u32| ((side as u64 * max_size as u64) / longest as u64).max(1) as u32;
    Some((scale(width), scale(height)))
}

/// Multiply the colour channels of RGBA pixels by their alpha.
fn premultiply_alpha(pixels: &mut [u8]) {
    for pixel in pixels.chunks_exact_mut(4) {
        let alpha = pixel[3] as u16;
        for channel in &mut pixel[..3] {
            *channel = ((*channel as u16 * alpha + 127) / 255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentItem, ParamBlock};
    use crate::engine::ProcessorInstance;
    use crate::native::testing::{counting_library, png_file, png_file_filled, Counters};
    use crate::observability::MemoryLogger;
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;

    fn build(library: Arc<NativeLibrary>, path: &Path, params: &ParamBlock) -> (ItemResult<crate::engine::RunSummary>, Vec<u8>, MemoryLogger) {
        let item = Arc::new(ContentItem::from_source(path.parent().unwrap(), path, CONTENT_TYPE, 0));
        let logger = MemoryLogger::new();
        let mut instance = ProcessorInstance::new(CONTENT_TYPE, Box::new(TextureProcessor::new(library)));
        let mut input = BufReader::new(File::open(path).unwrap());
        let mut output = Vec::new();
        let result = instance.run(&item, params, &logger, &mut input, &mut output);
        (result, output, logger)
    }

    fn header(output: &[u8]) -> (u32, u32, u32) {
        assert_eq!(&output[..4], MAGIC);
        let word = |i: usize| u32::from_le_bytes(output[i..i + 4].try_into().unwrap());
        (word(4), word(8), word(12))
    }

    #[test]
    fn test_whole_file_texture_build() {
        let dir = tempfile::tempdir().unwrap();
        let path = png_file(dir.path(), "brick.png", 4, 2);

        let (result, output, _) = build(NativeLibrary::builtin(), &path, &ParamBlock::new());
        let summary = result.unwrap();

        assert_eq!(summary.loops, 1);
        assert!(summary.compress);
        assert_eq!(header(&output), (4, 2, 4));
        assert_eq!(output.len(), 16 + 4 * 2 * 4);
        assert_eq!(&output[16..20], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_max_size_downsizes_and_logs() {
        let dir = tempfile::tempdir().unwrap();
        let path = png_file(dir.path(), "sky.png", 16, 8);
        let mut params = ParamBlock::new();
        params.try_add("max_size", "4");

        let (result, output, logger) = build(NativeLibrary::builtin(), &path, &params);
        result.unwrap();

        assert_eq!(header(&output), (4, 2, 4));
        assert_eq!(output.len(), 16 + 4 * 2 * 4);
        assert!(logger.records()[0].message.contains("16x8 to 4x2"));
    }

    #[test]
    fn test_premultiply_parameter() {
        struct TestCase {
            name: &'static str,
            params: &'static [(&'static str, &'static str)],
            expected: [u8; 4],
        }

        let test_cases = vec![
            TestCase {
                name: "straight alpha by default",
                params: &[],
                expected: [200, 100, 50, 128],
            },
            TestCase {
                name: "premultiplied",
                params: &[("premultiply", "true")],
                expected: [100, 50, 25, 128],
            },
        ];

        let dir = tempfile::tempdir().unwrap();
        for test_case in test_cases {
            let path = png_file_filled(dir.path(), "glass.png", 2, 1, [200, 100, 50, 128]);
            let mut params = ParamBlock::new();
            for (key, value) in test_case.params {
                params.try_add(*key, *value);
            }

            let (result, output, _) = build(NativeLibrary::builtin(), &path, &params);
            result.unwrap();

            assert_eq!(header(&output), (2, 1, 4), "Test case '{}' failed", test_case.name);
            for pixel in output[16..].chunks_exact(4) {
                assert_eq!(pixel, test_case.expected, "Test case '{}' failed", test_case.name);
            }
        }
    }

    #[test]
    fn test_decode_failure_names_read_stage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"this is not a png").unwrap();

        let (result, output, _) = build(NativeLibrary::builtin(), &path, &ParamBlock::new());
        let err = result.unwrap_err();

        assert_eq!(err.message(), "failed to import texture");
        assert!(err.site().file.ends_with("texture.rs"), "site: {}", err.site());
        assert_eq!(err.site().function.as_deref(), Some("texture::read"));
        assert!(err.to_string().contains("texture::read"));
        assert!(output.is_empty());
    }

    #[test]
    fn test_invalid_parameters_fail_item() {
        struct TestCase {
            name: &'static str,
            key: &'static str,
            value: &'static str,
            expected: &'static str,
        }

        let test_cases = vec![
            TestCase {
                name: "non numeric size",
                key: "max_size",
                value: "huge",
                expected: "invalid max_size parameter",
            },
            TestCase {
                name: "zero size",
                key: "max_size",
                value: "0",
                expected: "max_size must be greater than zero",
            },
            TestCase {
                name: "non boolean premultiply",
                key: "premultiply",
                value: "yes",
                expected: "invalid premultiply parameter",
            },
        ];

        let dir = tempfile::tempdir().unwrap();
        let path = png_file(dir.path(), "bad.png", 2, 2);
        for test_case in test_cases {
            let mut params = ParamBlock::new();
            params.try_add(test_case.key, test_case.value);

            let (result, output, _) = build(NativeLibrary::builtin(), &path, &params);
            let err = result.unwrap_err();
            assert_eq!(err.message(), test_case.expected, "Test case '{}' failed", test_case.name);
            assert!(output.is_empty(), "Test case '{}' failed", test_case.name);
        }
    }

    #[test]
    fn test_native_buffers_released_after_build() {
        let library = counting_library();
        let file = crate::native::testing::existing_file();
        let mut params = ParamBlock::new();
        params.try_add("max_size", "1");

        let (result, output, _) = build(library, file.path(), &params);
        result.unwrap();

        // Stub decoder yields 2x2; downsized to 1x1 through a heap buffer.
        assert_eq!(header(&output), (1, 1, 4));
        assert_eq!(Counters::image_frees(), 1);
        assert_eq!(Counters::allocs(), 1);
        assert_eq!(Counters::heap_frees(), 1);
    }

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(16, 8, 32), None);
        assert_eq!(fit_within(16, 8, 4), Some((4, 2)));
        assert_eq!(fit_within(1000, 1, 10), Some((10, 1)));
    }
}
