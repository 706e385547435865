//! Decode → render → JPEG encode.
//!
//! [`ImageEncoder`] is the synchronous codec step of a compression task. The
//! task runs it on the blocking thread pool. [`JpegReencoder`] is the
//! implementation backed by the `image` crate.

use std::io::Cursor;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};
use tracing::debug;
use crate::core::Quality;
use crate::utils::{CompressorError, CompressorResult};

/// Re-encodes source bytes as JPEG.
pub trait ImageEncoder: Send + Sync + 'static {
    /// Decode `bytes` and re-encode them as JPEG at `quality`.
    ///
    /// `name` is only used for error messages.
    fn encode(&self, name: &str, bytes: &[u8], quality: Quality) -> CompressorResult<Vec<u8>>;
}

/// The `image`-crate JPEG re-encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegReencoder;

impl ImageEncoder for JpegReencoder {
    fn encode(&self, name: &str, bytes: &[u8], quality: Quality) -> CompressorResult<Vec<u8>> {
        let image = image::load_from_memory(bytes).map_err(|e| CompressorError::decode(name, e))?;
        debug!("Decoded '{}': {}×{}", name, image.width(), image.height());

        let surface = render_surface(&image);

        let mut buffer = Cursor::new(Vec::new());
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.jpeg_quality());
        DynamicImage::ImageRgb8(surface)
            .write_with_encoder(encoder)
            .map_err(|e| CompressorError::encode(format!("Failed to encode '{name}': {e}")))?;

        let encoded = buffer.into_inner();
        if encoded.is_empty() {
            return Err(CompressorError::encode(format!("Encoding '{name}' produced no output")));
        }
        Ok(encoded)
    }
}

/// Draw `image` onto an opaque RGB surface of the same natural size.
///
/// Transparent pixels are composited over black.
fn render_surface(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    let mut surface = RgbImage::new(rgba.width(), rgba.height());
    for (dst, src) in surface.pixels_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        let blend = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        dst.0 = [blend(r), blend(g), blend(b)];
    }
    surface
}
