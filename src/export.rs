//! Output serialization for the export collaborator and downscaled copies
//! for the live preview.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::DynamicImage;

use crate::buffer::PixelBuffer;
use crate::error::{EnhanceError, Result};

/// Export quality on a 0–1 scale.
pub const EXPORT_QUALITY: f32 = 0.94;

/// Longest edge of the display preview.
pub const DEFAULT_PREVIEW_SIZE: u32 = 1024;

/// Encodes `buffer` as a baseline JPEG.
///
/// `quality` is clamped to 0–1 and mapped onto the encoder's 1–100 scale.
/// Alpha is dropped; pipeline output is always opaque.
pub fn encode_jpeg(buffer: &PixelBuffer, quality: f32) -> Result<Vec<u8>> {
    let q = (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;
    let rgb = DynamicImage::ImageRgba8(buffer.clone()).to_rgb8();

    let mut bytes = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut bytes, q)
        .encode_image(&rgb)
        .map_err(|e| EnhanceError::EncodingFailure(e.to_string()))?;
    Ok(bytes.into_inner())
}

/// Encodes `buffer` and writes it to `path`.
pub fn save_jpeg(buffer: &PixelBuffer, path: &Path, quality: f32) -> Result<()> {
    let bytes = encode_jpeg(buffer, quality)?;
    fs::write(path, bytes)?;
    log::info!("exported {}x{} to {}", buffer.width(), buffer.height(), path.display());
    Ok(())
}

/// Downscaled copy whose longest edge is at most `max_dim`.
///
/// Aspect ratio is preserved; buffers that already fit are cloned unchanged.
pub fn preview(buffer: &PixelBuffer, max_dim: u32) -> PixelBuffer {
    let (width, height) = buffer.dimensions();
    let longest = width.max(height);
    if longest <= max_dim || max_dim == 0 {
        return buffer.clone();
    }

    let scale = max_dim as f32 / longest as f32;
    let new_width = ((width as f32 * scale).round() as u32).max(1);
    let new_height = ((height as f32 * scale).round() as u32).max(1);
    imageops::resize(buffer, new_width, new_height, FilterType::Triangle)
}
