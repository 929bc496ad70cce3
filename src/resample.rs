//! Resampler: builds the working buffer at the boosted resolution with the
//! exposure/contrast/saturation filter baked into the draw.
//!
//! The filter is the explicit equivalent of a chained canvas filter
//! `brightness(e) contrast(c) saturate(s)`: each stage works on 8-bit
//! gamma-encoded values and clamps before handing over to the next one.

use image::imageops::{self, FilterType};
use rayon::prelude::*;

use crate::buffer::{to_channel, PixelBuffer, SourceImage};
use crate::error::{EnhanceError, Result};
use crate::params::ParameterSet;

/// Upper bound on the number of output pixels a single run may allocate.
pub const MAX_OUTPUT_PIXELS: u64 = 100_000_000;

/// Rec.709 luma weights used by the saturate matrix.
const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Output dimensions for a source of `width × height` scaled by `boost`.
///
/// Each dimension is rounded and floored at 1.
pub fn target_size(width: u32, height: u32, boost: f32) -> (u32, u32) {
    let scale = |d: u32| ((d as f64 * boost as f64).round() as u32).max(1);
    (scale(width), scale(height))
}

/// Draws `source` into a fresh buffer of the boosted size.
///
/// Interpolation is bicubic (Catmull-Rom); when the target size equals the
/// source size the pixels are copied verbatim so a neutral parameter set
/// reproduces the input exactly. Alpha is forced to 255 because the draw
/// target is opaque.
///
/// # Errors
/// * `ResourceUnavailable` - the target exceeds [`MAX_OUTPUT_PIXELS`], or
///   the same-size copy cannot be reserved.
pub fn resample(source: &SourceImage, params: &ParameterSet) -> Result<PixelBuffer> {
    let (width, height) = target_size(source.width(), source.height(), params.resolution_boost);
    let pixel_count = width as u64 * height as u64;
    if pixel_count > MAX_OUTPUT_PIXELS {
        return Err(EnhanceError::ResourceUnavailable(format!(
            "{}x{} output exceeds the {} pixel ceiling",
            width, height, MAX_OUTPUT_PIXELS
        )));
    }

    let mut working = if (width, height) == source.pixels().dimensions() {
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(pixel_count as usize * 4)
            .map_err(|e| EnhanceError::ResourceUnavailable(e.to_string()))?;
        storage.extend_from_slice(source.pixels().as_raw());
        PixelBuffer::from_raw(width, height, storage).ok_or_else(|| {
            EnhanceError::ResourceUnavailable("failed to create render target".to_string())
        })?
    } else {
        // The resized buffer becomes the working buffer as-is; its
        // allocations are bounded by the pixel ceiling above.
        imageops::resize(source.pixels(), width, height, FilterType::CatmullRom)
    };

    apply_color_filter(&mut working, params);
    Ok(working)
}

/// Applies brightness, contrast and saturation in one parallel pass and
/// makes every pixel opaque.
fn apply_color_filter(buffer: &mut PixelBuffer, params: &ParameterSet) {
    let e = params.exposure;
    let c = params.contrast;
    let s = params.saturation;
    let neutral = e == 1.0 && c == 1.0 && s == 1.0;

    buffer.par_chunks_exact_mut(4).for_each(|px| {
        px[3] = 255;
        if neutral {
            return;
        }
        let rgb = filter_pixel([px[0] as f32, px[1] as f32, px[2] as f32], e, c, s);
        px[0] = to_channel(rgb[0]);
        px[1] = to_channel(rgb[1]);
        px[2] = to_channel(rgb[2]);
    });
}

/// Runs the three filter stages on one pixel, clamping between stages.
pub(crate) fn filter_pixel(rgb: [f32; 3], exposure: f32, contrast: f32, saturation: f32) -> [f32; 3] {
    let clamp = |v: f32| v.clamp(0.0, 255.0);

    let [r, g, b] = rgb.map(|v| clamp(v * exposure));
    let [r, g, b] = [r, g, b].map(|v| clamp((v - 127.5) * contrast + 127.5));

    if saturation == 1.0 {
        return [r, g, b];
    }
    let s = saturation;
    let [lr, lg, lb] = LUMA;
    [
        clamp((lr + (1.0 - lr) * s) * r + (lg - lg * s) * g + (lb - lb * s) * b),
        clamp((lr - lr * s) * r + (lg + (1.0 - lg) * s) * g + (lb - lb * s) * b),
        clamp((lr - lr * s) * r + (lg - lg * s) * g + (lb + (1.0 - lb) * s) * b),
    ]
}
