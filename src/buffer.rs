//! Pixel storage shared by every pipeline stage.

use image::{DynamicImage, RgbaImage};

/// Row-major RGBA8 buffer with straight (non-premultiplied) alpha.
pub type PixelBuffer = RgbaImage;

/// A decoded bitmap handed over by the image-loading collaborator.
///
/// The pixels are owned exclusively; replacing the source in a session drops
/// the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl From<DynamicImage> for SourceImage {
    fn from(img: DynamicImage) -> Self {
        Self::new(img.to_rgba8())
    }
}

impl From<RgbaImage> for SourceImage {
    fn from(pixels: RgbaImage) -> Self {
        Self::new(pixels)
    }
}

/// Rounds and clamps a float channel into the 8-bit range.
#[inline]
pub fn to_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_channel_clamps_and_rounds() {
        assert_eq!(to_channel(-12.0), 0);
        assert_eq!(to_channel(300.5), 255);
        assert_eq!(to_channel(127.5), 128);
        assert_eq!(to_channel(127.49), 127);
        assert_eq!(to_channel(f32::NAN), 0);
    }
}
