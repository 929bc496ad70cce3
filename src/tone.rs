//! Per-pixel tone shaping: luminance-weighted shadow lift, highlight
//! recovery and color-temperature shift.

use crate::params::ParameterSet;

/// Rec.709 luminance of an 8-bit RGB triple.
#[inline]
pub fn luminance(rgb: [f32; 3]) -> f32 {
    0.2126 * rgb[0] + 0.7152 * rgb[1] + 0.0722 * rgb[2]
}

/// Applies shadow lift, highlight recovery and temperature, in that order.
///
/// Luminance is taken once from the incoming values and reused for both the
/// shadow and the highlight step. Values are left unclamped; the caller
/// clamps on the final write.
pub fn tone_map(rgb: [f32; 3], params: &ParameterSet) -> [f32; 3] {
    let [mut r, mut g, mut b] = rgb;
    let n = luminance(rgb) / 255.0;

    if params.shadow_lift != 0.0 {
        let lift = 1.0 + params.shadow_lift * ((0.5 - n) * 2.0).max(0.0);
        r *= lift;
        g *= lift;
        b *= lift;
    }

    if params.highlight_recover != 0.0 {
        let recover = 1.0 - params.highlight_recover * ((n - 0.5) * 2.0).max(0.0);
        r *= recover;
        g *= recover;
        b *= recover;
    }

    if params.temperature != 0.0 {
        let t = params.temperature / 100.0;
        if t > 0.0 {
            r += t * (255.0 - r) * 0.22;
            g += t * (255.0 - g) * 0.08;
            b *= 1.0 - t * 0.15;
        } else {
            let c = -t;
            b += c * (255.0 - b) * 0.25;
            g += c * (255.0 - g) * 0.04;
            r *= 1.0 - c * 0.18;
        }
    }

    [r, g, b]
}
