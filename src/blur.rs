//! 3×3 box blur used as the local-average reference for clarity and
//! smoothness.
//!
//! Edge pixels average only the neighbors that exist inside the buffer, so a
//! corner pixel is the mean of 4 samples and an edge pixel the mean of 6.
//! There is no zero padding.

use rayon::prelude::*;

use crate::buffer::PixelBuffer;

/// Returns a same-sized buffer where each pixel's R, G and B are the mean of
/// its in-bounds 3×3 neighborhood. Alpha is written as 255.
///
/// Rows are computed in parallel; every output row reads only from `src`, so
/// the result is identical to a sequential pass.
pub fn box_blur(src: &PixelBuffer) -> PixelBuffer {
    let (width, height) = src.dimensions();
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 {
        return src.clone();
    }
    let input = src.as_raw();
    let mut out = vec![0u8; w * h * 4];

    out.par_chunks_exact_mut(w * 4).enumerate().for_each(|(y, row)| {
        let y0 = y.saturating_sub(1);
        let y1 = (y + 1).min(h - 1);
        for x in 0..w {
            let x0 = x.saturating_sub(1);
            let x1 = (x + 1).min(w - 1);

            let mut sum = [0u32; 3];
            for ny in y0..=y1 {
                let line = ny * w * 4;
                for nx in x0..=x1 {
                    let idx = line + nx * 4;
                    sum[0] += input[idx] as u32;
                    sum[1] += input[idx + 1] as u32;
                    sum[2] += input[idx + 2] as u32;
                }
            }

            let count = ((y1 - y0 + 1) * (x1 - x0 + 1)) as u32;
            let o = x * 4;
            // Integer round-half-up of sum / count.
            row[o] = ((sum[0] * 2 + count) / (count * 2)) as u8;
            row[o + 1] = ((sum[1] * 2 + count) / (count * 2)) as u8;
            row[o + 2] = ((sum[2] * 2 + count) / (count * 2)) as u8;
            row[o + 3] = 255;
        }
    });

    // The length matches width × height × 4 by construction.
    PixelBuffer::from_raw(width, height, out).unwrap_or_else(|| PixelBuffer::new(width, height))
}
