//! Clarity and smoothness: blending a sharp channel against its box-blurred
//! counterpart.

use crate::params::ParameterSet;

/// Gain applied to clarity before it scales the local deviation.
const CLARITY_GAIN: f32 = 1.6;
/// Fraction of the smoothness knob used as blend weight toward the blur.
const SMOOTHNESS_GAIN: f32 = 0.85;

/// Mixes one tone-mapped channel `x` with its blurred reference `b`.
///
/// Clarity amplifies the deviation from the local average, then smoothness
/// blends the result back toward it.
#[inline]
pub fn mix_detail(x: f32, b: f32, params: &ParameterSet) -> f32 {
    let mut v = x;
    if params.clarity != 0.0 {
        let boost = 1.0 + params.clarity * CLARITY_GAIN;
        v = b + (v - b) * boost;
    }
    if params.smoothness != 0.0 {
        let f = params.smoothness * SMOOTHNESS_GAIN;
        v = v * (1.0 - f) + b * f;
    }
    v
}
