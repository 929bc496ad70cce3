//! Property tests over the public enhancement API.

use clio_enhance::blur::box_blur;
use clio_enhance::detail::mix_detail;
use clio_enhance::resample::target_size;
use clio_enhance::tone::tone_map;
use clio_enhance::{enhance, EnhanceSession, ParameterSet, PixelBuffer, RecomputeScheduler, RunOutcome, SourceImage};
use image::Rgba;
use proptest::prelude::*;

fn params_strategy() -> impl Strategy<Value = ParameterSet> {
    (
        (0.6f32..1.8, 0.6f32..1.8, 0.3f32..2.0),
        -100.0f32..100.0,
        (0.0f32..0.6, 0.0f32..0.6),
        (0.0f32..0.5, 0.0f32..0.5),
        1.0f32..2.0,
    )
        .prop_map(|((exposure, contrast, saturation), temperature, (shadow_lift, highlight_recover), (clarity, smoothness), resolution_boost)| {
            ParameterSet {
                exposure,
                contrast,
                saturation,
                temperature,
                shadow_lift,
                highlight_recover,
                clarity,
                smoothness,
                resolution_boost,
            }
        })
}

fn image_strategy() -> impl Strategy<Value = SourceImage> {
    (1u32..9, 1u32..9).prop_flat_map(|(w, h)| {
        prop::collection::vec(any::<u8>(), (w * h * 4) as usize).prop_map(move |data| {
            SourceImage::new(PixelBuffer::from_raw(w, h, data).unwrap())
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn output_is_opaque_and_correctly_sized(src in image_strategy(), params in params_strategy()) {
        let out = enhance(&src, &params).unwrap();
        let expected = target_size(src.width(), src.height(), params.resolution_boost);
        prop_assert_eq!(out.dimensions(), expected);
        prop_assert!(out.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn clarity_widens_and_smoothness_narrows_deviation(
        x in 0.0f32..255.0,
        b in 0.0f32..255.0,
        low in 0.0f32..0.25,
        step in 0.01f32..0.25,
    ) {
        prop_assume!((x - b).abs() > 0.5);
        let base = ParameterSet::identity();

        let c_low = mix_detail(x, b, &ParameterSet { clarity: low, ..base });
        let c_high = mix_detail(x, b, &ParameterSet { clarity: low + step, ..base });
        prop_assert!((c_high - b).abs() > (c_low - b).abs());

        let s_low = mix_detail(x, b, &ParameterSet { smoothness: low, ..base });
        let s_high = mix_detail(x, b, &ParameterSet { smoothness: low + step, ..base });
        prop_assert!((s_high - b).abs() < (s_low - b).abs());
    }

    #[test]
    fn temperature_pushes_red_and_blue_in_opposite_directions(
        r in 1.0f32..254.0,
        g in 0.0f32..255.0,
        b in 1.0f32..254.0,
        k in 1.0f32..100.0,
    ) {
        let warm = tone_map([r, g, b], &ParameterSet { temperature: k, ..ParameterSet::identity() });
        let cool = tone_map([r, g, b], &ParameterSet { temperature: -k, ..ParameterSet::identity() });
        prop_assert!(warm[0] > r && cool[0] < r);
        prop_assert!(warm[2] < b && cool[2] > b);
    }

    #[test]
    fn blur_of_uniform_buffer_is_identity(w in 1u32..12, h in 1u32..12, rgb in any::<[u8; 3]>()) {
        let src = PixelBuffer::from_pixel(w, h, Rgba([rgb[0], rgb[1], rgb[2], 255]));
        prop_assert_eq!(box_blur(&src), src);
    }

    #[test]
    fn identity_params_reproduce_opaque_source(src in image_strategy()) {
        let mut opaque = src.pixels().clone();
        opaque.pixels_mut().for_each(|p| p[3] = 255);
        let out = enhance(&SourceImage::new(opaque.clone()), &ParameterSet::identity()).unwrap();
        prop_assert_eq!(out, opaque);
    }
}

#[test]
fn mid_gray_scenario_with_default_params() {
    let src = SourceImage::new(PixelBuffer::from_pixel(2, 2, Rgba([128, 128, 128, 255])));
    let out = enhance(&src, &ParameterSet::default()).unwrap();
    assert_eq!(out.dimensions(), (3, 3));
    let first = *out.get_pixel(0, 0);
    assert!(out.pixels().all(|p| *p == first));
    // Warm default: red above blue.
    assert!(first[0] > first[2]);
}

#[test]
fn slider_burst_triggers_single_run_with_last_values() {
    let mut session = EnhanceSession::new(RecomputeScheduler::default());
    session.load_image(SourceImage::new(PixelBuffer::from_pixel(10, 10, Rgba([90, 60, 30, 255]))), 0);
    session.tick(120);

    let changes = [
        (1_000, ParameterSet { resolution_boost: 1.2, ..Default::default() }),
        (1_040, ParameterSet { resolution_boost: 1.5, ..Default::default() }),
        (1_080, ParameterSet { resolution_boost: 1.8, ..Default::default() }),
    ];

    let mut runs = Vec::new();
    for now in 1_000..1_400 {
        for (at, params) in changes.iter() {
            if *at == now {
                session.set_params(*params, now);
            }
        }
        if let Some(outcome) = session.tick(now) {
            runs.push(outcome);
        }
    }

    assert_eq!(runs.len(), 1);
    assert!(matches!(runs[0], RunOutcome::Published { width: 18, height: 18, .. }));
}
