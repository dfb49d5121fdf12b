//! Core transform evaluation: applies the grade to a single pixel.

use crate::color_management::transfer::{Gamma22, TransferFunction};
use crate::transform::params::GradingParams;

/// Mid-grey pivot of the contrast step.
const CONTRAST_PIVOT: f32 = 0.5;

/// The core function. GPU `grade.wgsl` mirrors this exactly.
///
/// Applies the grade to one RGB triplet, in order:
/// 1. Decode to linear (`c ^ 2.2`) if `linearize`
/// 2. Brightness offset
/// 3. Exposure gain `2 ^ (2 × exposure)`
/// 4. Contrast around 0.5
/// 5. Re-encode (`c ^ (1 / 2.2)`) if `linearize`
///
/// No step clamps. Values may leave `[0, 1]`, and a negative value reaching
/// the re-encode step becomes NaN.
pub fn grade_rgb(rgb: [f32; 3], params: &GradingParams) -> [f32; 3] {
    let mut c = if params.linearize {
        Gamma22.rgb_to_linear(rgb)
    } else {
        rgb
    };

    let exposure = params.exposure_factor();
    let contrast = params.contrast_factor();
    for v in &mut c {
        *v += params.brightness;
        *v *= exposure;
        *v = (*v - CONTRAST_PIVOT) * contrast + CONTRAST_PIVOT;
    }

    if params.linearize {
        Gamma22.rgb_to_encoded(c)
    } else {
        c
    }
}

/// Grade an RGBA pixel. Alpha passes through untouched.
pub fn grade_pixel(color: [f32; 4], params: &GradingParams) -> [f32; 4] {
    let [r, g, b] = grade_rgb([color[0], color[1], color[2]], params);
    [r, g, b, color[3]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn assert_rgba_eq(actual: [f32; 4], expected: [f32; 4]) {
        for i in 0..4 {
            assert!(
                (actual[i] - expected[i]).abs() < EPSILON,
                "channel {i}: {:.8} vs {:.8}",
                actual[i],
                expected[i]
            );
        }
    }

    #[test]
    fn test_neutral_params_are_identity() {
        let params = GradingParams::default();
        for px in [[0.0, 0.0, 0.0, 1.0], [0.2, 0.5, 0.9, 0.3], [1.0, 1.0, 1.0, 0.0]] {
            assert_rgba_eq(grade_pixel(px, &params), px);
        }
    }

    #[test]
    fn test_brightness_is_additive() {
        let params = GradingParams {
            brightness: 0.1,
            ..Default::default()
        };
        let out = grade_pixel([0.5, 0.5, 0.5, 1.0], &params);
        assert_rgba_eq(out, [0.6, 0.6, 0.6, 1.0]);
    }

    #[test]
    fn test_brightness_then_exposure() {
        // (0.2 + 0.1) × 2^(2 × 0.5) = 0.6
        let params = GradingParams {
            brightness: 0.1,
            exposure: 0.5,
            ..Default::default()
        };
        let out = grade_rgb([0.2, 0.2, 0.2], &params);
        for c in out {
            assert_relative_eq!(c, 0.6, epsilon = EPSILON);
        }
    }

    #[test]
    fn test_contrast_pivots_on_mid_grey() {
        let params = GradingParams {
            contrast: 1.0,
            ..Default::default()
        };
        let out = grade_rgb([0.5, 0.75, 0.25], &params);
        assert_relative_eq!(out[0], 0.5, epsilon = EPSILON);
        assert_relative_eq!(out[1], 1.0, epsilon = EPSILON);
        assert_relative_eq!(out[2], 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_negative_contrast_flattens() {
        let params = GradingParams {
            contrast: -1.0,
            ..Default::default()
        };
        let out = grade_rgb([0.0, 0.3, 1.0], &params);
        for c in out {
            assert_relative_eq!(c, 0.5, epsilon = EPSILON);
        }
    }

    #[test]
    fn test_output_is_not_clamped() {
        let params = GradingParams {
            brightness: 0.5,
            exposure: 1.0,
            ..Default::default()
        };
        // (0.9 + 0.5) × 4 = 5.6
        let out = grade_rgb([0.9, 0.0, -0.5], &params);
        assert_relative_eq!(out[0], 5.6, epsilon = EPSILON);
        assert_relative_eq!(out[1], 2.0, epsilon = EPSILON);
        assert_relative_eq!(out[2], 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_linearize_round_trip_with_neutral_params() {
        let params = GradingParams {
            linearize: true,
            ..Default::default()
        };
        for px in [[0.0, 0.1, 0.5, 1.0], [0.33, 0.66, 0.99, 0.5], [1.0, 0.75, 0.25, 0.0]] {
            assert_rgba_eq(grade_pixel(px, &params), px);
        }
    }

    #[test]
    fn test_linearize_grades_in_linear_light() {
        let params = GradingParams {
            exposure: 0.5,
            linearize: true,
            ..Default::default()
        };
        // Doubling linear light raises the encoded value by 2^(1/2.2).
        let out = grade_rgb([0.4, 0.4, 0.4], &params);
        let expected = 0.4 * 2.0_f32.powf(1.0 / 2.2);
        for c in out {
            assert_relative_eq!(c, expected, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_alpha_passes_through() {
        let params = GradingParams {
            brightness: 0.2,
            contrast: 0.5,
            exposure: -0.25,
            linearize: true,
        };
        let out = grade_pixel([0.3, 0.4, 0.5, 0.123], &params);
        assert_eq!(out[3], 0.123);
    }
}
