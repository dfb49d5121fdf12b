//! Transfer functions between display-encoded and linear light values.
//!
//! The grade linearises with a plain 2.2 power curve rather than the
//! piecewise sRGB curve.

/// Exponent of the approximate display gamma used by the grade.
pub const DISPLAY_GAMMA: f32 = 2.2;

/// A transfer function that converts between linear and non-linear encodings.
pub trait TransferFunction: Send + Sync {
    /// Convert from non-linear (encoded) to linear light.
    fn to_linear(&self, encoded: f32) -> f32;

    /// Convert from linear light to non-linear (encoded).
    fn to_encoded(&self, linear: f32) -> f32;

    /// Decode an RGB triplet.
    fn rgb_to_linear(&self, rgb: [f32; 3]) -> [f32; 3] {
        rgb.map(|c| self.to_linear(c))
    }

    /// Encode an RGB triplet.
    fn rgb_to_encoded(&self, rgb: [f32; 3]) -> [f32; 3] {
        rgb.map(|c| self.to_encoded(c))
    }
}

/// Pure power-law gamma 2.2.
///
/// ```text
/// to_linear:  V ^ 2.2
/// to_encoded: L ^ (1 / 2.2)
/// ```
///
/// Negative inputs produce NaN, as `powf` does; nothing is clamped.
#[derive(Debug, Clone, Copy)]
pub struct Gamma22;

impl TransferFunction for Gamma22 {
    fn to_linear(&self, encoded: f32) -> f32 {
        encoded.powf(DISPLAY_GAMMA)
    }

    fn to_encoded(&self, linear: f32) -> f32 {
        linear.powf(1.0 / DISPLAY_GAMMA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gamma22_round_trip() {
        for i in 0..=20 {
            let v = i as f32 / 20.0;
            let back = Gamma22.to_encoded(Gamma22.to_linear(v));
            assert_relative_eq!(back, v, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_gamma22_fixed_points() {
        assert_eq!(Gamma22.to_linear(0.0), 0.0);
        assert_eq!(Gamma22.to_linear(1.0), 1.0);
        assert_relative_eq!(Gamma22.to_linear(0.5), 0.217_638, epsilon = 1e-5);
    }

    #[test]
    fn test_gamma22_negative_is_nan() {
        assert!(Gamma22.to_linear(-0.1).is_nan());
    }
}
