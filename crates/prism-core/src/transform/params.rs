//! Parameter struct that defines the color grade.
//!
//! `GradingParams` is the single contract between the parameter source
//! (CLI flags, JSON presets) and both grader backends. The GPU uniform
//! is packed from it field by field.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Brightness / contrast / exposure grade, optionally applied in linear light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingParams {
    /// Additive offset applied to every channel. 0.0 = neutral.
    pub brightness: f32,
    /// Spread around mid-grey; the slope is `1 + contrast`. 0.0 = neutral.
    pub contrast: f32,
    /// Exposure in stops; the gain is `2^(2 × exposure)`. 0.0 = neutral.
    pub exposure: f32,
    /// Grade in linear light: decode with gamma 2.2 before, re-encode after.
    pub linearize: bool,
}

impl Default for GradingParams {
    /// Produces an identity (no-op) grade.
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 0.0,
            exposure: 0.0,
            linearize: false,
        }
    }
}

impl GradingParams {
    /// Gain applied in the exposure step.
    pub fn exposure_factor(&self) -> f32 {
        2.0_f32.powf(2.0 * self.exposure)
    }

    /// Slope applied in the contrast step.
    pub fn contrast_factor(&self) -> f32 {
        1.0 + self.contrast
    }

    /// True when grading leaves every pixel unchanged.
    ///
    /// A linearize round trip is not bit-exact, so it never counts as identity.
    pub fn is_identity(&self) -> bool {
        !self.linearize && self.brightness == 0.0 && self.contrast == 0.0 && self.exposure == 0.0
    }

    /// Parse a JSON preset. Missing fields keep their neutral value.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize as a pretty-printed JSON preset.
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        assert!(GradingParams::default().is_identity());
        let linear = GradingParams {
            linearize: true,
            ..Default::default()
        };
        assert!(!linear.is_identity());
    }

    #[test]
    fn test_factors() {
        let params = GradingParams {
            contrast: 0.25,
            exposure: 0.5,
            ..Default::default()
        };
        assert_eq!(params.contrast_factor(), 1.25);
        assert!((params.exposure_factor() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_partial_preset_keeps_defaults() {
        let params = GradingParams::from_json(r#"{ "exposure": 1.5, "linearize": true }"#).unwrap();
        assert_eq!(params.exposure, 1.5);
        assert!(params.linearize);
        assert_eq!(params.brightness, 0.0);
        assert_eq!(params.contrast, 0.0);
    }

    #[test]
    fn test_malformed_preset_is_an_error() {
        let err = GradingParams::from_json("{ \"exposure\": \"bright\" }").unwrap_err();
        assert!(matches!(err, CoreError::Preset(_)));
    }

    #[test]
    fn test_preset_round_trip() {
        let params = GradingParams {
            brightness: -0.1,
            contrast: 0.3,
            exposure: 0.25,
            linearize: true,
        };
        let json = params.to_json().unwrap();
        assert_eq!(GradingParams::from_json(&json).unwrap(), params);
    }
}
