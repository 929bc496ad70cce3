//! The nine-knob parameter vector driving one enhancement run.

use serde::{Deserialize, Serialize};

use crate::error::{EnhanceError, Result};

/// Immutable snapshot of the enhancement knobs.
///
/// `ParameterSet` is `Copy`: a run always owns its own snapshot, so edits made
/// by the UI while a run is in flight never leak into it.
///
/// Designed to be compatible with JSON serialization; omitted fields fall back
/// to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    /// Multiplicative brightness pre-filter (1.0 is neutral).
    pub exposure: f32,
    /// Multiplicative contrast pre-filter (1.0 is neutral).
    pub contrast: f32,
    /// Multiplicative saturation pre-filter (1.0 is neutral).
    pub saturation: f32,
    /// Signed warm (+) / cool (-) shift, -100 to 100.
    pub temperature: f32,
    /// Brightens pixels darker than mid-gray, 0.0 to ~0.6.
    pub shadow_lift: f32,
    /// Darkens pixels brighter than mid-gray, 0.0 to ~0.6.
    pub highlight_recover: f32,
    /// Local-contrast boost strength, 0.0 to ~0.5.
    pub clarity: f32,
    /// Blend strength toward the local average, 0.0 to ~0.5.
    pub smoothness: f32,
    /// Output scale factor relative to the source, typically 1.0 to 2.0.
    pub resolution_boost: f32,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            exposure: 1.08,
            contrast: 1.12,
            saturation: 1.18,
            temperature: 10.0,
            shadow_lift: 0.2,
            highlight_recover: 0.16,
            clarity: 0.22,
            smoothness: 0.08,
            resolution_boost: 1.3,
        }
    }
}

impl ParameterSet {
    /// Every knob at its neutral value; the pipeline reproduces the source.
    pub fn identity() -> Self {
        Self {
            exposure: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            temperature: 0.0,
            shadow_lift: 0.0,
            highlight_recover: 0.0,
            clarity: 0.0,
            smoothness: 0.0,
            resolution_boost: 1.0,
        }
    }

    /// Whether the box-blurred reference is required for this run.
    pub fn needs_blur(&self) -> bool {
        self.clarity != 0.0 || self.smoothness != 0.0
    }

    /// Rejects values the pipeline cannot evaluate.
    ///
    /// Only hard domain violations are refused (non-finite values,
    /// non-positive multiplicative factors). The advisory slider ranges are
    /// not enforced here.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("exposure", self.exposure),
            ("contrast", self.contrast),
            ("saturation", self.saturation),
            ("temperature", self.temperature),
            ("shadow_lift", self.shadow_lift),
            ("highlight_recover", self.highlight_recover),
            ("clarity", self.clarity),
            ("smoothness", self.smoothness),
            ("resolution_boost", self.resolution_boost),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(EnhanceError::InvalidParameter { name: *name, value: *value });
        }

        let positive = [
            ("exposure", self.exposure),
            ("contrast", self.contrast),
            ("saturation", self.saturation),
            ("resolution_boost", self.resolution_boost),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, v)| *v <= 0.0) {
            return Err(EnhanceError::InvalidParameter { name: *name, value: *value });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_needs_no_blur() {
        assert!(!ParameterSet::identity().needs_blur());
        assert!(ParameterSet::default().needs_blur());

        let only_smooth = ParameterSet { smoothness: 0.1, ..ParameterSet::identity() };
        assert!(only_smooth.needs_blur());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let p: ParameterSet = serde_json::from_str(r#"{"clarity": 0.4, "temperature": -25}"#).unwrap();
        assert_eq!(p.clarity, 0.4);
        assert_eq!(p.temperature, -25.0);
        assert_eq!(p.exposure, ParameterSet::default().exposure);
        assert_eq!(p.resolution_boost, 1.3);
    }

    #[test]
    fn validate_rejects_bad_factors() {
        assert!(ParameterSet::default().validate().is_ok());

        let zero_boost = ParameterSet { resolution_boost: 0.0, ..Default::default() };
        assert!(matches!(
            zero_boost.validate(),
            Err(EnhanceError::InvalidParameter { name: "resolution_boost", .. })
        ));

        let nan_clarity = ParameterSet { clarity: f32::NAN, ..Default::default() };
        assert!(matches!(
            nan_clarity.validate(),
            Err(EnhanceError::InvalidParameter { name: "clarity", .. })
        ));
    }

    #[test]
    fn out_of_advisory_range_is_accepted() {
        let wide = ParameterSet { resolution_boost: 3.0, temperature: 150.0, ..Default::default() };
        assert!(wide.validate().is_ok());
    }
}
