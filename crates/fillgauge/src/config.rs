use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rim::RimConfig;
use crate::segment::SegmentConfig;
use crate::volume::VolumeConfig;

/// Tuning for all three pipeline stages.
///
/// Every field has a default, so a JSON override only needs the keys it changes:
///
/// ```
/// let cfg = fillgauge::FillConfig::from_json_str(r#"{ "rim": { "blur_sigma": 2.0 } }"#).unwrap();
/// assert_eq!(cfg.rim.blur_sigma, 2.0);
/// assert_eq!(cfg.volume.frustum_bottom_ratio, 0.7);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    pub rim: RimConfig,
    pub segment: SegmentConfig,
    pub volume: VolumeConfig,
}

impl FillConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let cfg = FillConfig::from_json_str(
            r#"{ "segment": { "min_delta_e": 20.0 }, "rim": { "max_working_side": null } }"#,
        )
        .unwrap();
        assert_eq!(cfg.segment.min_delta_e, 20.0);
        assert_eq!(cfg.segment.open_radius, SegmentConfig::default().open_radius);
        assert_eq!(cfg.rim.max_working_side, None);
        assert_eq!(cfg.rim.edges.n_rays, 96);
    }

    #[test]
    fn default_roundtrips_through_json() {
        let json = serde_json::to_string(&FillConfig::default()).unwrap();
        let back = FillConfig::from_json_str(&json).unwrap();
        assert_eq!(back.rim.max_working_side, Some(1024));
        assert_eq!(back.volume.default_assumed_height_mm, 15.0);
    }

    #[test]
    fn bad_inputs_are_reported() {
        assert!(matches!(
            FillConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            FillConfig::from_json_file(Path::new("/nonexistent/fillgauge.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
