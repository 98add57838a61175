use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::frame::RadiusBounds;
use crate::utensil::UtensilHint;

/// Caller hints for one measurement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureRequest {
    pub utensil: UtensilHint,
    /// Known rim diameter in mm. `None` or `0` withholds the volume.
    pub diameter_mm: Option<f64>,
    /// Assumed fill height in mm; `None` uses the configured default.
    pub assumed_height_mm: Option<f64>,
    /// Rim size range in pixels; `None` derives it from the frame size.
    pub radius_bounds: Option<RadiusBounds>,
}

impl MeasureRequest {
    pub fn new(utensil: UtensilHint) -> Self {
        Self {
            utensil,
            ..Self::default()
        }
    }

    pub fn with_diameter_mm(mut self, diameter_mm: f64) -> Self {
        self.diameter_mm = Some(diameter_mm);
        self
    }

    pub fn with_assumed_height_mm(mut self, height_mm: f64) -> Self {
        self.assumed_height_mm = Some(height_mm);
        self
    }

    pub fn with_radius_bounds(mut self, bounds: RadiusBounds) -> Self {
        self.radius_bounds = Some(bounds);
        self
    }

    /// Calibration diameter after validation; `Some(0.0)` collapses to `None`.
    pub(crate) fn calibration(&self) -> Result<Option<f64>, InputError> {
        match self.diameter_mm {
            None => Ok(None),
            Some(d) if !d.is_finite() || d < 0.0 => Err(InputError::InvalidDiameter(d)),
            Some(d) if d == 0.0 => Ok(None),
            Some(d) => Ok(Some(d)),
        }
    }

    pub(crate) fn height_or(&self, default_mm: f64) -> Result<f64, InputError> {
        let h = self.assumed_height_mm.unwrap_or(default_mm);
        if !h.is_finite() || h < 0.0 {
            return Err(InputError::InvalidAssumedHeight(h));
        }
        Ok(h)
    }

    pub(crate) fn bounds_for(&self, width: u32, height: u32) -> Result<RadiusBounds, InputError> {
        match self.radius_bounds {
            Some(b) => RadiusBounds::new(b.min_radius, b.max_radius),
            None => Ok(RadiusBounds::for_frame(width, height)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_rules() {
        assert_eq!(MeasureRequest::default().calibration(), Ok(None));
        let zero = MeasureRequest::default().with_diameter_mm(0.0);
        assert_eq!(zero.calibration(), Ok(None));
        let ok = MeasureRequest::default().with_diameter_mm(210.0);
        assert_eq!(ok.calibration(), Ok(Some(210.0)));
        assert!(matches!(
            MeasureRequest::default().with_diameter_mm(-3.0).calibration(),
            Err(InputError::InvalidDiameter(_))
        ));
        assert!(MeasureRequest::default()
            .with_diameter_mm(f64::NAN)
            .calibration()
            .is_err());
    }

    #[test]
    fn height_defaults_and_validation() {
        assert_eq!(MeasureRequest::default().height_or(15.0), Ok(15.0));
        let r = MeasureRequest::default().with_assumed_height_mm(0.0);
        assert_eq!(r.height_or(15.0), Ok(0.0));
        let bad = MeasureRequest::default().with_assumed_height_mm(f64::INFINITY);
        assert!(matches!(bad.height_or(15.0), Err(InputError::InvalidAssumedHeight(_))));
    }

    #[test]
    fn bounds_come_from_frame_unless_given() {
        let r = MeasureRequest::default();
        assert_eq!(r.bounds_for(640, 480), Ok(RadiusBounds::for_frame(640, 480)));
        let bad = MeasureRequest::default().with_radius_bounds(RadiusBounds {
            min_radius: 50.0,
            max_radius: 20.0,
        });
        assert!(bad.bounds_for(640, 480).is_err());
    }
}
