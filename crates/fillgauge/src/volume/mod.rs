//! Fill fraction and volume from a food mask and rim geometry.

mod depth_model;

pub use depth_model::DepthModel;

use serde::{Deserialize, Serialize};

use crate::conic::Ellipse;
use crate::segment::FoodMask;
use crate::utensil::UtensilHint;

/// Default assumed height of the food layer at full fill (mm).
pub const DEFAULT_ASSUMED_HEIGHT_MM: f64 = 15.0;

/// Volume estimation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    /// Bottom-to-top radius ratio of the generic (`auto`) frustum.
    pub frustum_bottom_ratio: f64,
    /// Assumed fill height used when the caller gives none (mm).
    pub default_assumed_height_mm: f64,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            frustum_bottom_ratio: 0.7,
            default_assumed_height_mm: DEFAULT_ASSUMED_HEIGHT_MM,
        }
    }
}

/// Fill level and volume for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillEstimate {
    /// Food share of the rim interior, in `[0, 100]`.
    pub percent_fill: Option<f64>,
    /// Requires a rim diameter.
    pub volume_ml: Option<f64>,
    /// Calibration scale along the major axis.
    pub px_per_mm: Option<f64>,
    pub food_px: usize,
    pub interior_px: usize,
    pub depth_model: DepthModel,
}

impl FillEstimate {
    /// Estimate with no fill and no volume.
    pub fn absent(depth_model: DepthModel) -> Self {
        Self {
            percent_fill: None,
            volume_ml: None,
            px_per_mm: None,
            food_px: 0,
            interior_px: 0,
            depth_model,
        }
    }
}

/// Converts segmented area into fill percentage and volume.
#[derive(Debug, Clone, Default)]
pub struct VolumeEstimator {
    config: VolumeConfig,
}

impl VolumeEstimator {
    pub fn new(config: VolumeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VolumeConfig {
        &self.config
    }

    /// Fill percentage and, with a rim diameter, volume in ml.
    ///
    /// Only food pixels inside `ellipse` count. The planar food area in mm² is
    /// the fill fraction of the rim's true circular opening, so a rim seen at
    /// an angle is not penalized by its foreshortened minor axis.
    pub fn estimate(
        &self,
        ellipse: &Ellipse,
        mask: &FoodMask,
        diameter_mm: Option<f64>,
        hint: UtensilHint,
        assumed_height_mm: f64,
    ) -> FillEstimate {
        let model = DepthModel::for_hint(hint, &self.config);
        let (w, h) = mask.dimensions();
        let interior_px = ellipse.interior_pixel_count(w, h);
        if interior_px == 0 {
            tracing::debug!("rim interior has no pixels on a {w}x{h} mask");
            return FillEstimate::absent(model);
        }
        let food_px = mask.food_pixels_within(ellipse);
        let fraction = (food_px as f64 / interior_px as f64).clamp(0.0, 1.0);

        let mut estimate = FillEstimate {
            percent_fill: Some(100.0 * fraction),
            volume_ml: None,
            px_per_mm: None,
            food_px,
            interior_px,
            depth_model: model,
        };

        let Some(diameter_mm) = diameter_mm.filter(|d| d.is_finite() && *d > 0.0) else {
            tracing::debug!("no rim diameter, volume withheld");
            return estimate;
        };
        let px_per_mm = ellipse.major() / diameter_mm;
        if !px_per_mm.is_finite() || px_per_mm <= 0.0 || !assumed_height_mm.is_finite() {
            return estimate;
        }
        estimate.px_per_mm = Some(px_per_mm);

        let rim_radius_mm = 0.5 * ellipse.major() / px_per_mm;
        let food_area_mm2 = fraction * std::f64::consts::PI * rim_radius_mm * rim_radius_mm;
        let height = assumed_height_mm.max(0.0);
        let depth_mm = if model.scales_with_fill() {
            height * fraction
        } else {
            height
        };
        let food_radius_mm = (food_area_mm2 / std::f64::consts::PI).sqrt();
        let volume_mm3 = food_area_mm2 * depth_mm * model.shape_factor(depth_mm, food_radius_mm);
        estimate.volume_ml = Some((volume_mm3 / 1000.0).max(0.0));

        tracing::debug!(
            "fill {:.1}% ({food_px}/{interior_px} px), {:.2} px/mm, {} depth {:.1} mm -> {:.1} ml",
            100.0 * fraction,
            px_per_mm,
            model.name(),
            depth_mm,
            volume_mm3 / 1000.0
        );
        estimate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::{GrayImage, Luma};

    fn rim() -> Ellipse {
        Ellipse::new([100.0, 100.0], [160.0, 160.0], 0.0).unwrap()
    }

    fn mask_where(f: impl Fn(u32, u32) -> bool) -> FoodMask {
        FoodMask::from_image(GrayImage::from_fn(200, 200, |x, y| {
            Luma([if f(x, y) { 255 } else { 0 }])
        }))
    }

    #[test]
    fn half_filled_calibrated_bowl() {
        let est = VolumeEstimator::default().estimate(
            &rim(),
            &mask_where(|x, _| x < 100),
            Some(200.0),
            UtensilHint::Auto,
            15.0,
        );
        let pct = est.percent_fill.unwrap();
        assert!((pct - 50.0).abs() < 1.0, "percent {pct}");
        assert_relative_eq!(est.px_per_mm.unwrap(), 0.8);

        let f = pct / 100.0;
        let expected = f * std::f64::consts::PI * 100.0 * 100.0 * (15.0 * f) * 0.73 / 1000.0;
        let vol = est.volume_ml.unwrap();
        assert!(vol > 0.0);
        assert_relative_eq!(vol, expected, max_relative = 1e-9);
        // ~50% area × 50% height × frustum factor.
        let nominal = 0.5 * std::f64::consts::PI * 1e4 * 7.5 * 0.73 / 1000.0;
        assert!((vol - nominal).abs() < 3.0, "volume {vol}, nominal {nominal}");
    }

    #[test]
    fn no_diameter_means_no_volume() {
        let est = VolumeEstimator::default().estimate(
            &rim(),
            &mask_where(|x, _| x < 100),
            None,
            UtensilHint::Bowl,
            15.0,
        );
        assert!(est.percent_fill.is_some());
        assert!(est.volume_ml.is_none());
        assert!(est.px_per_mm.is_none());

        let zero = VolumeEstimator::default().estimate(
            &rim(),
            &mask_where(|x, _| x < 100),
            Some(0.0),
            UtensilHint::Bowl,
            15.0,
        );
        assert!(zero.volume_ml.is_none());
    }

    #[test]
    fn empty_mask_is_zero_fill_and_zero_volume() {
        let est = VolumeEstimator::default().estimate(
            &rim(),
            &FoodMask::new(200, 200),
            Some(200.0),
            UtensilHint::Cup,
            15.0,
        );
        assert_eq!(est.percent_fill, Some(0.0));
        assert_eq!(est.volume_ml, Some(0.0));
    }

    #[test]
    fn full_interior_is_one_hundred_percent() {
        let e = rim();
        let est = VolumeEstimator::default().estimate(
            &e,
            &mask_where(|x, y| e.contains(x as f64, y as f64)),
            Some(200.0),
            UtensilHint::Cup,
            15.0,
        );
        assert_eq!(est.percent_fill, Some(100.0));
        // Full cylinder: π·100²·15 mm³.
        assert_relative_eq!(
            est.volume_ml.unwrap(),
            std::f64::consts::PI * 1e4 * 15.0 / 1000.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn food_outside_the_rim_is_ignored() {
        let everything = mask_where(|_, _| true);
        let est = VolumeEstimator::default().estimate(&rim(), &everything, None, UtensilHint::Auto, 15.0);
        assert_eq!(est.percent_fill, Some(100.0));
        assert_eq!(est.food_px, est.interior_px);
    }

    #[test]
    fn fill_is_monotone_in_the_mask() {
        let est = VolumeEstimator::default();
        let mut last = -1.0;
        for cut in [0u32, 40, 80, 100, 130, 200] {
            let p = est
                .estimate(&rim(), &mask_where(|x, _| x < cut), Some(200.0), UtensilHint::Bowl, 15.0)
                .percent_fill
                .unwrap();
            assert!((0.0..=100.0).contains(&p));
            assert!(p >= last);
            last = p;
        }
    }

    #[test]
    fn plate_depth_does_not_scale_with_fill() {
        let est = VolumeEstimator::default().estimate(
            &rim(),
            &mask_where(|x, _| x < 100),
            Some(200.0),
            UtensilHint::Plate,
            10.0,
        );
        let f = est.percent_fill.unwrap() / 100.0;
        let expected = f * std::f64::consts::PI * 1e4 * 10.0 / 1000.0;
        assert_relative_eq!(est.volume_ml.unwrap(), expected, max_relative = 1e-9);
    }

    #[test]
    fn rim_off_the_mask_has_no_interior() {
        let far = Ellipse::circle([900.0, 900.0], 50.0).unwrap();
        let est = VolumeEstimator::default().estimate(
            &far,
            &FoodMask::new(200, 200),
            Some(100.0),
            UtensilHint::Auto,
            15.0,
        );
        assert_eq!(est.percent_fill, None);
        assert_eq!(est.volume_ml, None);
    }
}
