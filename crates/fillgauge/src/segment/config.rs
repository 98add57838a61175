use serde::{Deserialize, Serialize};

/// Food segmentation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Inward margin as a fraction of the rim's semi-minor axis; keeps the
    /// rim lip and its shading out of the analysis.
    pub margin_frac: f64,
    /// Lower bound on the inward margin (pixels).
    pub min_margin_px: f64,
    /// Fewer interior pixels than this after the margin is degenerate.
    pub min_interior_px: usize,
    /// Outer share of the interior (radially) sampled for the surface color.
    pub band_frac: f64,
    /// Floor on the ΔE threshold separating food from surface.
    pub min_delta_e: f32,
    /// ΔE threshold in robust standard deviations of the reference sample.
    pub mad_k: f32,
    /// Chroma at or below which a color counts as a neutral utensil surface.
    pub surface_max_chroma: f32,
    /// Neutral share of the interior needed to use it as the surface
    /// reference when food covers the outer band.
    pub min_surface_frac: f64,
    /// Pixels just inside the rim excluded from the lip sample, absorbing
    /// rim-fit error and edge blur.
    pub lip_guard_px: f64,
    /// Share of the lip that must differ from the interior before the lip is
    /// taken as the surface of a utensil whose interior is covered by food.
    pub min_lip_frac: f64,
    /// Radius of the morphological opening (0 disables it).
    pub open_radius: u8,
    /// Connected food regions smaller than this fraction of the interior are dropped.
    pub min_component_frac: f64,
    /// Allowed center overshoot beyond the frame, as a fraction of the shorter side.
    pub center_margin_frac: f64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            margin_frac: 0.08,
            min_margin_px: 2.0,
            min_interior_px: 64,
            band_frac: 0.2,
            min_delta_e: 12.0,
            mad_k: 3.0,
            surface_max_chroma: 12.0,
            min_surface_frac: 0.03,
            lip_guard_px: 1.5,
            min_lip_frac: 0.15,
            open_radius: 1,
            min_component_frac: 0.002,
            center_margin_frac: 0.05,
        }
    }
}
