use serde::{Deserialize, Serialize};

use super::edge_sample::EdgeSampleConfig;
use super::proposal::ProposalConfig;
use crate::conic::RansacConfig;

/// Rim detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RimConfig {
    /// Gaussian sigma applied to the intensity channel (working pixels).
    pub blur_sigma: f32,
    /// Longer frame side used for detection; `None` keeps full resolution.
    pub max_working_side: Option<u32>,
    pub proposal: ProposalConfig,
    pub edges: EdgeSampleConfig,
    pub ransac: RansacConfig,
    /// Minimum inlier share of the edge samples for an accepted fit.
    pub min_inlier_ratio: f32,
    /// Minimum fraction of the rim's angular extent supported by inliers.
    pub min_arc_coverage: f32,
    /// Angular bins used to measure arc coverage.
    pub arc_bins: usize,
    /// Full minor axis below this (working pixels) is degenerate.
    pub min_minor_px: f64,
    /// `minor / major` below this is degenerate.
    pub min_axis_ratio: f64,
    /// Allowed center overshoot beyond the frame, as a fraction of the shorter side.
    pub center_margin_frac: f64,
    /// Width of the Gaussian aspect-ratio prior applied by a utensil hint.
    pub hint_sigma: f64,
    /// Lowest weight a hint can assign; keeps the hint a bias, not a filter.
    pub hint_floor: f64,
    /// Ranks within this relative distance of the best are tied.
    pub tie_tolerance: f64,
}

impl Default for RimConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.5,
            max_working_side: Some(1024),
            proposal: ProposalConfig::default(),
            edges: EdgeSampleConfig::default(),
            ransac: RansacConfig::default(),
            min_inlier_ratio: 0.5,
            min_arc_coverage: 0.5,
            arc_bins: 36,
            min_minor_px: 6.0,
            min_axis_ratio: 0.15,
            center_margin_frac: 0.05,
            hint_sigma: 0.25,
            hint_floor: 0.3,
            tie_tolerance: 1e-3,
        }
    }
}
