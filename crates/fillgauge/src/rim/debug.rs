//! Serializable rim-detection diagnostics.

use serde::{Deserialize, Serialize};

use super::proposal::Proposal;
use crate::conic::Ellipse;
use crate::frame::RadiusBounds;

/// Why a candidate did not qualify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    TooFewEdges { hits: usize, rays: usize },
    FitFailed { detail: String },
    LowInlierRatio { ratio: f32 },
    LowArcCoverage { coverage: f32 },
    OutOfRadiusRange { semi_major: f64 },
    Degenerate { major: f64, minor: f64 },
    CenterOutsideFrame { center_xy: [f64; 2] },
}

/// Per-proposal record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateDebug {
    /// Proposal this candidate grew from, in input pixels.
    pub proposal_xy: [f32; 2],
    pub proposal_score: f32,
    pub edge_hits: usize,
    /// Fitted ellipse in input pixels, when a fit was obtained.
    pub ellipse: Option<Ellipse>,
    pub inlier_ratio: Option<f32>,
    pub rms_residual_px: Option<f64>,
    pub arc_coverage: Option<f32>,
    pub hint_affinity: Option<f64>,
    pub rank: Option<f64>,
    /// `None` for qualifying candidates.
    pub rejected: Option<RejectReason>,
}

/// Full detection trace; `selected` indexes into `candidates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RimDebug {
    pub working_scale: f64,
    /// Radius bounds in input pixels.
    pub bounds: RadiusBounds,
    /// Proposals in input pixels.
    pub proposals: Vec<Proposal>,
    pub candidates: Vec<CandidateDebug>,
    pub selected: Option<usize>,
}
