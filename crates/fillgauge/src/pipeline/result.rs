use serde::{Deserialize, Serialize};

use crate::conic::Ellipse;
use crate::rim::RimFit;
use crate::segment::FoodMask;
use crate::utensil::UtensilHint;
use crate::volume::FillEstimate;

/// Outcome class of a measurement. Only input validation is an error; every
/// other shortfall is reported here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStatus {
    /// Fill percentage and volume are both present.
    Complete,
    /// No qualifying rim; nothing downstream ran.
    RimNotFound,
    /// The rim was found but its interior is unusable.
    DegenerateGeometry,
    /// Fill is present; volume needs a rim diameter.
    MissingCalibration,
}

impl FillStatus {
    /// Short human-readable summary.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Complete => "ok",
            Self::RimNotFound => "Utensil not detected",
            Self::DegenerateGeometry => "Utensil interior too small to analyze",
            Self::MissingCalibration => "Rim diameter not given, volume unavailable",
        }
    }
}

/// Full measurement result for a single frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillReport {
    /// Image dimensions [width, height].
    pub image_size: [u32; 2],
    pub utensil: UtensilHint,
    /// Rim ellipse in input pixels, if detected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ellipse: Option<Ellipse>,
    /// Fit-quality metrics of the rim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rim: Option<RimFit>,
    pub estimate: FillEstimate,
    pub status: FillStatus,
    /// Food mask with the frame's dimensions, when segmentation ran.
    #[serde(skip)]
    pub mask: Option<FoodMask>,
}

impl FillReport {
    pub fn percent_fill(&self) -> Option<f64> {
        self.estimate.percent_fill
    }

    pub fn volume_ml(&self) -> Option<f64> {
        self.estimate.volume_ml
    }
}
