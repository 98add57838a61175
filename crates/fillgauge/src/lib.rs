//! fillgauge — estimate how full a bowl, plate or cup is from a single photo.
//!
//! The pipeline stages are:
//!
//! 1. **Rim** – gradient-voting center proposals, radial edge sampling and a
//!    RANSAC ellipse fit locate the utensil's opening.
//! 2. **Segment** – a CIE Lab color rule separates food from the utensil
//!    surface inside the rim, followed by morphological cleanup and masking
//!    to the rim ellipse.
//! 3. **Volume** – food pixels over interior pixels give the fill fraction; a
//!    known rim diameter and a utensil-specific depth model turn it into ml.
//!
//! # Public API
//! - [`FillGauge`] with [`MeasureRequest`] → [`FillReport`] as the main entry point
//! - [`RimDetector`], [`FoodSegmenter`] and [`VolumeEstimator`] for running
//!   stages on their own
//! - [`FillConfig`] for tuning, loadable from JSON

mod api;
mod config;
mod conic;
mod error;
mod frame;
mod pipeline;
mod rim;
mod segment;
mod utensil;
mod volume;

#[cfg(test)]
pub(crate) mod test_utils;

pub use api::FillGauge;
pub use config::FillConfig;
pub use conic::{ConicError, Ellipse, EllipseParams, RansacConfig};
pub use error::{ConfigError, EllipseError, InputError};
pub use frame::{Frame, RadiusBounds, MIN_FRAME_SIDE};
pub use pipeline::{FillReport, FillStatus, MeasureRequest};
pub use rim::{
    hint_affinity, CandidateDebug, EdgeSampleConfig, Proposal, ProposalConfig, RejectReason,
    RimConfig, RimDebug, RimDetector, RimFit,
};
pub use segment::{FoodMask, FoodSegmenter, Lab, SegmentConfig};
pub use utensil::{ParseUtensilError, UtensilHint};
pub use volume::{DepthModel, FillEstimate, VolumeConfig, VolumeEstimator, DEFAULT_ASSUMED_HEIGHT_MM};
