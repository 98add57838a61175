//! High-level measurement API.
//!
//! [`FillGauge`] wraps a [`FillConfig`] and the three stage objects built from
//! it. Create once, measure many frames.

use std::path::Path;

use crate::config::FillConfig;
use crate::error::{ConfigError, InputError};
use crate::frame::Frame;
use crate::pipeline::{self, FillReport, MeasureRequest, Stages};
use crate::rim::{RimDebug, RimDetector};
use crate::segment::FoodSegmenter;
use crate::volume::VolumeEstimator;

/// Primary measurement interface.
///
/// # Examples
///
/// ```no_run
/// use fillgauge::{FillGauge, MeasureRequest, UtensilHint};
///
/// let frame = image::open("lunch.jpg").unwrap().to_rgb8();
/// let gauge = FillGauge::default();
/// let request = MeasureRequest::new(UtensilHint::Bowl).with_diameter_mm(160.0);
/// let report = gauge.measure(&frame, &request).unwrap();
/// println!("{:?} {:?}", report.percent_fill(), report.volume_ml());
/// ```
#[derive(Debug, Clone)]
pub struct FillGauge {
    config: FillConfig,
    rim: RimDetector,
    segmenter: FoodSegmenter,
    estimator: VolumeEstimator,
}

impl Default for FillGauge {
    fn default() -> Self {
        Self::new(FillConfig::default())
    }
}

impl FillGauge {
    pub fn new(config: FillConfig) -> Self {
        Self {
            rim: RimDetector::new(config.rim.clone()),
            segmenter: FoodSegmenter::new(config.segment.clone()),
            estimator: VolumeEstimator::new(config.volume.clone()),
            config,
        }
    }

    /// Load a JSON config override and build a gauge from it.
    pub fn from_config_file(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::new(FillConfig::from_json_file(path)?))
    }

    pub fn config(&self) -> &FillConfig {
        &self.config
    }

    pub fn rim_detector(&self) -> &RimDetector {
        &self.rim
    }

    pub fn segmenter(&self) -> &FoodSegmenter {
        &self.segmenter
    }

    pub fn estimator(&self) -> &VolumeEstimator {
        &self.estimator
    }

    /// Measure fill and volume in one frame.
    pub fn measure(&self, frame: &Frame, request: &MeasureRequest) -> Result<FillReport, InputError> {
        self.measure_with_debug(frame, request).map(|(report, _)| report)
    }

    /// Like [`measure`](Self::measure), also returning the rim-detection trace.
    pub fn measure_with_debug(
        &self,
        frame: &Frame,
        request: &MeasureRequest,
    ) -> Result<(FillReport, RimDebug), InputError> {
        let stages = Stages {
            rim: &self.rim,
            segmenter: &self.segmenter,
            estimator: &self.estimator,
        };
        pipeline::measure(frame, request, &stages)
    }
}
