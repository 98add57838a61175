use super::request::MeasureRequest;
use super::result::{FillReport, FillStatus};
use crate::error::InputError;
use crate::frame::{validate_frame, Frame};
use crate::rim::{RimDebug, RimDetector, RimFit};
use crate::segment::FoodSegmenter;
use crate::utensil::UtensilHint;
use crate::volume::{DepthModel, FillEstimate, VolumeEstimator};

pub(crate) struct Stages<'a> {
    pub rim: &'a RimDetector,
    pub segmenter: &'a FoodSegmenter,
    pub estimator: &'a VolumeEstimator,
}

/// Validate, then run rim → segmentation → estimation.
pub(crate) fn measure(
    frame: &Frame,
    request: &MeasureRequest,
    stages: &Stages<'_>,
) -> Result<(FillReport, RimDebug), InputError> {
    validate_frame(frame)?;
    let (w, h) = frame.dimensions();
    let bounds = request.bounds_for(w, h)?;
    let diameter_mm = request.calibration()?;
    let height_mm = request.height_or(stages.estimator.config().default_assumed_height_mm)?;

    let (rim, rim_debug) = stages.rim.detect_with_debug(frame, request.utensil, &bounds);
    let report = finish(frame, request.utensil, rim, diameter_mm, height_mm, stages);

    tracing::info!(
        "{}x{} {}: {:?}, fill {}, volume {}",
        w,
        h,
        request.utensil,
        report.status,
        report
            .estimate
            .percent_fill
            .map_or_else(|| "-".to_string(), |p| format!("{p:.1}%")),
        report
            .estimate
            .volume_ml
            .map_or_else(|| "-".to_string(), |v| format!("{v:.1} ml")),
    );
    Ok((report, rim_debug))
}

fn finish(
    frame: &Frame,
    utensil: UtensilHint,
    rim: Option<RimFit>,
    diameter_mm: Option<f64>,
    height_mm: f64,
    stages: &Stages<'_>,
) -> FillReport {
    let (w, h) = frame.dimensions();
    let model = DepthModel::for_hint(utensil, stages.estimator.config());
    let mut report = FillReport {
        image_size: [w, h],
        utensil,
        ellipse: rim.map(|r| r.ellipse),
        rim,
        estimate: FillEstimate::absent(model),
        status: FillStatus::RimNotFound,
        mask: None,
    };
    let Some(rim) = rim else {
        return report;
    };

    let Some(mask) = stages.segmenter.segment(frame, &rim.ellipse) else {
        report.status = FillStatus::DegenerateGeometry;
        return report;
    };

    let estimate = stages
        .estimator
        .estimate(&rim.ellipse, &mask, diameter_mm, utensil, height_mm);
    report.status = match (estimate.percent_fill, estimate.volume_ml) {
        (None, _) => FillStatus::DegenerateGeometry,
        (Some(_), None) => FillStatus::MissingCalibration,
        (Some(_), Some(_)) => FillStatus::Complete,
    };
    report.estimate = estimate;
    report.mask = Some(mask);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conic::Ellipse;
    use crate::pipeline::FillStatus;
    use crate::test_utils::plate_scene;

    fn stages_with<R>(f: impl FnOnce(&Stages<'_>) -> R) -> R {
        let (rim, segmenter, estimator) = (
            RimDetector::default(),
            FoodSegmenter::default(),
            VolumeEstimator::default(),
        );
        f(&Stages {
            rim: &rim,
            segmenter: &segmenter,
            estimator: &estimator,
        })
    }

    #[test]
    fn vanishing_interior_is_degenerate_geometry() {
        let frame = plate_scene(240, 200, &Ellipse::circle([120.0, 100.0], 160.0).unwrap());
        let tiny = RimFit {
            ellipse: Ellipse::new([120.0, 100.0], [6.0, 3.0], 10.0).unwrap(),
            inlier_ratio: 1.0,
            rms_residual_px: 0.1,
            arc_coverage: 1.0,
            hint_affinity: 1.0,
        };
        let report = stages_with(|s| finish(&frame, UtensilHint::Bowl, Some(tiny), Some(160.0), 15.0, s));
        assert_eq!(report.status, FillStatus::DegenerateGeometry);
        assert!(report.mask.is_none());
        assert!(report.estimate.percent_fill.is_none());
        assert!(report.estimate.volume_ml.is_none());
        assert_eq!(report.ellipse, Some(tiny.ellipse));
    }

    #[test]
    fn missing_rim_short_circuits() {
        let frame = plate_scene(240, 200, &Ellipse::circle([120.0, 100.0], 160.0).unwrap());
        let report = stages_with(|s| finish(&frame, UtensilHint::Auto, None, Some(160.0), 15.0, s));
        assert_eq!(report.status, FillStatus::RimNotFound);
        assert!(report.mask.is_none() && report.ellipse.is_none());
    }
}
