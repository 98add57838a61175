//! Rim detection: locate the utensil's opening as an ellipse.
//!
//! Stages, all on a single intensity channel at working resolution:
//!
//! 1. gradient voting for rim-center proposals ([`proposal`]),
//! 2. radial edge sampling around each proposal ([`edge_sample`]),
//! 3. RANSAC + direct least-squares ellipse fit,
//! 4. quality gates, then hint-weighted ranking ([`select`]).

mod config;
mod debug;
pub(crate) mod edge_sample;
pub(crate) mod proposal;
mod select;

pub use config::RimConfig;
pub use debug::{CandidateDebug, RejectReason, RimDebug};
pub use edge_sample::EdgeSampleConfig;
pub use proposal::{Proposal, ProposalConfig};
pub use select::hint_affinity;

use serde::{Deserialize, Serialize};

use crate::conic::{fit_ellipse_ransac, Ellipse, RansacFit};
use crate::frame::{self, Frame, RadiusBounds};
use crate::utensil::UtensilHint;

/// Selected rim with its fit-quality metrics, in input pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RimFit {
    pub ellipse: Ellipse,
    /// RANSAC inliers over edge samples.
    pub inlier_ratio: f32,
    pub rms_residual_px: f64,
    /// Fraction of angular bins around the rim supported by inliers.
    pub arc_coverage: f32,
    /// Weight the utensil hint gave this shape, in `[hint_floor, 1]`.
    pub hint_affinity: f64,
}

/// Finds the utensil rim in a color frame.
///
/// Holds only configuration; every call is independent.
#[derive(Debug, Clone, Default)]
pub struct RimDetector {
    config: RimConfig,
}

impl RimDetector {
    pub fn new(config: RimConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RimConfig {
        &self.config
    }

    /// Best rim ellipse whose semi-major axis lies within `bounds`, or `None`.
    pub fn detect(&self, frame: &Frame, hint: UtensilHint, bounds: &RadiusBounds) -> Option<Ellipse> {
        self.detect_fit(frame, hint, bounds).map(|fit| fit.ellipse)
    }

    /// Like [`detect`](Self::detect), keeping the fit metrics.
    pub fn detect_fit(&self, frame: &Frame, hint: UtensilHint, bounds: &RadiusBounds) -> Option<RimFit> {
        self.run(frame, hint, bounds).0
    }

    /// Detection plus a full per-candidate trace. The result is the same as
    /// [`detect_fit`](Self::detect_fit).
    pub fn detect_with_debug(
        &self,
        frame: &Frame,
        hint: UtensilHint,
        bounds: &RadiusBounds,
    ) -> (Option<RimFit>, RimDebug) {
        self.run(frame, hint, bounds)
    }

    fn run(&self, frame: &Frame, hint: UtensilHint, bounds: &RadiusBounds) -> (Option<RimFit>, RimDebug) {
        let cfg = &self.config;
        let (w, h) = frame.dimensions();
        let scale = frame::working_scale(w, h, cfg.max_working_side);
        let mut debug = RimDebug {
            working_scale: scale,
            bounds: *bounds,
            proposals: Vec::new(),
            candidates: Vec::new(),
            selected: None,
        };

        if RadiusBounds::new(bounds.min_radius, bounds.max_radius).is_err() {
            tracing::warn!(
                "invalid radius bounds min={} max={}, skipping rim detection",
                bounds.min_radius,
                bounds.max_radius
            );
            return (None, debug);
        }
        if w < frame::MIN_FRAME_SIDE || h < frame::MIN_FRAME_SIDE {
            return (None, debug);
        }

        let gray = frame::intensity(frame, cfg.blur_sigma, scale);
        let (gw, gh) = gray.dimensions();
        let work_bounds = bounds.scaled(scale);
        let to_input = 1.0 / scale;

        let proposals = proposal::find_proposals(&gray, &work_bounds, &cfg.proposal);
        debug.proposals = proposals
            .iter()
            .map(|p| Proposal {
                x: p.x * to_input as f32,
                y: p.y * to_input as f32,
                score: p.score,
            })
            .collect();

        let center_margin = cfg.center_margin_frac * gw.min(gh) as f64;
        let mut qualified: Vec<(usize, RimFit)> = Vec::new();

        for p in &proposals {
            let mut record = CandidateDebug {
                proposal_xy: [p.x * to_input as f32, p.y * to_input as f32],
                proposal_score: p.score,
                edge_hits: 0,
                ellipse: None,
                inlier_ratio: None,
                rms_residual_px: None,
                arc_coverage: None,
                hint_affinity: None,
                rank: None,
                rejected: None,
            };

            match self.evaluate(&gray, [p.x, p.y], &work_bounds, center_margin, hint, &mut record) {
                Ok(fit_work) => match rescale_fit(&fit_work, to_input) {
                    Some(fit) => {
                        record.ellipse = Some(fit.ellipse);
                        record.rms_residual_px = Some(fit.rms_residual_px);
                        record.rank = Some(select::rank_score(&fit.ellipse, fit.hint_affinity));
                        qualified.push((debug.candidates.len(), fit));
                    }
                    None => {
                        record.rejected = Some(RejectReason::Degenerate {
                            major: fit_work.ellipse.major() * to_input,
                            minor: fit_work.ellipse.minor() * to_input,
                        });
                    }
                },
                Err(reason) => {
                    tracing::trace!("candidate at ({:.1}, {:.1}) rejected: {:?}", p.x, p.y, reason);
                    record.rejected = Some(reason);
                }
            }
            debug.candidates.push(record);
        }

        let ranked: Vec<(Ellipse, f64)> = qualified
            .iter()
            .map(|(i, fit)| (fit.ellipse, debug.candidates[*i].rank.unwrap_or(f64::NAN)))
            .collect();
        let frame_center = [(w as f64 - 1.0) * 0.5, (h as f64 - 1.0) * 0.5];
        let best = select::select_best(&ranked, frame_center, cfg.tie_tolerance);

        let result = best.map(|k| {
            let (idx, fit) = qualified[k];
            debug.selected = Some(idx);
            fit
        });
        match &result {
            Some(fit) => tracing::debug!(
                "rim at ({:.1}, {:.1}) axes {:.1}x{:.1} angle {:.1}°, {} of {} candidates qualified",
                fit.ellipse.cx(),
                fit.ellipse.cy(),
                fit.ellipse.major(),
                fit.ellipse.minor(),
                fit.ellipse.angle_deg(),
                qualified.len(),
                proposals.len()
            ),
            None => tracing::debug!("no rim among {} proposals", proposals.len()),
        }
        (result, debug)
    }

    /// Edge sampling, fit and quality gates for one proposal, in working pixels.
    fn evaluate(
        &self,
        gray: &image::GrayImage,
        center: [f32; 2],
        bounds: &RadiusBounds,
        center_margin: f64,
        hint: UtensilHint,
        record: &mut CandidateDebug,
    ) -> Result<RimFit, RejectReason> {
        let cfg = &self.config;
        let samples = edge_sample::sample_rim_edges(gray, center, bounds, &cfg.edges);
        record.edge_hits = samples.points.len();
        if samples.coverage() < cfg.edges.min_ray_coverage {
            return Err(RejectReason::TooFewEdges {
                hits: samples.points.len(),
                rays: samples.n_rays,
            });
        }

        let fit = fit_ellipse_ransac(&samples.points, &cfg.ransac).map_err(|e| RejectReason::FitFailed {
            detail: e.to_string(),
        })?;
        let e = fit.ellipse;
        let inlier_ratio = fit.num_inliers as f32 / samples.points.len().max(1) as f32;
        let arc_coverage = arc_coverage(&fit, &samples.points, cfg.ransac.inlier_threshold, cfg.arc_bins);
        record.inlier_ratio = Some(inlier_ratio);
        record.arc_coverage = Some(arc_coverage);

        if e.minor() < cfg.min_minor_px || e.minor() / e.major() < cfg.min_axis_ratio {
            return Err(RejectReason::Degenerate {
                major: e.major(),
                minor: e.minor(),
            });
        }
        if !bounds.contains(e.semi_major()) {
            return Err(RejectReason::OutOfRadiusRange {
                semi_major: e.semi_major(),
            });
        }
        let (gw, gh) = gray.dimensions();
        if !e.center_within(gw, gh, center_margin) {
            return Err(RejectReason::CenterOutsideFrame { center_xy: e.center() });
        }
        if inlier_ratio < cfg.min_inlier_ratio {
            return Err(RejectReason::LowInlierRatio { ratio: inlier_ratio });
        }
        if arc_coverage < cfg.min_arc_coverage {
            return Err(RejectReason::LowArcCoverage { coverage: arc_coverage });
        }

        let affinity = select::hint_affinity(hint, e.aspect_ratio(), cfg.hint_sigma, cfg.hint_floor);
        record.hint_affinity = Some(affinity);
        Ok(RimFit {
            ellipse: e,
            inlier_ratio,
            rms_residual_px: fit.rms_residual,
            arc_coverage,
            hint_affinity: affinity,
        })
    }
}

/// Share of `bins` equal angular sectors around the fitted center that hold
/// at least one inlier.
fn arc_coverage(fit: &RansacFit, points: &[[f64; 2]], threshold: f64, bins: usize) -> f32 {
    let bins = bins.max(4);
    let e = &fit.ellipse;
    let mut hit = vec![false; bins];
    for &[x, y] in points {
        if e.sampson_distance(x, y) >= threshold {
            continue;
        }
        let theta = (y - e.cy()).atan2(x - e.cx()).rem_euclid(std::f64::consts::TAU);
        let k = ((theta / std::f64::consts::TAU) * bins as f64) as usize;
        hit[k.min(bins - 1)] = true;
    }
    hit.iter().filter(|&&b| b).count() as f32 / bins as f32
}

fn rescale_fit(fit: &RimFit, factor: f64) -> Option<RimFit> {
    if factor == 1.0 {
        return Some(*fit);
    }
    Some(RimFit {
        ellipse: fit.ellipse.scaled(factor)?,
        rms_residual_px: fit.rms_residual_px * factor,
        ..*fit
    })
}
