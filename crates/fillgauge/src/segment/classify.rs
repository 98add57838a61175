//! Surface-color reference and food / not-food decision.

use super::color::{median_in_place, median_lab, Lab};
use super::config::SegmentConfig;
use crate::conic::Ellipse;

/// Scale from MAD to a normal-equivalent standard deviation.
const MAD_TO_SIGMA: f32 = 1.4826;

/// Where the surface reference color came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SurfaceSource {
    /// Neutral outer band of the interior (empty or partly filled utensil).
    RimBand,
    /// Band is covered by food; neutral pixels elsewhere give the surface.
    NeutralInterior,
    /// Food covers the whole interior; the exposed rim lip gives the surface.
    RimLip,
    /// No neutral surface anywhere; the band color is the utensil's own.
    ColoredUtensil,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SurfaceModel {
    pub reference: Lab,
    /// ΔE above which a pixel is food.
    pub threshold: f32,
    pub source: SurfaceSource,
}

impl SurfaceModel {
    #[inline]
    pub fn is_food(&self, c: &Lab) -> bool {
        c.delta_e(&self.reference) > self.threshold
    }
}

/// Estimate the utensil surface color from the interior pixels.
///
/// `pixels` and `labs` are parallel; `interior` is the shrunk analysis ellipse.
/// `lip` holds the colors of the ring between the interior and the rim, only
/// consulted when neither the band nor the interior shows a neutral surface.
pub(crate) fn surface_model(
    interior: &Ellipse,
    pixels: &[(u32, u32)],
    labs: &[Lab],
    lip: &[Lab],
    cfg: &SegmentConfig,
) -> Option<SurfaceModel> {
    let inner = (1.0 - cfg.band_frac.clamp(0.0, 1.0)).powi(2);
    let band: Vec<Lab> = pixels
        .iter()
        .zip(labs)
        .filter(|((x, y), _)| interior.normalized_radius_sq(*x as f64, *y as f64) >= inner)
        .map(|(_, c)| *c)
        .collect();
    let band = if band.is_empty() { labs.to_vec() } else { band };
    let band_ref = median_lab(&band)?;

    let (samples, source) = if band_ref.chroma() <= cfg.surface_max_chroma {
        (band, SurfaceSource::RimBand)
    } else {
        let neutral: Vec<Lab> = labs
            .iter()
            .filter(|c| c.chroma() <= cfg.surface_max_chroma)
            .copied()
            .collect();
        if neutral.len() as f64 >= cfg.min_surface_frac * labs.len() as f64 && !neutral.is_empty() {
            (neutral, SurfaceSource::NeutralInterior)
        } else {
            let band_threshold = robust_threshold(&band, &band_ref, cfg)?;
            let exposed: Vec<Lab> = lip
                .iter()
                .filter(|c| c.delta_e(&band_ref) > band_threshold)
                .copied()
                .collect();
            if !exposed.is_empty() && exposed.len() as f64 >= cfg.min_lip_frac * lip.len() as f64 {
                (exposed, SurfaceSource::RimLip)
            } else {
                (band, SurfaceSource::ColoredUtensil)
            }
        }
    };

    let reference = match source {
        SurfaceSource::NeutralInterior | SurfaceSource::RimLip => median_lab(&samples)?,
        _ => band_ref,
    };
    let threshold = robust_threshold(&samples, &reference, cfg)?;

    Some(SurfaceModel {
        reference,
        threshold,
        source,
    })
}

/// ΔE cutoff: `mad_k` robust sigmas of `samples` around `reference`, floored.
fn robust_threshold(samples: &[Lab], reference: &Lab, cfg: &SegmentConfig) -> Option<f32> {
    let mut dists: Vec<f32> = samples.iter().map(|c| c.delta_e(reference)).collect();
    let mad = median_in_place(&mut dists)?;
    Some(cfg.min_delta_e.max(cfg.mad_k * MAD_TO_SIGMA * mad))
}
