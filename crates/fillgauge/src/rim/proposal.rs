//! Gradient-voting rim-center proposals.
//!
//! Every pixel with a strong gradient casts weighted votes along both
//! directions of its gradient at every radius in the caller's rim range. The
//! boundary of a round opening converges on its center, so accumulator peaks
//! mark where a rim could be centered.

use image::{GrayImage, ImageBuffer, Luma};

use crate::frame::RadiusBounds;

/// Configuration for center proposal voting.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProposalConfig {
    /// Gradient magnitude threshold (fraction of the strongest gradient).
    pub grad_threshold: f32,
    /// Upper bound on distinct voting radii; long ranges are strided.
    pub max_radius_steps: usize,
    /// NMS radius as a fraction of `min_radius`.
    pub nms_radius_frac: f32,
    /// Minimum accumulator value for a proposal (fraction of max).
    pub min_vote_frac: f32,
    /// Gaussian sigma for accumulator smoothing.
    pub accum_sigma: f32,
    /// Number of best proposals handed to the edge sampler.
    pub max_candidates: usize,
}

impl Default for ProposalConfig {
    fn default() -> Self {
        Self {
            grad_threshold: 0.12,
            max_radius_steps: 64,
            nms_radius_frac: 0.5,
            min_vote_frac: 0.2,
            accum_sigma: 2.0,
            max_candidates: 6,
        }
    }
}

/// A proposed rim center with its vote score, in working pixels.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Proposal {
    pub x: f32,
    pub y: f32,
    pub score: f32,
}

#[inline]
fn splat(accum: &mut [f32], stride: usize, x: f32, y: f32, weight: f32) {
    let x0 = x as usize;
    let y0 = y as usize;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;
    let i = y0 * stride + x0;
    accum[i] += weight * (1.0 - fx) * (1.0 - fy);
    accum[i + 1] += weight * fx * (1.0 - fy);
    accum[i + stride] += weight * (1.0 - fx) * fy;
    accum[i + stride + 1] += weight * fx * fy;
}

fn voting_radii(bounds: &RadiusBounds, max_steps: usize) -> Vec<f32> {
    let lo = bounds.min_radius as f32;
    let hi = bounds.max_radius as f32;
    let step = ((hi - lo) / max_steps.max(1) as f32).max(1.0);
    let mut radii = Vec::new();
    let mut r = lo;
    while r <= hi {
        radii.push(r);
        r += step;
    }
    radii
}

/// Rim-center proposals sorted by score, best first.
pub fn find_proposals(gray: &GrayImage, bounds: &RadiusBounds, config: &ProposalConfig) -> Vec<Proposal> {
    let (w, h) = gray.dimensions();
    if w < 4 || h < 4 {
        return Vec::new();
    }

    let gx = imageproc::gradients::horizontal_scharr(gray);
    let gy = imageproc::gradients::vertical_scharr(gray);
    let gx_raw = gx.as_raw();
    let gy_raw = gy.as_raw();

    let max_mag_sq = gx_raw
        .iter()
        .zip(gy_raw)
        .map(|(&a, &b)| (a as f32).powi(2) + (b as f32).powi(2))
        .fold(0.0f32, f32::max);
    if max_mag_sq < 1e-12 {
        return Vec::new();
    }
    let threshold_sq = (config.grad_threshold * config.grad_threshold) * max_mag_sq;

    let radii = voting_radii(bounds, config.max_radius_steps);
    if radii.is_empty() {
        return Vec::new();
    }

    let stride = w as usize;
    let mut accum = vec![0.0f32; stride * h as usize];
    let x_limit = (w - 1) as f32;
    let y_limit = (h - 1) as f32;

    for (idx, (&gxv, &gyv)) in gx_raw.iter().zip(gy_raw).enumerate() {
        let (gxv, gyv) = (gxv as f32, gyv as f32);
        let mag_sq = gxv * gxv + gyv * gyv;
        if mag_sq < threshold_sq {
            continue;
        }
        let mag = mag_sq.sqrt();
        let (dx, dy) = (gxv / mag, gyv / mag);
        let xf = (idx % stride) as f32;
        let yf = (idx / stride) as f32;

        for &r in &radii {
            for sign in [1.0f32, -1.0] {
                let vx = xf + sign * dx * r;
                let vy = yf + sign * dy * r;
                if vx >= 0.0 && vx < x_limit && vy >= 0.0 && vy < y_limit {
                    splat(&mut accum, stride, vx, vy, mag);
                }
            }
        }
    }

    let Some(accum_img) = ImageBuffer::<Luma<f32>, Vec<f32>>::from_raw(w, h, accum) else {
        return Vec::new();
    };
    let smoothed = if config.accum_sigma > 0.0 {
        imageproc::filter::gaussian_blur_f32(&accum_img, config.accum_sigma)
    } else {
        accum_img
    };
    let data = smoothed.as_raw();

    let max_val = data.iter().copied().fold(0.0f32, f32::max);
    if max_val < 1e-6 {
        return Vec::new();
    }
    let vote_threshold = config.min_vote_frac * max_val;

    let nms_radius = (config.nms_radius_frac * bounds.min_radius as f32).max(3.0);
    let nms_r = nms_radius.ceil() as i32;
    let nms_r_sq = nms_radius * nms_radius;
    let offsets: Vec<isize> = (-nms_r..=nms_r)
        .flat_map(|dy| (-nms_r..=nms_r).map(move |dx| (dx, dy)))
        .filter(|&(dx, dy)| (dx, dy) != (0, 0) && ((dx * dx + dy * dy) as f32) <= nms_r_sq)
        .map(|(dx, dy)| dy as isize * stride as isize + dx as isize)
        .collect();

    let mut proposals = Vec::new();
    for y in nms_r..(h as i32 - nms_r) {
        for x in nms_r..(w as i32 - nms_r) {
            let idx = y as usize * stride + x as usize;
            let val = data[idx];
            if val < vote_threshold {
                continue;
            }
            let is_peak = offsets.iter().all(|&off| {
                let n = idx.wrapping_add_signed(off);
                data[n] < val || (data[n] == val && n > idx)
            });
            if is_peak {
                proposals.push(Proposal {
                    x: x as f32,
                    y: y as f32,
                    score: val,
                });
            }
        }
    }

    proposals.sort_by(|a, b| b.score.total_cmp(&a.score));
    proposals.truncate(config.max_candidates);
    tracing::debug!(
        "{} rim-center proposals over {} voting radii",
        proposals.len(),
        radii.len()
    );
    proposals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::draw_disk_gray;

    #[test]
    fn finds_disk_center() {
        let img = draw_disk_gray(160, 140, [82.0, 67.0], 40.0, 210, 40);
        let bounds = RadiusBounds::new(25.0, 60.0).unwrap();
        let proposals = find_proposals(&img, &bounds, &ProposalConfig::default());
        assert!(!proposals.is_empty());
        let best = proposals[0];
        let err = (best.x - 82.0).hypot(best.y - 67.0);
        assert!(err < 3.0, "best proposal ({}, {}) off by {err}", best.x, best.y);
    }

    #[test]
    fn flat_image_has_no_proposals() {
        let img = GrayImage::from_pixel(64, 64, Luma([128]));
        let bounds = RadiusBounds::new(10.0, 30.0).unwrap();
        assert!(find_proposals(&img, &bounds, &ProposalConfig::default()).is_empty());
    }

    #[test]
    fn long_ranges_are_strided() {
        let bounds = RadiusBounds::new(10.0, 650.0).unwrap();
        let radii = voting_radii(&bounds, 64);
        assert!(radii.len() <= 65);
        assert_eq!(radii[0], 10.0);
        let bounds = RadiusBounds::new(10.0, 20.0).unwrap();
        assert_eq!(voting_radii(&bounds, 64).len(), 11);
    }
}
