//! Radial rim-edge sampling around a center proposal.
//!
//! Rays are cast from the proposal; along each ray the smoothed radial
//! derivative of intensity is scanned and the outermost strong transition is
//! taken as the rim crossing. Inner transitions (food boundary, shadows) lose
//! to the outer one as long as the rim is at least `peak_floor` as strong.

use image::GrayImage;

use crate::frame::RadiusBounds;

/// Configuration for radial edge sampling.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EdgeSampleConfig {
    /// Number of radial rays to cast.
    pub n_rays: usize,
    /// Step along each ray (pixels).
    pub r_step: f32,
    /// Rays start at this fraction of `min_radius` so flat plates whose minor
    /// semi-axis falls below the bound are still traced.
    pub inner_frac: f32,
    /// Rays end at this multiple of `max_radius`.
    pub outer_frac: f32,
    /// Minimum |dI/dr| (intensity in [0, 1] per pixel) for an edge.
    pub min_edge_contrast: f32,
    /// A peak must reach this fraction of the ray's strongest peak to count.
    pub peak_floor: f32,
    /// Minimum fraction of rays with a hit before a fit is attempted.
    pub min_ray_coverage: f32,
}

impl Default for EdgeSampleConfig {
    fn default() -> Self {
        Self {
            n_rays: 96,
            r_step: 1.0,
            inner_frac: 0.35,
            outer_frac: 1.1,
            min_edge_contrast: 0.015,
            peak_floor: 0.5,
            min_ray_coverage: 0.35,
        }
    }
}

/// Edge samples for one proposal.
#[derive(Debug, Clone, Default)]
pub struct EdgeSamples {
    /// Sub-pixel rim crossings in working pixels.
    pub points: Vec<[f64; 2]>,
    /// Rays actually cast.
    pub n_rays: usize,
}

impl EdgeSamples {
    /// Fraction of rays that produced a rim crossing.
    pub fn coverage(&self) -> f32 {
        self.points.len() as f32 / self.n_rays.max(1) as f32
    }
}

/// Bilinear sample of a grayscale image, intensity in [0, 1].
/// `None` when the 2x2 neighbourhood leaves the image.
#[inline]
pub fn bilinear_sample(img: &GrayImage, x: f32, y: f32) -> Option<f32> {
    let (w, h) = img.dimensions();
    if w < 2 || h < 2 || !(x >= 0.0 && y >= 0.0) {
        return None;
    }
    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    if x0 >= w - 1 || y0 >= h - 1 {
        return None;
    }
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;
    let stride = w as usize;
    let i = y0 as usize * stride + x0 as usize;
    let raw = img.as_raw();
    const INV_255: f32 = 1.0 / 255.0;
    let p00 = raw[i] as f32;
    let p10 = raw[i + 1] as f32;
    let p01 = raw[i + stride] as f32;
    let p11 = raw[i + stride + 1] as f32;
    Some(
        ((1.0 - fx) * (1.0 - fy) * p00 + fx * (1.0 - fy) * p10 + (1.0 - fx) * fy * p01 + fx * fy * p11)
            * INV_255,
    )
}

/// Central-difference `dI/dr`; one-sided at the ends.
pub fn radial_derivative(values: &[f32], step: f32) -> Vec<f32> {
    let n = values.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let mut d = vec![0.0f32; n];
    d[0] = (values[1] - values[0]) / step;
    for i in 1..n - 1 {
        d[i] = (values[i + 1] - values[i - 1]) / (2.0 * step);
    }
    d[n - 1] = (values[n - 1] - values[n - 2]) / step;
    d
}

/// 3-point moving average; ends untouched, no-op below 5 samples.
pub fn smooth_3point(d: &mut [f32]) {
    let n = d.len();
    if n < 5 {
        return;
    }
    let mut left = d[0];
    let mut mid = d[1];
    for i in 1..n - 1 {
        let right = d[i + 1];
        d[i] = (left + mid + right) / 3.0;
        left = mid;
        mid = right;
    }
}

/// Index of the outermost local maximum of `|d|` that clears both the absolute
/// contrast gate and the relative floor, with a parabolic sub-sample offset.
fn outermost_peak(d: &[f32], min_contrast: f32, floor: f32) -> Option<(usize, f32)> {
    if d.len() < 3 {
        return None;
    }
    let mag: Vec<f32> = d.iter().map(|v| v.abs()).collect();
    let strongest = mag.iter().copied().fold(0.0f32, f32::max);
    let gate = min_contrast.max(floor * strongest);
    if strongest < min_contrast {
        return None;
    }
    (1..mag.len() - 1)
        .rev()
        .find(|&i| mag[i] >= gate && mag[i] >= mag[i - 1] && mag[i] >= mag[i + 1])
        .map(|i| {
            let (l, c, r) = (mag[i - 1], mag[i], mag[i + 1]);
            let denom = l - 2.0 * c + r;
            let offset = if denom.abs() > 1e-9 {
                (0.5 * (l - r) / denom).clamp(-0.5, 0.5)
            } else {
                0.0
            };
            (i, offset)
        })
}

/// Cast rays from `center` and collect one rim crossing per ray where found.
pub fn sample_rim_edges(
    gray: &GrayImage,
    center: [f32; 2],
    bounds: &RadiusBounds,
    config: &EdgeSampleConfig,
) -> EdgeSamples {
    let step = config.r_step.max(0.25);
    let r_lo = (bounds.min_radius as f32 * config.inner_frac).max(2.0);
    let r_hi = bounds.max_radius as f32 * config.outer_frac;
    let n_rays = config.n_rays.max(8);
    let mut out = EdgeSamples {
        points: Vec::with_capacity(n_rays),
        n_rays,
    };
    if r_hi <= r_lo + 2.0 * step {
        return out;
    }

    let mut profile = Vec::new();
    for k in 0..n_rays {
        let theta = std::f32::consts::TAU * k as f32 / n_rays as f32;
        let (dy, dx) = theta.sin_cos();

        profile.clear();
        let mut r = r_lo;
        while r <= r_hi {
            match bilinear_sample(gray, center[0] + dx * r, center[1] + dy * r) {
                Some(v) => profile.push(v),
                None => break,
            }
            r += step;
        }

        let mut d = radial_derivative(&profile, step);
        smooth_3point(&mut d);
        if let Some((i, offset)) = outermost_peak(&d, config.min_edge_contrast, config.peak_floor) {
            let r_edge = r_lo + (i as f32 + offset) * step;
            out.points.push([
                (center[0] + dx * r_edge) as f64,
                (center[1] + dy * r_edge) as f64,
            ]);
        }
    }

    tracing::trace!(
        "edge sampling at ({:.1}, {:.1}): {}/{} rays hit",
        center[0],
        center[1],
        out.points.len(),
        n_rays
    );
    out
}
