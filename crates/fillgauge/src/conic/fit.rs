//! Direct least-squares ellipse fitting (Fitzgibbon, Pilu & Fisher, 1999).

use nalgebra::{Matrix3, Matrix6, Vector3, Vector6};

use super::ellipse::Ellipse;
use super::types::ConicCoeffs;

/// Fit a conic constrained to be an ellipse through `points`.
///
/// Needs at least 6 points. Points are first shifted to their centroid and
/// scaled to a mean radius of √2; the conic found there is mapped back to
/// image coordinates. Returns `None` when the scatter matrix is singular or
/// the result is not a proper ellipse.
pub fn fit_conic_direct(points: &[[f64; 2]]) -> Option<ConicCoeffs> {
    if points.len() < 6 {
        return None;
    }
    let norm = Normalization::of(points);

    let mut scatter = Matrix6::<f64>::zeros();
    for &p in points {
        let [x, y] = norm.apply(p);
        let row = Vector6::new(x * x, x * y, y * y, x, y, 1.0);
        scatter += row * row.transpose();
    }

    let s11: Matrix3<f64> = scatter.fixed_view::<3, 3>(0, 0).into_owned();
    let s12: Matrix3<f64> = scatter.fixed_view::<3, 3>(0, 3).into_owned();
    let s22: Matrix3<f64> = scatter.fixed_view::<3, 3>(3, 3).into_owned();

    // Reduced problem: (S11 − S12 S22⁻¹ S12ᵀ) q = λ C q with
    // C = [[0, 0, 2], [0, −1, 0], [2, 0, 0]] encoding 4AC − B².
    let s22_inv = s22.try_inverse()?;
    let reduced = s11 - s12 * s22_inv * s12.transpose();
    let constraint = Matrix3::new(0.0, 0.0, 2.0, 0.0, -1.0, 0.0, 2.0, 0.0, 0.0);
    let system = constraint.try_inverse()? * reduced;

    let quad = ellipse_eigenvector(&system)?;
    let lin = -(s22_inv * s12.transpose() * quad);

    let conic = norm.unapply(&ConicCoeffs([
        quad[0], quad[1], quad[2], lin[0], lin[1], lin[2],
    ]));
    if !conic.is_ellipse() {
        return None;
    }
    conic.to_ellipse()?;
    Some(conic)
}

/// Fit and return the geometric ellipse directly.
pub fn fit_ellipse_direct(points: &[[f64; 2]]) -> Option<Ellipse> {
    fit_conic_direct(points)?.to_ellipse()
}

/// RMS Sampson distance of `points` to `ellipse`.
pub fn rms_sampson_distance(ellipse: &Ellipse, points: &[[f64; 2]]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let conic = ellipse.to_conic();
    let sum_sq: f64 = points
        .iter()
        .map(|&[x, y]| conic.sampson_distance(x, y).powi(2))
        .sum();
    (sum_sq / points.len() as f64).sqrt()
}

/// Eigenvector of `system` with a real eigenvalue and `4AC − B² > 0`.
///
/// `system` is not symmetric, so eigenvalues come from the Schur form and each
/// eigenvector is the right singular vector of `system − λI` with the smallest
/// singular value.
fn ellipse_eigenvector(system: &Matrix3<f64>) -> Option<Vector3<f64>> {
    let scale = system.norm().max(1e-300);
    let mut best: Option<(f64, Vector3<f64>)> = None;

    for ev in system.complex_eigenvalues().iter() {
        if ev.im.abs() > 1e-9 * scale || !ev.re.is_finite() {
            continue;
        }
        let shifted = system - Matrix3::identity() * ev.re;
        let svd = shifted.svd(false, true);
        let v_t = svd.v_t?;
        let min_idx = svd.singular_values.imin();
        let v: Vector3<f64> = v_t.row(min_idx).transpose();

        if 4.0 * v[0] * v[2] - v[1] * v[1] <= 0.0 {
            continue;
        }
        if best.as_ref().map_or(true, |(lam, _)| ev.re.abs() < *lam) {
            best = Some((ev.re.abs(), v));
        }
    }
    best.map(|(_, v)| v)
}

/// Similarity `x' = s (x − m)` used to condition the scatter matrix.
struct Normalization {
    mean: [f64; 2],
    scale: f64,
}

impl Normalization {
    fn of(points: &[[f64; 2]]) -> Self {
        let n = points.len() as f64;
        let mx = points.iter().map(|p| p[0]).sum::<f64>() / n;
        let my = points.iter().map(|p| p[1]).sum::<f64>() / n;
        let mean_r = points
            .iter()
            .map(|p| (p[0] - mx).hypot(p[1] - my))
            .sum::<f64>()
            / n;
        let scale = if mean_r > 1e-15 {
            std::f64::consts::SQRT_2 / mean_r
        } else {
            1.0
        };
        Self {
            mean: [mx, my],
            scale,
        }
    }

    fn apply(&self, p: [f64; 2]) -> [f64; 2] {
        [
            (p[0] - self.mean[0]) * self.scale,
            (p[1] - self.mean[1]) * self.scale,
        ]
    }

    /// Pull a conic fitted in normalized coordinates back to image coordinates:
    /// `Q = Tᵀ Q' T` with `T` the homogeneous form of [`Self::apply`].
    fn unapply(&self, c: &ConicCoeffs) -> ConicCoeffs {
        let [a, b, cc, d, e, f] = c.0;
        let q = Matrix3::new(
            a,
            0.5 * b,
            0.5 * d,
            0.5 * b,
            cc,
            0.5 * e,
            0.5 * d,
            0.5 * e,
            f,
        );
        let s = self.scale;
        let t = Matrix3::new(
            s,
            0.0,
            -s * self.mean[0],
            0.0,
            s,
            -s * self.mean[1],
            0.0,
            0.0,
            1.0,
        );
        let m = t.transpose() * q * t;
        ConicCoeffs([
            m[(0, 0)],
            2.0 * m[(0, 1)],
            m[(1, 1)],
            2.0 * m[(0, 2)],
            2.0 * m[(1, 2)],
            m[(2, 2)],
        ])
    }
}
