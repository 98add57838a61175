//! Conic coefficients, conversions to/from [`Ellipse`] and RANSAC settings.

use nalgebra::{Matrix2, SymmetricEigen, Vector2};
use thiserror::Error;

use super::ellipse::Ellipse;

/// Errors that can occur during conic/ellipse fitting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConicError {
    #[error("too few points: need {needed}, got {got}")]
    TooFewPoints { needed: usize, got: usize },

    #[error("insufficient inliers: need {needed}, found {found}")]
    InsufficientInliers { needed: usize, found: usize },

    #[error("no minimal sample produced an ellipse")]
    NoEllipse,
}

/// General conic `A x² + B xy + C y² + D x + E y + F = 0`, stored as `[A, B, C, D, E, F]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConicCoeffs(pub [f64; 6]);

impl ConicCoeffs {
    pub fn algebraic_distance(&self, x: f64, y: f64) -> f64 {
        let [a, b, c, d, e, f] = self.0;
        a * x * x + b * x * y + c * y * y + d * x + e * y + f
    }

    /// `B² − 4AC < 0`.
    pub fn is_ellipse(&self) -> bool {
        let [a, b, c, ..] = self.0;
        b * b - 4.0 * a * c < 0.0
    }

    /// Algebraic distance over gradient magnitude.
    pub fn sampson_distance(&self, x: f64, y: f64) -> f64 {
        let [a, b, c, d, e, _] = self.0;
        let alg = self.algebraic_distance(x, y);
        let gx = 2.0 * a * x + b * y + d;
        let gy = b * x + 2.0 * c * y + e;
        let g2 = gx * gx + gy * gy;
        if g2 < 1e-30 {
            return alg.abs();
        }
        alg.abs() / g2.sqrt()
    }

    /// Geometric ellipse for this conic, or `None` for hyperbolas, parabolas,
    /// imaginary and degenerate conics.
    pub fn to_ellipse(self) -> Option<Ellipse> {
        let [a, b, c, d, e, _] = self.0;
        if !self.is_ellipse() {
            return None;
        }

        // Center: gradient of the conic vanishes.
        let jac = Matrix2::new(2.0 * a, b, b, 2.0 * c);
        let center = jac.try_inverse()? * Vector2::new(-d, -e);
        let (cx, cy) = (center[0], center[1]);
        let f_center = self.algebraic_distance(cx, cy);
        if f_center.abs() < 1e-15 {
            return None;
        }

        // Axes from the quadratic part: λ_i u² = −F(center).
        let quad = Matrix2::new(a, 0.5 * b, 0.5 * b, c);
        let eig = SymmetricEigen::new(quad);
        let (l0, l1) = (eig.eigenvalues[0], eig.eigenvalues[1]);
        let s0 = -f_center / l0;
        let s1 = -f_center / l1;
        if !(s0 > 0.0 && s1 > 0.0) {
            return None;
        }

        // The smaller eigenvalue belongs to the major axis.
        let major_col = if s0 >= s1 { 0 } else { 1 };
        let dir = eig.eigenvectors.column(major_col);
        let angle = dir[1].atan2(dir[0]);

        Ellipse::from_semi_axes(cx, cy, s0.max(s1).sqrt(), s0.min(s1).sqrt(), angle).ok()
    }
}

/// Conic coefficients of `e`, scaled so that the conic evaluates to −1 at the center.
pub fn ellipse_to_conic(e: &Ellipse) -> ConicCoeffs {
    let (sin_t, cos_t) = e.angle_rad().sin_cos();
    let inv_a2 = 1.0 / (e.semi_major() * e.semi_major());
    let inv_b2 = 1.0 / (e.semi_minor() * e.semi_minor());
    let [cx, cy] = e.center();

    let a = cos_t * cos_t * inv_a2 + sin_t * sin_t * inv_b2;
    let b = 2.0 * cos_t * sin_t * (inv_a2 - inv_b2);
    let c = sin_t * sin_t * inv_a2 + cos_t * cos_t * inv_b2;
    let d = -2.0 * a * cx - b * cy;
    let ee = -b * cx - 2.0 * c * cy;
    let f = a * cx * cx + b * cx * cy + c * cy * cy - 1.0;
    ConicCoeffs([a, b, c, d, ee, f])
}

/// Configuration for RANSAC ellipse fitting.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RansacConfig {
    /// Maximum number of minimal-sample iterations.
    pub max_iters: usize,
    /// Inlier threshold on the Sampson distance, in pixels.
    pub inlier_threshold: f64,
    /// Minimum number of inliers for an accepted model.
    pub min_inliers: usize,
    /// RNG seed; fixed so a frame always yields the same rim.
    pub seed: u64,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            max_iters: 400,
            inlier_threshold: 2.0,
            min_inliers: 12,
            seed: 7,
        }
    }
}

/// Outcome of a RANSAC ellipse fit.
#[derive(Debug, Clone)]
pub struct RansacFit {
    pub ellipse: Ellipse,
    pub num_inliers: usize,
    /// RMS Sampson distance of the inliers, in pixels.
    pub rms_residual: f64,
}
