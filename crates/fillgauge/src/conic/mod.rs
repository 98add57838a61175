//! Ellipse / conic fitting primitives.
//!
//! - [`Ellipse`]: validated rim geometry (full axes, degrees).
//! - Direct least-squares conic fit (Fitzgibbon et al., 1999).
//! - RANSAC wrapper over minimal 6-point samples.

mod ellipse;
mod fit;
mod ransac;
mod types;

pub use ellipse::{Ellipse, EllipseParams};
pub use ransac::fit_ellipse_ransac;
pub use types::{ConicError, RansacConfig, RansacFit};

#[cfg(test)]
mod tests {
    use super::types::ConicCoeffs;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ellipse_conic_roundtrip() {
        let e = Ellipse::new([100.0, 80.0], [60.0, 30.0], 17.0).unwrap();
        let c = e.to_conic();
        assert!(c.is_ellipse());
        let back = c.to_ellipse().expect("ellipse");
        assert_relative_eq!(back.cx(), e.cx(), epsilon = 1e-9);
        assert_relative_eq!(back.cy(), e.cy(), epsilon = 1e-9);
        assert_relative_eq!(back.major(), e.major(), epsilon = 1e-9);
        assert_relative_eq!(back.minor(), e.minor(), epsilon = 1e-9);
        assert_relative_eq!(back.angle_deg(), e.angle_deg(), epsilon = 1e-7);
    }

    #[test]
    fn boundary_points_have_zero_distance() {
        let e = Ellipse::new([40.0, 50.0], [50.0, 20.0], -30.0).unwrap();
        let c = e.to_conic();
        for [x, y] in e.sample_points(64) {
            assert!(c.algebraic_distance(x, y).abs() < 1e-10);
            assert!(e.sampson_distance(x, y) < 1e-8);
        }
        assert!(e.sampson_distance(e.cx(), e.cy()) > 1.0);
    }

    #[test]
    fn hyperbola_is_not_an_ellipse() {
        // x² − y² − 1 = 0
        let c = ConicCoeffs([1.0, 0.0, -1.0, 0.0, 0.0, -1.0]);
        assert!(!c.is_ellipse());
        assert!(c.to_ellipse().is_none());
    }
}
