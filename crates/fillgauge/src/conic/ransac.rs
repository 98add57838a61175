//! RANSAC wrapper for outlier-robust ellipse fitting.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::ellipse::Ellipse;
use super::fit::fit_ellipse_direct;
use super::types::{ConicError, RansacConfig, RansacFit};

const SAMPLE_SIZE: usize = 6;

/// Fit an ellipse robustly: best 6-point minimal model by inlier count,
/// refit on its inliers.
pub fn fit_ellipse_ransac(points: &[[f64; 2]], config: &RansacConfig) -> Result<RansacFit, ConicError> {
    let n = points.len();
    if n < SAMPLE_SIZE {
        return Err(ConicError::TooFewPoints {
            needed: SAMPLE_SIZE,
            got: n,
        });
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut best: Option<(Ellipse, Vec<bool>, usize)> = None;
    let mut sample = [[0.0f64; 2]; SAMPLE_SIZE];

    for _ in 0..config.max_iters {
        let picked = rand::seq::index::sample(&mut rng, n, SAMPLE_SIZE);
        for (slot, idx) in sample.iter_mut().zip(picked.iter()) {
            *slot = points[idx];
        }
        let Some(model) = fit_ellipse_direct(&sample) else {
            continue;
        };

        let (mask, count) = inlier_mask(&model, points, config.inlier_threshold);
        if best.as_ref().map_or(true, |(_, _, c)| count > *c) {
            best = Some((model, mask, count));
            if count * 10 > n * 9 {
                break;
            }
        }
    }

    let Some((model, mask, count)) = best else {
        return Err(ConicError::NoEllipse);
    };
    if count < config.min_inliers {
        return Err(ConicError::InsufficientInliers {
            needed: config.min_inliers,
            found: count,
        });
    }

    let inliers: Vec<[f64; 2]> = points
        .iter()
        .zip(&mask)
        .filter_map(|(&p, &keep)| keep.then_some(p))
        .collect();
    let ellipse = fit_ellipse_direct(&inliers).unwrap_or(model);

    let (final_mask, num_inliers) = inlier_mask(&ellipse, points, config.inlier_threshold);
    let final_inliers: Vec<[f64; 2]> = points
        .iter()
        .zip(&final_mask)
        .filter_map(|(&p, &keep)| keep.then_some(p))
        .collect();

    Ok(RansacFit {
        ellipse,
        num_inliers,
        rms_residual: super::fit::rms_sampson_distance(&ellipse, &final_inliers),
    })
}

fn inlier_mask(model: &Ellipse, points: &[[f64; 2]], threshold: f64) -> (Vec<bool>, usize) {
    let conic = model.to_conic();
    let mask: Vec<bool> = points
        .iter()
        .map(|&[x, y]| conic.sampson_distance(x, y) < threshold)
        .collect();
    let count = mask.iter().filter(|&&m| m).count();
    (mask, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::prelude::*;

    fn tilted() -> Ellipse {
        Ellipse::from_semi_axes(100.0, 80.0, 30.0, 15.0, 0.3).unwrap()
    }

    #[test]
    fn clean_points_are_all_inliers() {
        let e = tilted();
        let pts = e.sample_points(100);
        let cfg = RansacConfig {
            max_iters: 100,
            inlier_threshold: 0.1,
            min_inliers: 6,
            seed: 42,
        };
        let fit = fit_ellipse_ransac(&pts, &cfg).expect("ransac");
        assert_eq!(fit.num_inliers, 100);
        assert_relative_eq!(fit.ellipse.cx(), e.cx(), epsilon = 1e-4);
        assert_relative_eq!(fit.ellipse.cy(), e.cy(), epsilon = 1e-4);
        assert!(fit.rms_residual < 1e-6);
    }

    #[test]
    fn rejects_scattered_outliers() {
        let e = tilted();
        let mut pts = e.sample_points(80);
        let mut rng = StdRng::seed_from_u64(999);
        for _ in 0..20 {
            pts.push([rng.gen_range(0.0..200.0), rng.gen_range(0.0..200.0)]);
        }
        let cfg = RansacConfig {
            max_iters: 500,
            inlier_threshold: 0.1,
            min_inliers: 20,
            seed: 42,
        };
        let fit = fit_ellipse_ransac(&pts, &cfg).expect("ransac with outliers");
        assert_relative_eq!(fit.ellipse.cx(), e.cx(), epsilon = 0.5);
        assert_relative_eq!(fit.ellipse.cy(), e.cy(), epsilon = 0.5);
        assert_relative_eq!(fit.ellipse.major(), e.major(), epsilon = 1.0);
        assert_relative_eq!(fit.ellipse.minor(), e.minor(), epsilon = 1.0);
        assert!(fit.num_inliers >= 60, "got {} inliers", fit.num_inliers);
    }

    #[test]
    fn reports_too_few_points() {
        let err = fit_ellipse_ransac(&[[0.0, 0.0]; 3], &RansacConfig::default()).unwrap_err();
        assert_eq!(err, ConicError::TooFewPoints { needed: 6, got: 3 });
    }

    #[test]
    fn reports_insufficient_inliers() {
        let e = tilted();
        let cfg = RansacConfig {
            min_inliers: 500,
            ..RansacConfig::default()
        };
        let err = fit_ellipse_ransac(&e.sample_points(40), &cfg).unwrap_err();
        assert!(matches!(err, ConicError::InsufficientInliers { needed: 500, .. }));
    }
}
