//! Candidate ranking: hint-weighted area, ties broken by centrality.

use crate::conic::Ellipse;
use crate::utensil::UtensilHint;

/// Weight in `[floor, 1]` expressing how well `aspect` (major / minor) matches
/// the hint's expected range. `Auto` and in-range aspects score 1.
pub fn hint_affinity(hint: UtensilHint, aspect: f64, sigma: f64, floor: f64) -> f64 {
    let Some([lo, hi]) = hint.expected_aspect() else {
        return 1.0;
    };
    let dist = if aspect < lo {
        lo - aspect
    } else if aspect > hi {
        aspect - hi
    } else {
        0.0
    };
    let floor = floor.clamp(0.0, 1.0);
    if dist == 0.0 {
        return 1.0;
    }
    if sigma <= 0.0 {
        return floor;
    }
    let z = dist / sigma;
    (-0.5 * z * z).exp().max(floor)
}

/// Enclosed area weighted by hint affinity.
pub fn rank_score(ellipse: &Ellipse, affinity: f64) -> f64 {
    ellipse.area() * affinity
}

/// Index of the winning candidate among `(ellipse, rank)` pairs.
///
/// Highest rank wins; ranks within `tie_tolerance` (relative) of the best are
/// resolved in favour of the center nearest `frame_center`.
pub fn select_best(candidates: &[(Ellipse, f64)], frame_center: [f64; 2], tie_tolerance: f64) -> Option<usize> {
    let best_rank = candidates
        .iter()
        .map(|(_, r)| *r)
        .filter(|r| r.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if !best_rank.is_finite() {
        return None;
    }
    let cutoff = best_rank - best_rank.abs() * tie_tolerance.max(0.0);
    let center_dist = |e: &Ellipse| (e.cx() - frame_center[0]).hypot(e.cy() - frame_center[1]);

    candidates
        .iter()
        .enumerate()
        .filter(|(_, (_, r))| r.is_finite() && *r >= cutoff)
        .min_by(|(_, (a, _)), (_, (b, _))| center_dist(a).total_cmp(&center_dist(b)))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_has_no_preference() {
        for aspect in [1.0, 1.5, 4.0] {
            assert_eq!(hint_affinity(UtensilHint::Auto, aspect, 0.25, 0.3), 1.0);
        }
    }

    #[test]
    fn hint_prefers_expected_shape_but_never_excludes() {
        let round = hint_affinity(UtensilHint::Bowl, 1.05, 0.25, 0.3);
        let flat = hint_affinity(UtensilHint::Bowl, 2.2, 0.25, 0.3);
        assert_eq!(round, 1.0);
        assert!(flat < round);
        assert!(flat >= 0.3);

        let plate_flat = hint_affinity(UtensilHint::Plate, 1.6, 0.25, 0.3);
        let plate_round = hint_affinity(UtensilHint::Plate, 1.0, 0.25, 0.3);
        assert_eq!(plate_flat, 1.0);
        assert!(plate_round < 1.0 && plate_round > 0.3);
    }

    #[test]
    fn largest_rank_wins() {
        let small = Ellipse::circle([50.0, 50.0], 40.0).unwrap();
        let large = Ellipse::circle([80.0, 70.0], 90.0).unwrap();
        let cands = vec![
            (small, rank_score(&small, 1.0)),
            (large, rank_score(&large, 1.0)),
        ];
        assert_eq!(select_best(&cands, [50.0, 50.0], 1e-3), Some(1));
    }

    #[test]
    fn hint_weight_can_flip_the_choice() {
        let round = Ellipse::circle([100.0, 100.0], 100.0).unwrap();
        let flat = Ellipse::new([100.0, 100.0], [150.0, 75.0], 0.0).unwrap();
        let rank = |e: &Ellipse, hint| {
            rank_score(e, hint_affinity(hint, e.aspect_ratio(), 0.25, 0.3))
        };
        // Flat ellipse has the larger area, so it wins without a hint.
        let auto = vec![(round, rank(&round, UtensilHint::Auto)), (flat, rank(&flat, UtensilHint::Auto))];
        assert_eq!(select_best(&auto, [100.0, 100.0], 1e-3), Some(1));
        let bowl = vec![(round, rank(&round, UtensilHint::Bowl)), (flat, rank(&flat, UtensilHint::Bowl))];
        assert_eq!(select_best(&bowl, [100.0, 100.0], 1e-3), Some(0));
    }

    #[test]
    fn ties_go_to_the_most_central() {
        let off = Ellipse::circle([40.0, 40.0], 60.0).unwrap();
        let mid = Ellipse::circle([98.0, 102.0], 60.0).unwrap();
        let cands = vec![(off, rank_score(&off, 1.0)), (mid, rank_score(&mid, 1.0))];
        assert_eq!(select_best(&cands, [100.0, 100.0], 1e-3), Some(1));
    }

    #[test]
    fn empty_or_non_finite_selects_nothing() {
        assert_eq!(select_best(&[], [0.0, 0.0], 1e-3), None);
        let e = Ellipse::circle([1.0, 1.0], 2.0).unwrap();
        assert_eq!(select_best(&[(e, f64::NAN)], [0.0, 0.0], 1e-3), None);
    }
}
