//! Food segmentation inside a detected rim.
//!
//! The rim interior, shrunk by an inward margin, is converted to CIE Lab. The
//! utensil surface color is estimated from the outer band of the interior (or
//! from neutral interior pixels when food covers that band, or from the
//! exposed rim lip when food covers the whole interior) and every pixel
//! further than a robust ΔE threshold from it is food. A morphological opening
//! and a small-component filter clean the result, and a final masking step
//! clears anything outside the rim ellipse.

mod classify;
mod color;
mod config;
mod mask;

pub use color::Lab;
pub use config::SegmentConfig;
pub use mask::FoodMask;

use image::Luma;
use imageproc::distance_transform::Norm;
use imageproc::region_labelling::{connected_components, Connectivity};

use crate::conic::Ellipse;
use crate::frame::Frame;

/// Isolates food pixels within a rim ellipse.
#[derive(Debug, Clone, Default)]
pub struct FoodSegmenter {
    config: SegmentConfig,
}

impl FoodSegmenter {
    pub fn new(config: SegmentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SegmentConfig {
        &self.config
    }

    /// Food mask for `frame` inside `ellipse`, or `None` when the interior is
    /// degenerate or the ellipse does not sit on the frame.
    pub fn segment(&self, frame: &Frame, ellipse: &Ellipse) -> Option<FoodMask> {
        let cfg = &self.config;
        let (w, h) = frame.dimensions();
        if w == 0 || h == 0 {
            return None;
        }
        let center_margin = cfg.center_margin_frac * w.min(h) as f64;
        if !ellipse.center_within(w, h, center_margin) {
            tracing::debug!(
                "rim center ({:.1}, {:.1}) is off the {}x{} frame",
                ellipse.cx(),
                ellipse.cy(),
                w,
                h
            );
            return None;
        }

        let margin = (cfg.margin_frac * ellipse.semi_minor()).max(cfg.min_margin_px);
        let Some(interior) = ellipse.shrink(margin) else {
            tracing::debug!("rim interior vanishes after a {margin:.1} px margin");
            return None;
        };
        let pixels: Vec<(u32, u32)> = interior.interior_pixels(w, h).collect();
        if pixels.len() < cfg.min_interior_px.max(1) {
            tracing::debug!(
                "rim interior has {} px, need {}",
                pixels.len(),
                cfg.min_interior_px
            );
            return None;
        }

        let labs: Vec<Lab> = pixels
            .iter()
            .map(|&(x, y)| Lab::from_rgb(frame.get_pixel(x, y).0))
            .collect();
        let lip = lip_colors(frame, ellipse, &interior, cfg.lip_guard_px);
        let surface = classify::surface_model(&interior, &pixels, &labs, &lip, cfg)?;

        let mut mask = FoodMask::new(w, h);
        for (&(x, y), c) in pixels.iter().zip(&labs) {
            if surface.is_food(c) {
                mask.set(x, y, true);
            }
        }
        let raw_food = mask.food_pixel_count();

        let mut mask = self.clean(mask, pixels.len());
        mask.retain_within(ellipse);

        tracing::debug!(
            "segmented {} food px ({} before cleanup) of {} interior px, surface from {:?}, ΔE > {:.1}",
            mask.food_pixel_count(),
            raw_food,
            pixels.len(),
            surface.source,
            surface.threshold
        );
        Some(mask)
    }

    /// Opening plus removal of small connected regions.
    fn clean(&self, mask: FoodMask, interior_px: usize) -> FoodMask {
        let cfg = &self.config;
        let mut image = mask.into_image();
        if cfg.open_radius > 0 {
            image = imageproc::morphology::open(&image, Norm::LInf, cfg.open_radius);
        }

        let min_size = (cfg.min_component_frac * interior_px as f64).ceil() as usize;
        if min_size > 1 {
            let labels = connected_components(&image, Connectivity::Eight, Luma([0u8]));
            let n_labels = labels.pixels().map(|p| p.0[0]).max().unwrap_or(0) as usize;
            let mut sizes = vec![0usize; n_labels + 1];
            for p in labels.pixels() {
                sizes[p.0[0] as usize] += 1;
            }
            for (px, label) in image.pixels_mut().zip(labels.pixels()) {
                let l = label.0[0] as usize;
                if l != 0 && sizes[l] < min_size {
                    px.0[0] = 0;
                }
            }
        }
        FoodMask::from_image(image)
    }
}

/// Colors of the ring between `interior` and the rim, `guard_px` short of the rim.
fn lip_colors(frame: &Frame, ellipse: &Ellipse, interior: &Ellipse, guard_px: f64) -> Vec<Lab> {
    let (w, h) = frame.dimensions();
    let Some(outer) = ellipse.shrink(guard_px.max(0.0)) else {
        return Vec::new();
    };
    outer
        .interior_pixels(w, h)
        .filter(|&(x, y)| !interior.contains(x as f64, y as f64))
        .map(|(x, y)| Lab::from_rgb(frame.get_pixel(x, y).0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{food_scene, paint_ellipse, plate_scene, FOOD_RGB, TABLE_RGB};
    use image::Rgb;

    fn rim() -> Ellipse {
        Ellipse::circle([120.0, 100.0], 160.0).unwrap()
    }

    #[test]
    fn empty_plate_has_no_food() {
        let frame = plate_scene(240, 200, &rim());
        let mask = FoodSegmenter::default().segment(&frame, &rim()).expect("mask");
        assert_eq!(mask.dimensions(), (240, 200));
        assert_eq!(mask.food_pixel_count(), 0);
    }

    #[test]
    fn central_food_is_segmented() {
        let food = Ellipse::circle([120.0, 100.0], 80.0).unwrap();
        let frame = food_scene(240, 200, &rim(), &food);
        let mask = FoodSegmenter::default().segment(&frame, &rim()).expect("mask");
        let expected = food.interior_pixel_count(240, 200) as f64;
        let got = mask.food_pixel_count() as f64;
        assert!((got - expected).abs() / expected < 0.03, "got {got}, expected {expected}");
        assert!(mask.is_food(120, 100));
        assert!(!mask.is_food(120, 30));
    }

    #[test]
    fn food_over_the_outer_band_still_leaves_surface_empty() {
        // Food ring covering the outer band, bare plate in the middle.
        let mut frame = food_scene(240, 200, &rim(), &rim().shrink(1.0).unwrap());
        let hole = Ellipse::circle([120.0, 100.0], 50.0).unwrap();
        paint_ellipse(&mut frame, &hole, crate::test_utils::PLATE_RGB);
        let mask = FoodSegmenter::default().segment(&frame, &rim()).expect("mask");
        assert!(!mask.is_food(120, 100));
        assert!(mask.is_food(120, 40));
        assert!(mask.food_pixel_count() > hole.interior_pixel_count(240, 200));
    }

    #[test]
    fn food_to_the_lip_is_not_mistaken_for_surface() {
        let e = rim();
        let area = e.interior_pixel_count(240, 200) as f64;
        for frac in [0.92, 0.95] {
            let food = Ellipse::circle([120.0, 100.0], 160.0 * frac).unwrap();
            let frame = food_scene(240, 200, &e, &food);
            let mask = FoodSegmenter::default().segment(&frame, &e).expect("mask");
            let fill = mask.food_pixels_within(&e) as f64 / area;
            assert!(fill > 0.8, "food at {frac} of the rim: fill {fill}");
            assert!(mask.is_food(120, 100));
        }
    }

    #[test]
    fn speckles_are_removed() {
        let mut frame = plate_scene(240, 200, &rim());
        for (x, y) in [(100, 90), (130, 120), (140, 70), (90, 110)] {
            frame.put_pixel(x, y, Rgb(FOOD_RGB));
        }
        let mask = FoodSegmenter::default().segment(&frame, &rim()).expect("mask");
        assert_eq!(mask.food_pixel_count(), 0);
    }

    #[test]
    fn food_spilling_past_the_rim_is_clipped() {
        let food = Ellipse::new([190.0, 100.0], [120.0, 90.0], 0.0).unwrap();
        let frame = food_scene(240, 200, &rim(), &food);
        let e = rim();
        let mask = FoodSegmenter::default().segment(&frame, &e).expect("mask");
        assert!(mask.food_pixel_count() > 0);
        for (x, y, p) in mask.as_image().enumerate_pixels() {
            if p.0[0] != 0 {
                assert!(e.contains(x as f64, y as f64), "food at ({x}, {y}) outside rim");
            }
        }
    }

    #[test]
    fn tiny_rim_is_degenerate() {
        let frame = plate_scene(240, 200, &rim());
        let tiny = Ellipse::new([120.0, 100.0], [6.0, 3.0], 10.0).unwrap();
        assert!(FoodSegmenter::default().segment(&frame, &tiny).is_none());
    }

    #[test]
    fn off_frame_rim_is_rejected() {
        let frame = Frame::from_pixel(240, 200, Rgb(TABLE_RGB));
        let far = Ellipse::circle([600.0, 100.0], 100.0).unwrap();
        assert!(FoodSegmenter::default().segment(&frame, &far).is_none());
    }
}
