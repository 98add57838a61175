//! Annotated display image: rim outline and translucent food tint.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use fillgauge::{Ellipse, FillReport};

const RIM_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const FOOD_TINT: [f32; 3] = [255.0, 0.0, 0.0];
const FOOD_ALPHA: f32 = 0.3;
const OUTLINE_SEGMENTS: usize = 180;

/// Copy of `frame` with the food mask tinted red and the rim drawn in yellow.
pub fn render(frame: &RgbImage, report: &FillReport) -> RgbImage {
    let mut out = frame.clone();

    if let Some(mask) = &report.mask {
        for (px, m) in out.pixels_mut().zip(mask.as_image().pixels()) {
            if m.0[0] != 0 {
                for (c, tint) in px.0.iter_mut().zip(FOOD_TINT) {
                    *c = ((1.0 - FOOD_ALPHA) * *c as f32 + FOOD_ALPHA * tint).round() as u8;
                }
            }
        }
    }

    if let Some(e) = &report.ellipse {
        // Two passes half a pixel apart for a 2 px line.
        for offset in [-0.5f64, 0.5] {
            draw_outline(&mut out, e, offset);
        }
        let [cx, cy] = e.center();
        let (cx, cy) = (cx as f32, cy as f32);
        draw_line_segment_mut(&mut out, (cx - 4.0, cy), (cx + 4.0, cy), RIM_COLOR);
        draw_line_segment_mut(&mut out, (cx, cy - 4.0), (cx, cy + 4.0), RIM_COLOR);
    }
    out
}

fn draw_outline(img: &mut RgbImage, e: &Ellipse, offset: f64) {
    let a = e.semi_major() + offset;
    let b = e.semi_minor() + offset;
    if a <= 0.0 || b <= 0.0 {
        return;
    }
    let (sin_t, cos_t) = e.angle_rad().sin_cos();
    let point = |k: usize| {
        let t = std::f64::consts::TAU * k as f64 / OUTLINE_SEGMENTS as f64;
        let (st, ct) = t.sin_cos();
        let (u, v) = (a * ct, b * st);
        (
            (e.cx() + u * cos_t - v * sin_t) as f32,
            (e.cy() + u * sin_t + v * cos_t) as f32,
        )
    };
    for k in 0..OUTLINE_SEGMENTS {
        draw_line_segment_mut(img, point(k), point(k + 1), RIM_COLOR);
    }
}

/// Human-readable result lines.
pub fn summary_lines(report: &FillReport) -> Vec<String> {
    let mut lines = vec![format!("Utensil: {}", report.utensil)];
    if report.ellipse.is_none() {
        lines.push(report.status.message().to_string());
        return lines;
    }
    if let Some(p) = report.estimate.percent_fill {
        lines.push(format!("Fill: {p:.1}%"));
    }
    match report.estimate.volume_ml {
        Some(v) => lines.push(format!("Volume: {v:.1} ml ({})", report.estimate.depth_model.name())),
        None => lines.push(report.status.message().to_string()),
    }
    lines
}
