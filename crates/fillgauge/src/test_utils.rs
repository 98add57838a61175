//! Synthetic scenes shared by the unit tests.

use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::conic::Ellipse;

pub(crate) const TABLE_RGB: [u8; 3] = [52, 44, 38];
pub(crate) const PLATE_RGB: [u8; 3] = [236, 234, 228];
pub(crate) const FOOD_RGB: [u8; 3] = [196, 92, 38];

/// Hard-edged disk on a flat background.
pub(crate) fn draw_disk_gray(w: u32, h: u32, center: [f32; 2], radius: f32, fg: u8, bg: u8) -> GrayImage {
    let r2 = radius * radius;
    GrayImage::from_fn(w, h, |x, y| {
        let dx = x as f32 - center[0];
        let dy = y as f32 - center[1];
        if dx * dx + dy * dy <= r2 {
            Luma([fg])
        } else {
            Luma([bg])
        }
    })
}

/// Fill every pixel inside `ellipse` with `color`.
pub(crate) fn paint_ellipse(img: &mut RgbImage, ellipse: &Ellipse, color: [u8; 3]) {
    let (w, h) = img.dimensions();
    for (x, y) in ellipse.interior_pixels(w, h) {
        img.put_pixel(x, y, Rgb(color));
    }
}

/// Empty light plate on a dark table.
pub(crate) fn plate_scene(w: u32, h: u32, rim: &Ellipse) -> RgbImage {
    let mut img = RgbImage::from_pixel(w, h, Rgb(TABLE_RGB));
    paint_ellipse(&mut img, rim, PLATE_RGB);
    img
}

/// Plate scene with a food blob painted inside the rim.
pub(crate) fn food_scene(w: u32, h: u32, rim: &Ellipse, food: &Ellipse) -> RgbImage {
    let mut img = plate_scene(w, h, rim);
    paint_ellipse(&mut img, food, FOOD_RGB);
    img
}
