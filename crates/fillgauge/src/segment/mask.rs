use image::{GrayImage, Luma};

use crate::conic::Ellipse;

const FOOD: u8 = 255;

/// Binary food mask with the frame's dimensions.
///
/// Backed by an 8-bit image holding `0` (not food) or `255` (food), so it can
/// be fed to `imageproc` operators and written out as a PNG.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodMask {
    image: GrayImage,
}

impl FoodMask {
    /// All-background mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::new(width, height),
        }
    }

    /// Wrap an 8-bit image; any non-zero pixel counts as food.
    pub fn from_image(image: GrayImage) -> Self {
        let mut image = image;
        image.pixels_mut().for_each(|p| {
            if p.0[0] != 0 {
                p.0[0] = FOOD;
            }
        });
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// `false` outside the grid.
    pub fn is_food(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel_checked(x, y).is_some_and(|p| p.0[0] != 0)
    }

    /// Out-of-grid writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, food: bool) {
        if let Some(p) = self.image.get_pixel_mut_checked(x, y) {
            *p = Luma([if food { FOOD } else { 0 }]);
        }
    }

    pub fn food_pixel_count(&self) -> usize {
        self.image.as_raw().iter().filter(|&&v| v != 0).count()
    }

    /// Food pixels lying inside `ellipse`.
    pub fn food_pixels_within(&self, ellipse: &Ellipse) -> usize {
        let (w, h) = self.dimensions();
        ellipse
            .interior_pixels(w, h)
            .filter(|&(x, y)| self.is_food(x, y))
            .count()
    }

    /// Clear every food pixel outside `ellipse`.
    pub fn retain_within(&mut self, ellipse: &Ellipse) {
        for (x, y, p) in self.image.enumerate_pixels_mut() {
            if p.0[0] != 0 && !ellipse.contains(x as f64, y as f64) {
                p.0[0] = 0;
            }
        }
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_count() {
        let mut m = FoodMask::new(10, 8);
        assert_eq!(m.food_pixel_count(), 0);
        m.set(2, 3, true);
        m.set(4, 4, true);
        m.set(40, 4, true);
        assert_eq!(m.food_pixel_count(), 2);
        assert!(m.is_food(2, 3));
        assert!(!m.is_food(40, 4));
        m.set(2, 3, false);
        assert_eq!(m.food_pixel_count(), 1);
    }

    #[test]
    fn from_image_binarizes() {
        let img = GrayImage::from_fn(4, 4, |x, _| Luma([x as u8 * 3]));
        let m = FoodMask::from_image(img);
        assert_eq!(m.food_pixel_count(), 12);
        assert!(m.as_image().pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn retain_within_clears_outside_pixels() {
        let e = Ellipse::new([20.0, 15.0], [20.0, 10.0], 0.0).unwrap();
        let mut m = FoodMask::from_image(GrayImage::from_pixel(40, 30, Luma([255])));
        m.retain_within(&e);
        assert_eq!(m.food_pixel_count(), e.interior_pixel_count(40, 30));
        assert_eq!(m.food_pixels_within(&e), m.food_pixel_count());
        assert!(!m.is_food(0, 0));
        assert!(m.is_food(20, 15));
    }
}
