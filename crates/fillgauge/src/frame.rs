//! Input frame helpers: validation, radius bounds and intensity conversion.

use image::imageops::FilterType;
use image::{GrayImage, RgbImage};

use crate::error::InputError;

/// A decoded 8-bit RGB photo, origin top-left.
pub type Frame = RgbImage;

/// Smallest frame side the pipeline accepts.
pub const MIN_FRAME_SIDE: u32 = 8;

/// Plausible rim size in pixels, `0 < min_radius < max_radius`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RadiusBounds {
    pub min_radius: f64,
    pub max_radius: f64,
}

impl RadiusBounds {
    pub fn new(min_radius: f64, max_radius: f64) -> Result<Self, InputError> {
        let ok = min_radius.is_finite()
            && max_radius.is_finite()
            && min_radius > 0.0
            && min_radius < max_radius;
        if !ok {
            return Err(InputError::InvalidRadiusBounds {
                min_radius,
                max_radius,
            });
        }
        Ok(Self {
            min_radius,
            max_radius,
        })
    }

    /// Bounds derived from the frame size: `min = max(30, s/8)`,
    /// `max = max(60, s/2)` with `s` the shorter side.
    pub fn for_frame(width: u32, height: u32) -> Self {
        let short = width.min(height);
        Self {
            min_radius: (short / 8).max(30) as f64,
            max_radius: (short / 2).max(60) as f64,
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            min_radius: self.min_radius * factor,
            max_radius: self.max_radius * factor,
        }
    }

    pub fn contains(&self, r: f64) -> bool {
        r >= self.min_radius && r <= self.max_radius
    }
}

/// Reject frames the pipeline cannot analyze.
pub fn validate_frame(frame: &Frame) -> Result<(), InputError> {
    let (w, h) = frame.dimensions();
    if w == 0 || h == 0 {
        return Err(InputError::EmptyFrame);
    }
    if w < MIN_FRAME_SIDE || h < MIN_FRAME_SIDE {
        return Err(InputError::FrameTooSmall {
            width: w,
            height: h,
            min_side: MIN_FRAME_SIDE,
        });
    }
    Ok(())
}

/// Single intensity channel at `scale` (<= 1) of the input resolution, with
/// optional Gaussian noise suppression applied after resampling.
pub fn intensity(frame: &Frame, blur_sigma: f32, scale: f64) -> GrayImage {
    let gray = image::imageops::grayscale(frame);
    let gray = if scale < 1.0 {
        let (w, h) = gray.dimensions();
        let nw = ((w as f64 * scale).round() as u32).max(1);
        let nh = ((h as f64 * scale).round() as u32).max(1);
        image::imageops::resize(&gray, nw, nh, FilterType::Triangle)
    } else {
        gray
    };
    if blur_sigma > 0.0 {
        imageproc::filter::gaussian_blur_f32(&gray, blur_sigma)
    } else {
        gray
    }
}

/// Downscale factor (`<= 1`) that brings the longer side to at most `max_side`.
pub fn working_scale(width: u32, height: u32, max_side: Option<u32>) -> f64 {
    match max_side {
        Some(max_side) if max_side > 0 && width.max(height) > max_side => {
            max_side as f64 / width.max(height) as f64
        }
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_follow_frame_size() {
        let b = RadiusBounds::for_frame(640, 480);
        assert_eq!(b.min_radius, 60.0);
        assert_eq!(b.max_radius, 240.0);

        let small = RadiusBounds::for_frame(100, 100);
        assert_eq!(small.min_radius, 30.0);
        assert_eq!(small.max_radius, 60.0);
    }

    #[test]
    fn bounds_reject_bad_ranges() {
        assert!(RadiusBounds::new(0.0, 10.0).is_err());
        assert!(RadiusBounds::new(20.0, 10.0).is_err());
        assert!(RadiusBounds::new(10.0, 10.0).is_err());
        assert!(RadiusBounds::new(5.0, f64::INFINITY).is_err());
        assert!(RadiusBounds::new(5.0, 10.0).is_ok());
    }

    #[test]
    fn frame_validation() {
        assert_eq!(validate_frame(&Frame::new(0, 10)), Err(InputError::EmptyFrame));
        assert!(matches!(
            validate_frame(&Frame::new(4, 40)),
            Err(InputError::FrameTooSmall { .. })
        ));
        assert!(validate_frame(&Frame::new(32, 32)).is_ok());
    }

    #[test]
    fn intensity_resamples_to_working_scale() {
        let frame = Frame::from_pixel(400, 300, image::Rgb([200, 200, 200]));
        let gray = intensity(&frame, 1.0, 0.5);
        assert_eq!(gray.dimensions(), (200, 150));
        assert!(gray.pixels().all(|p| p.0[0].abs_diff(200) <= 1));
        assert_eq!(intensity(&frame, 0.0, 1.0).dimensions(), (400, 300));
    }

    #[test]
    fn working_scale_caps_long_side() {
        assert_eq!(working_scale(4000, 3000, Some(1000)), 0.25);
        assert_eq!(working_scale(800, 600, Some(1000)), 1.0);
        assert_eq!(working_scale(4000, 3000, None), 1.0);
    }
}
