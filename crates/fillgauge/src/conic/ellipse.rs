//! Rim ellipse value type.
//!
//! Geometry is stored the way callers talk about rims: center in pixels, full
//! axis lengths in pixels and a rotation in degrees. Fitting code works in
//! semi-axes and radians through the crate-private helpers below.

use serde::{Deserialize, Serialize};

use super::types::{ellipse_to_conic, ConicCoeffs};
use crate::error::EllipseError;

/// Serialized form of an [`Ellipse`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EllipseParams {
    /// Center (x, y) in input-frame pixel coordinates.
    pub center_xy: [f64; 2],
    /// Full axis lengths `[major, minor]` in pixels.
    pub axes: [f64; 2],
    /// Rotation of the major axis from +x, in degrees (−90, 90].
    pub angle_deg: f64,
}

/// Elliptical rim estimate in image space.
///
/// Construction validates `major >= minor > 0` and finiteness, so any value of
/// this type is safe to hand to the segmenter and estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EllipseParams", into = "EllipseParams")]
pub struct Ellipse {
    cx: f64,
    cy: f64,
    major: f64,
    minor: f64,
    angle_deg: f64,
}

impl TryFrom<EllipseParams> for Ellipse {
    type Error = EllipseError;

    fn try_from(p: EllipseParams) -> Result<Self, Self::Error> {
        Self::new(p.center_xy, p.axes, p.angle_deg)
    }
}

impl From<Ellipse> for EllipseParams {
    fn from(e: Ellipse) -> Self {
        Self {
            center_xy: [e.cx, e.cy],
            axes: [e.major, e.minor],
            angle_deg: e.angle_deg,
        }
    }
}

impl Ellipse {
    /// Build an ellipse from its center, full `[major, minor]` axes and
    /// rotation in degrees.
    pub fn new(center_xy: [f64; 2], axes: [f64; 2], angle_deg: f64) -> Result<Self, EllipseError> {
        let [major, minor] = axes;
        if !(center_xy[0].is_finite()
            && center_xy[1].is_finite()
            && major.is_finite()
            && minor.is_finite()
            && angle_deg.is_finite())
        {
            return Err(EllipseError::NonFinite);
        }
        if major <= 0.0 || minor <= 0.0 {
            return Err(EllipseError::NonPositiveAxis { major, minor });
        }
        if minor > major {
            return Err(EllipseError::AxesOutOfOrder { major, minor });
        }
        Ok(Self {
            cx: center_xy[0],
            cy: center_xy[1],
            major,
            minor,
            angle_deg: normalize_angle_deg(angle_deg),
        })
    }

    /// Circle with the given full diameter.
    pub fn circle(center_xy: [f64; 2], diameter: f64) -> Result<Self, EllipseError> {
        Self::new(center_xy, [diameter, diameter], 0.0)
    }

    /// Build from semi-axes in any order and an angle in radians.
    ///
    /// Axes are swapped (and the angle turned by 90°) when `b > a`.
    pub(crate) fn from_semi_axes(
        cx: f64,
        cy: f64,
        a: f64,
        b: f64,
        angle_rad: f64,
    ) -> Result<Self, EllipseError> {
        let (a, b, angle_rad) = if a >= b {
            (a, b, angle_rad)
        } else {
            (b, a, angle_rad + std::f64::consts::FRAC_PI_2)
        };
        Self::new([cx, cy], [2.0 * a, 2.0 * b], angle_rad.to_degrees())
    }

    pub fn center(&self) -> [f64; 2] {
        [self.cx, self.cy]
    }

    pub fn cx(&self) -> f64 {
        self.cx
    }

    pub fn cy(&self) -> f64 {
        self.cy
    }

    /// Full major axis length in pixels.
    pub fn major(&self) -> f64 {
        self.major
    }

    /// Full minor axis length in pixels.
    pub fn minor(&self) -> f64 {
        self.minor
    }

    pub fn angle_deg(&self) -> f64 {
        self.angle_deg
    }

    pub fn angle_rad(&self) -> f64 {
        self.angle_deg.to_radians()
    }

    pub fn semi_major(&self) -> f64 {
        0.5 * self.major
    }

    pub fn semi_minor(&self) -> f64 {
        0.5 * self.minor
    }

    /// `major / minor`, always `>= 1`.
    pub fn aspect_ratio(&self) -> f64 {
        self.major / self.minor
    }

    /// Continuous enclosed area in square pixels.
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.semi_major() * self.semi_minor()
    }

    /// Squared normalized radius of `(x, y)`: `< 1` inside, `1` on the rim.
    pub fn normalized_radius_sq(&self, x: f64, y: f64) -> f64 {
        let (sin_t, cos_t) = self.angle_rad().sin_cos();
        let dx = x - self.cx;
        let dy = y - self.cy;
        let u = dx * cos_t + dy * sin_t;
        let v = -dx * sin_t + dy * cos_t;
        let a = self.semi_major();
        let b = self.semi_minor();
        (u * u) / (a * a) + (v * v) / (b * b)
    }

    /// Whether `(x, y)` lies inside or on the ellipse.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.normalized_radius_sq(x, y) <= 1.0 + 1e-9
    }

    /// Ellipse with both full axes reduced by `2 * margin_px`.
    ///
    /// Returns `None` when nothing is left of the minor axis.
    pub fn shrink(&self, margin_px: f64) -> Option<Self> {
        let major = self.major - 2.0 * margin_px;
        let minor = self.minor - 2.0 * margin_px;
        if minor <= 0.0 {
            return None;
        }
        Self::new([self.cx, self.cy], [major, minor], self.angle_deg).ok()
    }

    /// Uniformly scale center and axes, e.g. between working and input resolution.
    pub fn scaled(&self, factor: f64) -> Option<Self> {
        Self::new(
            [self.cx * factor, self.cy * factor],
            [self.major * factor, self.minor * factor],
            self.angle_deg,
        )
        .ok()
    }

    /// Axis-aligned bounds `[x_min, y_min, x_max, y_max]`.
    pub fn bounding_box(&self) -> [f64; 4] {
        let (sin_t, cos_t) = self.angle_rad().sin_cos();
        let a = self.semi_major();
        let b = self.semi_minor();
        let hw = ((a * cos_t).powi(2) + (b * sin_t).powi(2)).sqrt();
        let hh = ((a * sin_t).powi(2) + (b * cos_t).powi(2)).sqrt();
        [self.cx - hw, self.cy - hh, self.cx + hw, self.cy + hh]
    }

    /// Whether the center lies inside a `width x height` frame grown by `margin_px`.
    pub fn center_within(&self, width: u32, height: u32, margin_px: f64) -> bool {
        self.cx >= -margin_px
            && self.cy >= -margin_px
            && self.cx <= width as f64 - 1.0 + margin_px
            && self.cy <= height as f64 - 1.0 + margin_px
    }

    /// Pixels of a `width x height` grid whose centers lie inside the ellipse.
    ///
    /// Pixel `(x, y)` is sampled at its integer coordinate.
    pub fn interior_pixels(&self, width: u32, height: u32) -> impl Iterator<Item = (u32, u32)> + '_ {
        let [x0, y0, x1, y1] = self.bounding_box();
        let x_range = pixel_span(x0, x1, width);
        let y_range = pixel_span(y0, y1, height);
        y_range.flat_map(move |y| {
            x_range
                .clone()
                .filter(move |&x| self.contains(x as f64, y as f64))
                .map(move |x| (x, y))
        })
    }

    /// Number of pixels of a `width x height` grid inside the ellipse.
    pub fn interior_pixel_count(&self, width: u32, height: u32) -> usize {
        self.interior_pixels(width, height).count()
    }

    /// `n` points evenly spaced in parameter along the boundary.
    pub(crate) fn sample_points(&self, n: usize) -> Vec<[f64; 2]> {
        let (sin_t, cos_t) = self.angle_rad().sin_cos();
        let a = self.semi_major();
        let b = self.semi_minor();
        (0..n)
            .map(|i| {
                let t = std::f64::consts::TAU * i as f64 / n as f64;
                let (st, ct) = t.sin_cos();
                let u = a * ct;
                let v = b * st;
                [self.cx + u * cos_t - v * sin_t, self.cy + u * sin_t + v * cos_t]
            })
            .collect()
    }

    pub(crate) fn to_conic(self) -> ConicCoeffs {
        ellipse_to_conic(&self)
    }

    /// First-order geometric distance from a point to the boundary (Sampson).
    pub(crate) fn sampson_distance(&self, x: f64, y: f64) -> f64 {
        self.to_conic().sampson_distance(x, y)
    }
}

/// Integer coordinates in `[lo, hi]` clipped to `0..len`.
fn pixel_span(lo: f64, hi: f64, len: u32) -> std::ops::Range<u32> {
    let lo = lo.ceil().max(0.0);
    let hi = (hi.floor() + 1.0).min(len as f64);
    if hi <= lo {
        0..0
    } else {
        lo as u32..hi as u32
    }
}

/// Wrap an angle in degrees into (−90, 90].
fn normalize_angle_deg(angle: f64) -> f64 {
    let mut a = angle % 180.0;
    if a > 90.0 {
        a -= 180.0;
    } else if a <= -90.0 {
        a += 180.0;
    }
    a
}
