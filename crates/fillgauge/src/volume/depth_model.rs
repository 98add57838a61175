use serde::{Deserialize, Serialize};

use super::VolumeConfig;
use crate::utensil::UtensilHint;

/// Assumed 3D shape of the food under its visible top surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DepthModel {
    /// Tapered container; `bottom_ratio` is bottom radius over top radius.
    Frustum { bottom_ratio: f64 },
    /// Rounded bowl.
    SphericalCap,
    /// Plate: a thin layer whose depth does not grow with coverage.
    ShallowCylinder,
    /// Straight-walled cup.
    Cylinder,
}

impl DepthModel {
    pub fn for_hint(hint: UtensilHint, config: &VolumeConfig) -> Self {
        match hint {
            UtensilHint::Auto => Self::Frustum {
                bottom_ratio: config.frustum_bottom_ratio,
            },
            UtensilHint::Bowl => Self::SphericalCap,
            UtensilHint::Plate => Self::ShallowCylinder,
            UtensilHint::Cup => Self::Cylinder,
        }
    }

    /// Whether the effective depth is the assumed height scaled by the fill fraction.
    pub fn scales_with_fill(&self) -> bool {
        !matches!(self, Self::ShallowCylinder)
    }

    /// Volume over `top area × depth` for a food body of `depth_mm` whose top
    /// surface has radius `radius_mm`.
    pub fn shape_factor(&self, depth_mm: f64, radius_mm: f64) -> f64 {
        match *self {
            Self::Frustum { bottom_ratio } => {
                let k = bottom_ratio.clamp(0.0, 1.0);
                (1.0 + k + k * k) / 3.0
            }
            // Cap volume π·h·(3a² + h²)/6 over π·a²·h.
            Self::SphericalCap => {
                if radius_mm > 0.0 {
                    0.5 + (depth_mm / radius_mm).powi(2) / 6.0
                } else {
                    0.5
                }
            }
            Self::ShallowCylinder | Self::Cylinder => 1.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Frustum { .. } => "frustum",
            Self::SphericalCap => "spherical_cap",
            Self::ShallowCylinder => "shallow_cylinder",
            Self::Cylinder => "cylinder",
        }
    }
}
