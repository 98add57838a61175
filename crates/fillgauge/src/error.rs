use thiserror::Error;

/// Request-level rejections raised before any pipeline stage runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("frame dimensions are zero")]
    EmptyFrame,

    #[error("frame is {width}x{height}, need at least {min_side} px per side")]
    FrameTooSmall {
        width: u32,
        height: u32,
        min_side: u32,
    },

    #[error("radius bounds must satisfy 0 < min < max, got min={min_radius} max={max_radius}")]
    InvalidRadiusBounds { min_radius: f64, max_radius: f64 },

    #[error("rim diameter must be a finite non-negative length in mm, got {0}")]
    InvalidDiameter(f64),

    #[error("assumed fill height must be a finite non-negative length in mm, got {0}")]
    InvalidAssumedHeight(f64),
}

/// Violations of the ellipse invariants (`major >= minor > 0`, finite values).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EllipseError {
    #[error("ellipse parameters must be finite")]
    NonFinite,

    #[error("ellipse axes must be positive, got major={major} minor={minor}")]
    NonPositiveAxis { major: f64, minor: f64 },

    #[error("minor axis {minor} exceeds major axis {major}")]
    AxesOutOfOrder { major: f64, minor: f64 },
}

/// Failures while loading a configuration override.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),
}
