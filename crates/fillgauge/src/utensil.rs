//! Utensil hint: biases rim selection and picks the depth model.

use std::fmt;
use std::str::FromStr;

/// Caller-supplied utensil type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtensilHint {
    /// Unspecified; infer from shape.
    #[default]
    Auto,
    Bowl,
    Plate,
    Cup,
}

impl UtensilHint {
    pub const ALL: [UtensilHint; 4] = [Self::Auto, Self::Bowl, Self::Plate, Self::Cup];

    /// Expected `major / minor` range of the rim as photographed.
    ///
    /// Bowls and cups are usually shot from above; plates are often shot at an
    /// angle and look flatter. `None` means no preference.
    pub fn expected_aspect(self) -> Option<[f64; 2]> {
        match self {
            Self::Auto => None,
            Self::Bowl => Some([1.0, 1.35]),
            Self::Cup => Some([1.0, 1.25]),
            Self::Plate => Some([1.15, 2.6]),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Bowl => "bowl",
            Self::Plate => "plate",
            Self::Cup => "cup",
        }
    }
}

impl fmt::Display for UtensilHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized utensil name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown utensil '{0}', expected one of auto, bowl, plate, cup")]
pub struct ParseUtensilError(String);

impl FromStr for UtensilHint {
    type Err = ParseUtensilError;

    /// Case-insensitive; an empty string means `auto`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "bowl" => Ok(Self::Bowl),
            "plate" => Ok(Self::Plate),
            "cup" => Ok(Self::Cup),
            _ => Err(ParseUtensilError(s.to_string())),
        }
    }
}
