//! Import options
//!
//! Options deserialize from the `[import]` table of `svgmesh.toml`; missing
//! keys take the defaults used by the scene importer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ImportError;

/// Length unit the imported coordinates are expressed in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Px,
    Pt,
    Pc,
    Mm,
    Cm,
    In,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Px => "px",
            Units::Pt => "pt",
            Units::Pc => "pc",
            Units::Mm => "mm",
            Units::Cm => "cm",
            Units::In => "in",
        }
    }

    /// Factor converting pixels at `dpi` into this unit
    pub fn per_pixel(&self, dpi: f32) -> f32 {
        match self {
            Units::Px => 1.0,
            Units::Pt => 72.0 / dpi,
            Units::Pc => 6.0 / dpi,
            Units::Mm => 25.4 / dpi,
            Units::Cm => 2.54 / dpi,
            Units::In => 1.0 / dpi,
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "px" => Ok(Units::Px),
            "pt" => Ok(Units::Pt),
            "pc" => Ok(Units::Pc),
            "mm" => Ok(Units::Mm),
            "cm" => Ok(Units::Cm),
            "in" => Ok(Units::In),
            other => Err(ImportError::InvalidOption {
                name: "units",
                value: other.to_string(),
            }),
        }
    }
}

/// Settings shared by the SVG importers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub units: Units,
    pub dpi: f32,
    /// Drawings smaller than this are scaled up to it
    pub target_size: f32,
    /// Mesh renderer quality
    pub quality: f32,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            units: Units::Px,
            dpi: 96.0,
            target_size: 256.0,
            quality: 0.4,
        }
    }
}

impl ImportOptions {
    /// Options of the packed-scene importer: 100 dpi and the renderer's
    /// default quality
    pub fn packed_scene() -> Self {
        Self {
            dpi: 100.0,
            quality: 0.5,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ImportError> {
        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            return Err(ImportError::InvalidOption {
                name: "dpi",
                value: self.dpi.to_string(),
            });
        }
        if !(self.target_size.is_finite() && self.target_size > 0.0) {
            return Err(ImportError::InvalidOption {
                name: "target_size",
                value: self.target_size.to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(ImportError::InvalidOption {
                name: "quality",
                value: self.quality.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ImportOptions::default();
        assert_eq!(options.units, Units::Px);
        assert_eq!(options.dpi, 96.0);
        assert_eq!(options.target_size, 256.0);
        assert_eq!(options.quality, 0.4);
        assert_eq!(ImportOptions::packed_scene().dpi, 100.0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_units_parse() {
        assert_eq!("mm".parse::<Units>().unwrap(), Units::Mm);
        assert!(matches!(
            "furlong".parse::<Units>(),
            Err(ImportError::InvalidOption { name: "units", .. })
        ));
        assert!((Units::In.per_pixel(96.0) - 1.0 / 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_values() {
        let options = ImportOptions {
            dpi: 0.0,
            ..Default::default()
        };
        assert!(options.validate().is_err());
        let options = ImportOptions {
            quality: 1.5,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }
}
