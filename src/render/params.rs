//! Render parameters and the three render-option variants

use crate::core::config::RenderDefaults;
use crate::core::error::{Result, VisionError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tile laying direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Map an angle to the nearest laying direction (45..135 mod 180 is vertical)
    pub fn from_degrees(degrees: f64) -> Self {
        let folded = degrees.rem_euclid(180.0);
        if (45.0..135.0).contains(&folded) {
            Self::Vertical
        } else {
            Self::Horizontal
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal => write!(f, "horizontal"),
            Self::Vertical => write!(f, "vertical"),
        }
    }
}

/// Fully specified parameters for one render
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderParams {
    /// Grout width in pixels
    pub grout_width: f32,
    pub orientation: Orientation,
    /// Tile scale relative to the room
    pub tile_scale: f32,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            grout_width: 2.0,
            orientation: Orientation::Horizontal,
            tile_scale: 1.0,
        }
    }
}

impl From<&RenderDefaults> for RenderParams {
    fn from(defaults: &RenderDefaults) -> Self {
        Self {
            grout_width: defaults.grout_width,
            orientation: defaults.orientation,
            tile_scale: defaults.tile_scale,
        }
    }
}

impl RenderParams {
    /// Grout 0..=10, scale 0.5..=2
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=10.0).contains(&self.grout_width) {
            return Err(VisionError::ImageGenerationError(format!(
                "grout width {} is outside 0..=10",
                self.grout_width
            )));
        }
        if !(0.5..=2.0).contains(&self.tile_scale) {
            return Err(VisionError::ImageGenerationError(format!(
                "tile scale {} is outside 0.5..=2",
                self.tile_scale
            )));
        }
        Ok(())
    }
}

/// Built-in parameters of one render option
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderVariant {
    pub grout_width: f32,
    pub orientation: Orientation,
    pub tile_scale: f32,
}

/// The three render options, in presentation order
pub const RENDER_VARIANTS: [RenderVariant; 3] = [
    RenderVariant {
        grout_width: 2.0,
        orientation: Orientation::Horizontal,
        tile_scale: 1.0,
    },
    RenderVariant {
        grout_width: 3.0,
        orientation: Orientation::Vertical,
        tile_scale: 1.2,
    },
    RenderVariant {
        grout_width: 1.0,
        orientation: Orientation::Horizontal,
        tile_scale: 0.8,
    },
];

impl RenderVariant {
    /// Caller-supplied values win over the variant's own
    pub fn params(
        &self,
        grout_width: Option<f32>,
        orientation: Option<Orientation>,
        tile_scale: Option<f32>,
    ) -> RenderParams {
        RenderParams {
            grout_width: grout_width.unwrap_or(self.grout_width),
            orientation: orientation.unwrap_or(self.orientation),
            tile_scale: tile_scale.unwrap_or(self.tile_scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_from_degrees() {
        assert_eq!(Orientation::from_degrees(0.0), Orientation::Horizontal);
        assert_eq!(Orientation::from_degrees(90.0), Orientation::Vertical);
        assert_eq!(Orientation::from_degrees(-90.0), Orientation::Vertical);
        assert_eq!(Orientation::from_degrees(180.0), Orientation::Horizontal);
        assert_eq!(Orientation::from_degrees(30.0), Orientation::Horizontal);
        assert_eq!(Orientation::from_degrees(270.0), Orientation::Vertical);
    }

    #[test]
    fn test_orientation_display_and_serde() {
        assert_eq!(Orientation::Vertical.to_string(), "vertical");
        assert_eq!(
            serde_json::to_string(&Orientation::Horizontal).unwrap(),
            "\"horizontal\""
        );
    }

    #[test]
    fn test_variant_defaults() {
        let params: Vec<_> = RENDER_VARIANTS
            .iter()
            .map(|v| v.params(None, None, None))
            .collect();
        assert_eq!(params[0].grout_width, 2.0);
        assert_eq!(params[1].orientation, Orientation::Vertical);
        assert_eq!(params[1].tile_scale, 1.2);
        assert_eq!(params[2].tile_scale, 0.8);
    }

    #[test]
    fn test_variant_overrides() {
        let params = RENDER_VARIANTS[1].params(Some(5.0), None, Some(0.5));
        assert_eq!(params.grout_width, 5.0);
        assert_eq!(params.tile_scale, 0.5);
        assert_eq!(params.orientation, Orientation::Vertical);

        let params = RENDER_VARIANTS[1].params(None, Some(Orientation::Horizontal), None);
        assert_eq!(params.orientation, Orientation::Horizontal);
        assert_eq!(params.grout_width, 3.0);
    }

    #[test]
    fn test_validate() {
        assert!(RenderParams::default().validate().is_ok());
        let params = RenderParams {
            grout_width: 11.0,
            ..RenderParams::default()
        };
        assert!(params.validate().is_err());
        let params = RenderParams {
            tile_scale: 0.4,
            ..RenderParams::default()
        };
        assert!(params.validate().is_err());
    }
}
