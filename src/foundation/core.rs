use std::fmt;

pub use kurbo::{Point, Size, Vec2};

use crate::foundation::color::hex_to_rgb;

/// Opaque layer identifier, unique for the lifetime of a store.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer_{}", self.0)
    }
}

/// Handle to an object owned by the rendering surface.
///
/// The handle never owns the object; it is only a key for geometry reads and writes.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct VisualId(pub u64);

/// Placement of a visual object on the working surface.
///
/// `size` is the unscaled intrinsic box; `scale` multiplies it. `angle_deg` is clockwise degrees.
/// For Image and Rotator layers `position` is the object's center; for every other kind it is
/// the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Geometry {
    /// Anchor position in working-surface coordinates.
    pub position: Point,
    /// Unscaled box size.
    pub size: Size,
    /// Per-axis scale factors.
    #[serde(default = "unit_scale")]
    pub scale: Vec2,
    /// Rotation in degrees.
    #[serde(default)]
    pub angle_deg: f64,
}

fn unit_scale() -> Vec2 {
    Vec2::new(1.0, 1.0)
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            size: Size::ZERO,
            scale: unit_scale(),
            angle_deg: 0.0,
        }
    }
}

impl Geometry {
    /// Unrotated, unscaled geometry of `size` anchored at `position`.
    pub fn new(position: Point, size: Size) -> Self {
        Self {
            position,
            size,
            ..Self::default()
        }
    }

    /// Box size after applying `scale`.
    pub fn scaled_size(&self) -> Size {
        Size::new(self.size.width * self.scale.x, self.size.height * self.scale.y)
    }
}

/// A color plus opacity as edited in the property panels.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Fill {
    /// Hex color such as `#FFA500`.
    pub color: String,
    /// Opacity in `[0, 1]`.
    #[serde(default = "full_opacity")]
    pub opacity: f64,
}

fn full_opacity() -> f64 {
    1.0
}

impl Fill {
    /// Build a fill from a hex color and opacity.
    pub fn new(color: impl Into<String>, opacity: f64) -> Self {
        Self {
            color: color.into(),
            opacity,
        }
    }

    /// Fully opaque fill.
    pub fn solid(color: impl Into<String>) -> Self {
        Self::new(color, 1.0)
    }

    /// `R,G,B,A` encoding used by the output format.
    pub fn to_rgba_string(&self) -> String {
        hex_to_rgb(&self.color, self.opacity)
    }
}

/// Shortest decimal text for `v`, with negative zero and non-finite values written as `0`.
pub fn format_number(v: f64) -> String {
    if !v.is_finite() || v == 0.0 {
        return "0".to_string();
    }
    format!("{v}")
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
