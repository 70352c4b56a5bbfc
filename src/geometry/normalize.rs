//! Pure coordinate helpers shared by the live editor and the compiler.

use crate::foundation::core::{Point, Size};

/// Smallest axis-aligned box containing a rotated rectangle.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct RotatedBounds {
    /// Bounding-box width.
    pub width: f64,
    /// Bounding-box height.
    pub height: f64,
    /// Factor that would shrink the original box to fit inside its own bounds.
    pub scale: f64,
}

impl RotatedBounds {
    /// Bounds as a [`Size`].
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Express `point` relative to `origin`.
///
/// Every exported position is re-based against the skin background's own position, so the skin
/// is anchored at the background origin regardless of where it sits on the working surface.
#[inline]
pub fn rebase(point: Point, origin: Point) -> Point {
    Point::new(point.x - origin.x, point.y - origin.y)
}

/// Degrees to radians, computed as `deg * (PI / 180)`.
#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * (std::f64::consts::PI / 180.0)
}

/// Axis-aligned bounds of a `width` x `height` box rotated by `angle_deg`.
///
/// `boundW = w|cos t| + h|sin t|`, `boundH = w|sin t| + h|cos t|`.
pub fn rotated_bounds(width: f64, height: f64, angle_deg: f64) -> RotatedBounds {
    let angle = deg_to_rad(angle_deg).abs();
    let abs_cos = angle.cos().abs();
    let abs_sin = angle.sin().abs();

    let bound_width = width * abs_cos + height * abs_sin;
    let bound_height = width * abs_sin + height * abs_cos;

    let scale = if bound_width > 0.0 && bound_height > 0.0 {
        (width / bound_width).min(height / bound_height)
    } else {
        1.0
    };

    RotatedBounds {
        width: bound_width,
        height: bound_height,
        scale,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/normalize.rs"]
mod tests;
