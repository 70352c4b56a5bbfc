//! Editor-only visual aids, derived from layer state on demand and never stored.

use crate::{
    foundation::core::{Geometry, Point, Vec2},
    layer::model::{LayerPayload, RotatorProps},
};

/// Radius of the pivot marker.
pub const PIVOT_RADIUS: f64 = 5.0;
/// Radius of the angle-range arc.
pub const RANGE_RADIUS: f64 = 40.0;

#[derive(Clone, Copy, Debug, PartialEq)]
/// Pivot marker plus sweep arc drawn over a rotator.
pub struct RotatorOverlay {
    /// Rotation pivot on the working surface.
    pub pivot: Point,
    /// Pivot marker radius.
    pub pivot_radius: f64,
    /// Arc radius.
    pub range_radius: f64,
    /// Arc start, in degrees, measured the way the surface measures angles (0 = east).
    pub range_start_deg: f64,
    /// Arc length in degrees.
    pub range_sweep_deg: f64,
}

/// Overlay for a layer, if its kind has one.
pub fn derive(payload: &LayerPayload, geometry: &Geometry) -> Option<RotatorOverlay> {
    match payload {
        LayerPayload::Rotator(props) => Some(rotator_overlay(props, geometry)),
        LayerPayload::Text(_)
        | LayerPayload::Image(_)
        | LayerPayload::Bar(_)
        | LayerPayload::Shape(_) => None,
    }
}

fn rotator_overlay(props: &RotatorProps, geometry: &Geometry) -> RotatorOverlay {
    // Needle images point north at angle 0.
    RotatorOverlay {
        pivot: geometry.position + Vec2::new(props.offset_x, props.offset_y),
        pivot_radius: PIVOT_RADIUS,
        range_radius: RANGE_RADIUS,
        range_start_deg: props.start_angle - 90.0,
        range_sweep_deg: props.rotation_angle,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/overlay.rs"]
mod tests;
