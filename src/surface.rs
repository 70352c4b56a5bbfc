//! Capability interface to the interactive rendering surface.
//!
//! The surface owns every visual object. Layers only hold a [`VisualId`] back-link and read or
//! write geometry through [`Surface`]; nothing in the store assumes a concrete graphics library.

use std::{collections::BTreeMap, path::PathBuf};

use crate::{
    foundation::{
        core::{Geometry, Point, VisualId},
        error::SkinResult,
    },
    layer::model::{LayerKind, LayerPayload},
};

/// Listener invoked after an object's geometry changes.
pub type GeometryListener = Box<dyn FnMut(VisualId, &Geometry)>;

/// Everything the surface needs to construct a visual object for a new layer.
#[derive(Clone, Debug)]
pub struct VisualSpec {
    /// Kind of layer being created.
    pub kind: LayerKind,
    /// Initial geometry.
    pub geometry: Geometry,
    /// Initial kind-specific content (text, fills, image source).
    pub payload: LayerPayload,
}

/// Rendering-surface operations the layer store depends on.
pub trait Surface {
    /// Create a visual object and return its handle.
    fn add_object(&mut self, spec: VisualSpec) -> VisualId;
    /// Remove a visual object. Returns `false` when the handle is unknown.
    fn remove_object(&mut self, id: VisualId) -> bool;
    /// Current geometry of an object.
    fn geometry(&self, id: VisualId) -> Option<Geometry>;
    /// Replace an object's geometry.
    fn set_geometry(&mut self, id: VisualId, geometry: Geometry);
    /// Push updated kind-specific content (text, font, fills, image source).
    fn sync_payload(&mut self, id: VisualId, payload: &LayerPayload);
    /// Show or hide an object.
    fn set_visible(&mut self, id: VisualId, visible: bool);
    /// Allow or forbid interactive selection/dragging.
    fn set_selectable(&mut self, id: VisualId, selectable: bool);
    /// Re-apply the stacking order, bottom first.
    fn restack(&mut self, order: &[VisualId]);
    /// Mark the active (selected) object, or none.
    fn set_active(&mut self, id: Option<VisualId>);
    /// Register a geometry-change listener.
    fn on_changed(&mut self, listener: GeometryListener);
}

/// File-picker collaborator consulted before creating raster layers.
///
/// `Ok(None)` means the user cancelled; no layer is created and no error is reported.
pub trait AssetPicker {
    /// Choose an image for a new layer of `kind`.
    fn pick_image(&mut self, kind: LayerKind) -> SkinResult<Option<PathBuf>>;
}

impl<F> AssetPicker for F
where
    F: FnMut(LayerKind) -> SkinResult<Option<PathBuf>>,
{
    fn pick_image(&mut self, kind: LayerKind) -> SkinResult<Option<PathBuf>> {
        self(kind)
    }
}

/// State of one object in a [`MemorySurface`].
#[derive(Clone, Debug)]
pub struct MemoryObject {
    /// Kind the object was created for.
    pub kind: LayerKind,
    /// Current geometry.
    pub geometry: Geometry,
    /// Last synced content.
    pub payload: LayerPayload,
    /// Visibility flag.
    pub visible: bool,
    /// Selectability flag.
    pub selectable: bool,
}

/// Headless [`Surface`] keeping objects in memory.
///
/// Used by the command-line front end and by tests; an interactive editor supplies its own
/// implementation backed by a real canvas.
#[derive(Default)]
pub struct MemorySurface {
    next_id: u64,
    objects: BTreeMap<VisualId, MemoryObject>,
    stacking: Vec<VisualId>,
    active: Option<VisualId>,
    listeners: Vec<GeometryListener>,
}

impl std::fmt::Debug for MemorySurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySurface")
            .field("objects", &self.objects.len())
            .field("stacking", &self.stacking)
            .field("active", &self.active)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl MemorySurface {
    /// Empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow an object.
    pub fn object(&self, id: VisualId) -> Option<&MemoryObject> {
        self.objects.get(&id)
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the surface holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Stacking order, bottom first.
    pub fn stacking(&self) -> &[VisualId] {
        &self.stacking
    }

    /// Active object, if any.
    pub fn active(&self) -> Option<VisualId> {
        self.active
    }

    /// Simulate the user dragging an object to `position`.
    pub fn drag_to(&mut self, id: VisualId, position: Point) {
        if let Some(mut g) = self.geometry(id) {
            g.position = position;
            self.set_geometry(id, g);
        }
    }

    fn notify(&mut self, id: VisualId, geometry: &Geometry) {
        for listener in &mut self.listeners {
            listener(id, geometry);
        }
    }
}

impl Surface for MemorySurface {
    fn add_object(&mut self, spec: VisualSpec) -> VisualId {
        self.next_id += 1;
        let id = VisualId(self.next_id);
        self.objects.insert(
            id,
            MemoryObject {
                kind: spec.kind,
                geometry: spec.geometry,
                payload: spec.payload,
                visible: true,
                selectable: true,
            },
        );
        self.stacking.push(id);
        id
    }

    fn remove_object(&mut self, id: VisualId) -> bool {
        if self.objects.remove(&id).is_none() {
            return false;
        }
        self.stacking.retain(|v| *v != id);
        if self.active == Some(id) {
            self.active = None;
        }
        true
    }

    fn geometry(&self, id: VisualId) -> Option<Geometry> {
        self.objects.get(&id).map(|o| o.geometry)
    }

    fn set_geometry(&mut self, id: VisualId, geometry: Geometry) {
        let Some(obj) = self.objects.get_mut(&id) else {
            return;
        };
        obj.geometry = geometry;
        self.notify(id, &geometry);
    }

    fn sync_payload(&mut self, id: VisualId, payload: &LayerPayload) {
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.payload = payload.clone();
        }
    }

    fn set_visible(&mut self, id: VisualId, visible: bool) {
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.visible = visible;
        }
    }

    fn set_selectable(&mut self, id: VisualId, selectable: bool) {
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.selectable = selectable;
        }
    }

    fn restack(&mut self, order: &[VisualId]) {
        self.stacking = order
            .iter()
            .copied()
            .filter(|id| self.objects.contains_key(id))
            .collect();
    }

    fn set_active(&mut self, id: Option<VisualId>) {
        self.active = id.filter(|v| self.objects.contains_key(v));
    }

    fn on_changed(&mut self, listener: GeometryListener) {
        self.listeners.push(listener);
    }
}

#[cfg(test)]
#[path = "../tests/unit/surface/memory.rs"]
mod tests;
