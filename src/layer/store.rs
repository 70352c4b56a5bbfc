use std::{
    cell::Cell,
    collections::HashSet,
    path::{Path, PathBuf},
    rc::Rc,
};

use crate::{
    foundation::{
        core::{Fill, Geometry, LayerId, Point, Size, Vec2},
        error::{SkinError, SkinResult},
    },
    layer::{
        model::{
            BarPart, BarProps, ImageProps, Layer, LayerKind, LayerPayload, LayerSnapshot,
            RotatorProps, ShapeKind, ShapeProps, SkinBackground, SkinSnapshot, TextProps,
        },
        overlay::{self, RotatorOverlay},
        tool::ActiveTool,
    },
    measure::table::{self, CUSTOM_TEXT},
    surface::{AssetPicker, Surface, VisualSpec},
};

#[derive(Clone, Debug)]
/// Seeds for newly created layers and the initial skin background.
pub struct StoreConfig {
    /// Content of a new text layer.
    pub text_content: String,
    /// Font display name of a new text layer.
    pub font_name: String,
    /// Font size of a new text layer.
    pub font_size: f64,
    /// Color of a new text layer.
    pub text_fill: Fill,
    /// Box of a new text layer, before any content-driven resize by the surface.
    pub text_box: Size,
    /// Bar track size and color.
    pub bar_background: (Size, Fill),
    /// Bar fill color.
    pub bar_foreground: Fill,
    /// Needle image for new rotators; the picker is consulted when unset.
    pub needle_image: Option<PathBuf>,
    /// Needle angle shown right after creation.
    pub rotator_preview_angle: f64,
    /// Box of a new shape.
    pub shape_box: Size,
    /// Initial skin background.
    pub background: SkinBackground,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            text_content: "New Text".to_string(),
            font_name: "Times New Roman".to_string(),
            font_size: 24.0,
            text_fill: Fill::solid("#000000"),
            text_box: Size::new(110.0, 27.0),
            bar_background: (Size::new(200.0, 50.0), Fill::solid("#000000")),
            bar_foreground: Fill::solid("#FFA500"),
            needle_image: None,
            rotator_preview_angle: 90.0,
            shape_box: Size::new(100.0, 100.0),
            background: SkinBackground::default(),
        }
    }
}

impl StoreConfig {
    fn shape_fill(shape: ShapeKind) -> Fill {
        match shape {
            ShapeKind::Rectangle => Fill::solid("#0000FF"),
            ShapeKind::Ellipse => Fill::solid("#008000"),
            ShapeKind::Triangle => Fill::solid("#FF0000"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Single-step move within the layer order.
pub enum MoveDirection {
    /// One position earlier (toward the bottom of the stack).
    Up,
    /// One position later (toward the top of the stack).
    Down,
}

/// Canonical, ordered collection of layers bound to one rendering surface.
///
/// Order is bottom-first: it is both the stacking order on the surface and the emission order
/// of the compiled skin. Geometry always lives on the surface; the store reads and writes it
/// through the layer's [`crate::foundation::core::VisualId`].
pub struct LayerStore<S: Surface> {
    surface: S,
    config: StoreConfig,
    layers: Vec<Layer>,
    background: SkinBackground,
    selected: Option<LayerId>,
    tool: ActiveTool,
    next_id: u64,
    name_counters: [u64; LayerKind::ALL.len()],
    geometry_revision: Rc<Cell<u64>>,
}

impl<S: Surface + std::fmt::Debug> std::fmt::Debug for LayerStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerStore")
            .field("surface", &self.surface)
            .field("layers", &self.layers)
            .field("background", &self.background)
            .field("selected", &self.selected)
            .field("tool", &self.tool)
            .finish()
    }
}

impl<S: Surface> LayerStore<S> {
    /// Bind a new, empty store to `surface`.
    pub fn new(mut surface: S, config: StoreConfig) -> Self {
        let geometry_revision = Rc::new(Cell::new(0));
        let counter = Rc::clone(&geometry_revision);
        surface.on_changed(Box::new(move |_, _| counter.set(counter.get() + 1)));
        Self {
            surface,
            background: config.background.clone(),
            config,
            layers: Vec::new(),
            selected: None,
            tool: ActiveTool::Select,
            next_id: 0,
            name_counters: [0; LayerKind::ALL.len()],
            geometry_revision,
        }
    }

    /// Bound surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Creation seeds.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of geometry changes the surface has reported so far, including user drags.
    pub fn geometry_revision(&self) -> u64 {
        self.geometry_revision.get()
    }

    /// Layers, bottom first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Layer ids, bottom first.
    pub fn order(&self) -> Vec<LayerId> {
        self.layers.iter().map(|l| l.id).collect()
    }

    /// Borrow a layer.
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    fn position(&self, id: LayerId) -> SkinResult<usize> {
        self.layers
            .iter()
            .position(|l| l.id == id)
            .ok_or(SkinError::UnknownLayer(id))
    }

    fn layer_mut(&mut self, id: LayerId) -> SkinResult<&mut Layer> {
        self.layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(SkinError::UnknownLayer(id))
    }

    /// Skin background.
    pub fn background(&self) -> &SkinBackground {
        &self.background
    }

    /// Move the skin background on the working surface.
    pub fn set_background_position(&mut self, position: Point) {
        self.background.position = position;
    }

    /// Resize the skin background.
    pub fn set_background_size(&mut self, width: f64, height: f64) -> SkinResult<()> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(SkinError::validation(
                "background width/height must be finite and > 0",
            ));
        }
        self.background.width = width;
        self.background.height = height;
        Ok(())
    }

    /// Change the editor-only backdrop color.
    pub fn set_backdrop_color(&mut self, color: impl Into<String>) {
        self.background.backdrop_color = color.into();
    }

    /// Current tool.
    pub fn active_tool(&self) -> ActiveTool {
        self.tool
    }

    /// Switch tools unconditionally.
    pub fn set_active_tool(&mut self, tool: ActiveTool) {
        self.tool = tool;
    }

    /// Handle a click on the working surface with the current tool.
    ///
    /// Placement tools create one layer and return to [`ActiveTool::Select`], even when the
    /// picker is cancelled. With `Select` active nothing happens.
    pub fn place_at_point(
        &mut self,
        point: Point,
        picker: &mut dyn AssetPicker,
    ) -> SkinResult<Option<LayerId>> {
        let Some(kind) = self.tool.placement_kind() else {
            return Ok(None);
        };
        self.tool = ActiveTool::Select;
        self.create_layer(kind, point, picker)
    }

    /// Create a layer of `kind` at `point`, appended on top and selected.
    ///
    /// Image and Rotator layers first consult `picker`; a cancelled pick creates nothing.
    /// Shape layers default to a rectangle.
    pub fn create_layer(
        &mut self,
        kind: LayerKind,
        point: Point,
        picker: &mut dyn AssetPicker,
    ) -> SkinResult<Option<LayerId>> {
        match kind {
            LayerKind::Text => {
                let text = self.config.text_content.clone();
                Ok(Some(self.create_text(point, text)))
            }
            LayerKind::Image => self.create_image(point, picker),
            LayerKind::Rotator => self.create_rotator(point, picker),
            LayerKind::Bar => Ok(Some(self.create_bar(point))),
            LayerKind::Shape => Ok(Some(self.create_shape(ShapeKind::Rectangle, point))),
        }
    }

    /// Create a text layer showing `text`, top-left at `point`.
    pub fn create_text(&mut self, point: Point, text: impl Into<String>) -> LayerId {
        let payload = LayerPayload::Text(TextProps {
            text: text.into(),
            font_name: self.config.font_name.clone(),
            font_size: self.config.font_size,
            fill: self.config.text_fill.clone(),
        });
        let geometry = Geometry::new(point, self.config.text_box);
        self.insert(payload, geometry)
    }

    /// Create an image layer centered at `point` from a picked file.
    pub fn create_image(
        &mut self,
        point: Point,
        picker: &mut dyn AssetPicker,
    ) -> SkinResult<Option<LayerId>> {
        let Some(source) = picker.pick_image(LayerKind::Image)? else {
            tracing::debug!("image pick cancelled");
            return Ok(None);
        };
        let size = probe_image(&source)?;
        let payload = LayerPayload::Image(ImageProps { source });
        Ok(Some(self.insert(payload, Geometry::new(point, size))))
    }

    /// Create a rotator centered at `point` using the configured needle, or a picked one.
    pub fn create_rotator(
        &mut self,
        point: Point,
        picker: &mut dyn AssetPicker,
    ) -> SkinResult<Option<LayerId>> {
        let source = match &self.config.needle_image {
            Some(p) => p.clone(),
            None => match picker.pick_image(LayerKind::Rotator)? {
                Some(p) => p,
                None => {
                    tracing::debug!("needle pick cancelled");
                    return Ok(None);
                }
            },
        };
        let size = probe_image(&source)?;
        let geometry = Geometry {
            angle_deg: self.config.rotator_preview_angle,
            ..Geometry::new(point, size)
        };
        let payload = LayerPayload::Rotator(RotatorProps::new(source));
        Ok(Some(self.insert(payload, geometry)))
    }

    /// Create a bar, top-left at `point`.
    pub fn create_bar(&mut self, point: Point) -> LayerId {
        let (size, background) = self.config.bar_background.clone();
        let payload = LayerPayload::Bar(BarProps {
            background,
            foreground: self.config.bar_foreground.clone(),
        });
        self.insert(payload, Geometry::new(point, size))
    }

    /// Create a shape, top-left at `point`.
    pub fn create_shape(&mut self, shape: ShapeKind, point: Point) -> LayerId {
        let payload = LayerPayload::Shape(ShapeProps {
            shape,
            fill: StoreConfig::shape_fill(shape),
        });
        self.insert(payload, Geometry::new(point, self.config.shape_box))
    }

    fn insert(&mut self, payload: LayerPayload, geometry: Geometry) -> LayerId {
        let kind = payload.kind();
        self.next_id += 1;
        let id = LayerId(self.next_id);
        let counter = &mut self.name_counters[kind.index()];
        *counter += 1;
        let name = format!("{}{}", kind.label(), counter);

        let visual = self.surface.add_object(VisualSpec {
            kind,
            geometry,
            payload: payload.clone(),
        });
        tracing::debug!(%id, name = %name, ?kind, "layer created");
        self.layers.push(Layer {
            id,
            name,
            measure: table::default_measure(kind).map(str::to_string),
            payload,
            visual,
            visible: true,
            locked: false,
        });
        self.select_layer(id);
        id
    }

    /// Remove a layer and its surface object. Unknown ids are ignored.
    pub fn delete_layer(&mut self, id: LayerId) -> bool {
        let Ok(idx) = self.position(id) else {
            return false;
        };
        let layer = self.layers.remove(idx);
        self.surface.remove_object(layer.visual);
        if self.selected == Some(id) {
            self.selected = None;
            self.surface.set_active(None);
        }
        tracing::debug!(%id, name = %layer.name, "layer deleted");
        true
    }

    /// Replace the order with a permutation of the current ids.
    pub fn reorder(&mut self, new_order: &[LayerId]) -> SkinResult<()> {
        if new_order.len() != self.layers.len() {
            return Err(SkinError::validation(format!(
                "reorder expects {} ids, got {}",
                self.layers.len(),
                new_order.len()
            )));
        }
        let mut seen = HashSet::with_capacity(new_order.len());
        for id in new_order {
            if !seen.insert(*id) {
                return Err(SkinError::validation(format!("reorder repeats {id}")));
            }
            if self.layer(*id).is_none() {
                return Err(SkinError::UnknownLayer(*id));
            }
        }

        let mut old = std::mem::take(&mut self.layers);
        for id in new_order {
            if let Some(i) = old.iter().position(|l| l.id == *id) {
                self.layers.push(old.swap_remove(i));
            }
        }
        self.restack();
        Ok(())
    }

    /// Swap a layer with its neighbor. No-op at either end.
    pub fn move_layer(&mut self, id: LayerId, direction: MoveDirection) -> SkinResult<()> {
        let idx = self.position(id)?;
        let target = match direction {
            MoveDirection::Up if idx > 0 => idx - 1,
            MoveDirection::Down if idx + 1 < self.layers.len() => idx + 1,
            _ => return Ok(()),
        };
        self.layers.swap(idx, target);
        self.restack();
        Ok(())
    }

    fn restack(&mut self) {
        let order: Vec<_> = self.layers.iter().map(|l| l.visual).collect();
        self.surface.restack(&order);
    }

    /// Select a layer, replacing any previous selection. Unknown ids are ignored.
    pub fn select_layer(&mut self, id: LayerId) {
        let Some(visual) = self.layer(id).map(|l| l.visual) else {
            return;
        };
        self.selected = Some(id);
        self.surface.set_active(Some(visual));
    }

    /// Drop the selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.surface.set_active(None);
    }

    /// Selected layer.
    pub fn selected(&self) -> Option<&Layer> {
        self.selected.and_then(|id| self.layer(id))
    }

    /// Flip the editor-only visibility flag; returns the new value.
    pub fn toggle_visibility(&mut self, id: LayerId) -> SkinResult<bool> {
        let layer = self.layer_mut(id)?;
        layer.visible = !layer.visible;
        let (visual, visible) = (layer.visual, layer.visible);
        self.surface.set_visible(visual, visible);
        Ok(visible)
    }

    /// Flip the lock flag; locked layers cannot be picked on the surface. Returns the new value.
    pub fn toggle_lock(&mut self, id: LayerId) -> SkinResult<bool> {
        let layer = self.layer_mut(id)?;
        layer.locked = !layer.locked;
        let (visual, locked) = (layer.visual, layer.locked);
        self.surface.set_selectable(visual, !locked);
        Ok(locked)
    }

    /// Bind a measure. Text layers switch their displayed content to the measure's sample.
    pub fn set_measure(&mut self, id: LayerId, measure_id: &str) -> SkinResult<()> {
        let layer = self.layer_mut(id)?;
        let kind = layer.kind();
        let applies = if measure_id == CUSTOM_TEXT {
            kind == LayerKind::Text
        } else {
            match table::lookup(measure_id) {
                Some(entry) => entry.kind == kind,
                None => {
                    return Err(SkinError::measure(format!("unknown measure '{measure_id}'")));
                }
            }
        };
        if !applies {
            return Err(SkinError::measure(format!(
                "measure '{measure_id}' does not apply to {kind} layers"
            )));
        }

        layer.measure = Some(measure_id.to_string());
        if let LayerPayload::Text(props) = &mut layer.payload
            && let Some(preview) = table::preview_value(measure_id)
        {
            props.text = preview.to_string();
        }
        self.sync(id)
    }

    fn text_props(&mut self, id: LayerId) -> SkinResult<&mut TextProps> {
        match &mut self.layer_mut(id)?.payload {
            LayerPayload::Text(p) => Ok(p),
            other => Err(kind_mismatch(id, LayerKind::Text, other.kind())),
        }
    }

    fn rotator_props(&mut self, id: LayerId) -> SkinResult<&mut RotatorProps> {
        match &mut self.layer_mut(id)?.payload {
            LayerPayload::Rotator(p) => Ok(p),
            other => Err(kind_mismatch(id, LayerKind::Rotator, other.kind())),
        }
    }

    /// Replace a text layer's literal content.
    pub fn set_text(&mut self, id: LayerId, text: impl Into<String>) -> SkinResult<()> {
        self.text_props(id)?.text = text.into();
        self.sync(id)
    }

    /// Change a text layer's font by display name.
    pub fn set_font(&mut self, id: LayerId, font_name: impl Into<String>) -> SkinResult<()> {
        self.text_props(id)?.font_name = font_name.into();
        self.sync(id)
    }

    /// Change a text layer's font size.
    pub fn set_font_size(&mut self, id: LayerId, size: f64) -> SkinResult<()> {
        if !size.is_finite() || size <= 0.0 {
            return Err(SkinError::validation("font size must be finite and > 0"));
        }
        self.text_props(id)?.font_size = size;
        self.sync(id)
    }

    /// Change a text layer's color.
    pub fn set_text_fill(&mut self, id: LayerId, fill: Fill) -> SkinResult<()> {
        self.text_props(id)?.fill = fill;
        self.sync(id)
    }

    /// Change one half of a bar's colors.
    pub fn set_bar_fill(&mut self, id: LayerId, part: BarPart, fill: Fill) -> SkinResult<()> {
        match &mut self.layer_mut(id)?.payload {
            LayerPayload::Bar(p) => match part {
                BarPart::Background => p.background = fill,
                BarPart::Foreground => p.foreground = fill,
            },
            other => return Err(kind_mismatch(id, LayerKind::Bar, other.kind())),
        }
        self.sync(id)
    }

    /// Change a shape's color.
    pub fn set_shape_fill(&mut self, id: LayerId, fill: Fill) -> SkinResult<()> {
        match &mut self.layer_mut(id)?.payload {
            LayerPayload::Shape(p) => p.fill = fill,
            other => return Err(kind_mismatch(id, LayerKind::Shape, other.kind())),
        }
        self.sync(id)
    }

    /// Point an Image or Rotator layer at a new file.
    ///
    /// The box is re-measured from the file and rotator pivot offsets are reset to zero.
    pub fn set_image_source(&mut self, id: LayerId, path: impl Into<PathBuf>) -> SkinResult<()> {
        let path = path.into();
        let layer = self.layer(id).ok_or(SkinError::UnknownLayer(id))?;
        if !layer.kind().center_anchored() {
            return Err(SkinError::validation(format!(
                "{id} is a {} layer and has no image source",
                layer.kind()
            )));
        }
        let visual = layer.visual;
        let size = probe_image(&path)?;

        match &mut self.layer_mut(id)?.payload {
            LayerPayload::Image(p) => p.source = path,
            LayerPayload::Rotator(p) => {
                p.source = path;
                p.offset_x = 0.0;
                p.offset_y = 0.0;
            }
            LayerPayload::Text(_) | LayerPayload::Bar(_) | LayerPayload::Shape(_) => {}
        }
        if let Some(mut g) = self.surface.geometry(visual) {
            g.size = size;
            self.surface.set_geometry(visual, g);
        }
        self.sync(id)
    }

    /// Kind-specific extra properties, in display order. Empty for kinds without any.
    pub fn extra_properties(&self, id: LayerId) -> SkinResult<Vec<(String, String)>> {
        let layer = self.layer(id).ok_or(SkinError::UnknownLayer(id))?;
        Ok(match &layer.payload {
            LayerPayload::Rotator(p) => p.extra_properties(),
            _ => Vec::new(),
        })
    }

    /// Set a rotator property (`offsetX`, `offsetY`, `startAngle`, `rotationAngle`).
    ///
    /// Changing `startAngle` also turns the needle preview to that angle.
    pub fn set_extra_property(&mut self, id: LayerId, name: &str, value: &str) -> SkinResult<()> {
        let props = self.rotator_props(id)?;
        props.set_extra_property(name, value)?;
        let start = props.start_angle;
        if name == "startAngle" {
            self.update_geometry(id, |g| g.angle_deg = start)?;
        }
        self.sync(id)
    }

    /// Current geometry, read from the surface.
    pub fn geometry(&self, id: LayerId) -> SkinResult<Geometry> {
        let layer = self.layer(id).ok_or(SkinError::UnknownLayer(id))?;
        self.surface.geometry(layer.visual).ok_or_else(|| {
            SkinError::validation(format!("{id} has no object on the surface"))
        })
    }

    fn update_geometry(&mut self, id: LayerId, edit: impl FnOnce(&mut Geometry)) -> SkinResult<()> {
        let mut g = self.geometry(id)?;
        edit(&mut g);
        let visual = self.layer(id).ok_or(SkinError::UnknownLayer(id))?.visual;
        self.surface.set_geometry(visual, g);
        Ok(())
    }

    /// Move a layer's anchor.
    pub fn set_position(&mut self, id: LayerId, position: Point) -> SkinResult<()> {
        self.update_geometry(id, |g| g.position = position)
    }

    /// Resize a layer's displayed box.
    ///
    /// Image and Rotator layers keep their intrinsic box and change scale instead.
    pub fn set_size(&mut self, id: LayerId, size: Size) -> SkinResult<()> {
        if !(size.width.is_finite() && size.height.is_finite())
            || size.width <= 0.0
            || size.height <= 0.0
        {
            return Err(SkinError::validation("size must be finite and > 0"));
        }
        let raster = self
            .layer(id)
            .ok_or(SkinError::UnknownLayer(id))?
            .kind()
            .center_anchored();
        self.update_geometry(id, |g| {
            if raster && g.size.width > 0.0 && g.size.height > 0.0 {
                g.scale = Vec2::new(size.width / g.size.width, size.height / g.size.height);
            } else {
                g.size = size;
                g.scale = Vec2::new(1.0, 1.0);
            }
        })
    }

    /// Set per-axis scale.
    pub fn set_scale(&mut self, id: LayerId, scale: Vec2) -> SkinResult<()> {
        if !(scale.x.is_finite() && scale.y.is_finite()) || scale.x <= 0.0 || scale.y <= 0.0 {
            return Err(SkinError::validation("scale must be finite and > 0"));
        }
        self.update_geometry(id, |g| g.scale = scale)
    }

    /// Set rotation in degrees.
    pub fn set_angle(&mut self, id: LayerId, angle_deg: f64) -> SkinResult<()> {
        if !angle_deg.is_finite() {
            return Err(SkinError::validation("angle must be finite"));
        }
        self.update_geometry(id, |g| g.angle_deg = angle_deg)
    }

    /// Editor overlay of one layer, computed from its current geometry.
    pub fn overlay(&self, id: LayerId) -> SkinResult<Option<RotatorOverlay>> {
        let layer = self.layer(id).ok_or(SkinError::UnknownLayer(id))?;
        Ok(self
            .surface
            .geometry(layer.visual)
            .and_then(|g| overlay::derive(&layer.payload, &g)))
    }

    /// Overlays of every layer that has one, bottom first.
    pub fn overlays(&self) -> Vec<(LayerId, RotatorOverlay)> {
        self.layers
            .iter()
            .filter_map(|l| {
                let g = self.surface.geometry(l.visual)?;
                overlay::derive(&l.payload, &g).map(|o| (l.id, o))
            })
            .collect()
    }

    /// Resolve every layer's geometry for export.
    pub fn snapshot(&self) -> SkinSnapshot {
        let layers = self
            .layers
            .iter()
            .filter_map(|l| {
                let Some(geometry) = self.surface.geometry(l.visual) else {
                    tracing::warn!(id = %l.id, name = %l.name, "layer has no surface object; skipped");
                    return None;
                };
                Some(LayerSnapshot {
                    id: l.id,
                    name: l.name.clone(),
                    measure: l.measure.clone(),
                    payload: l.payload.clone(),
                    geometry,
                    visible: l.visible,
                    locked: l.locked,
                })
            })
            .collect();
        SkinSnapshot {
            background: self.background.clone(),
            layers,
        }
    }

    fn sync(&mut self, id: LayerId) -> SkinResult<()> {
        let layer = self.layer(id).ok_or(SkinError::UnknownLayer(id))?;
        let (visual, payload) = (layer.visual, layer.payload.clone());
        self.surface.sync_payload(visual, &payload);
        Ok(())
    }
}

fn kind_mismatch(id: LayerId, expected: LayerKind, actual: LayerKind) -> SkinError {
    SkinError::validation(format!("{id} is a {actual} layer, expected {expected}"))
}

fn probe_image(path: &Path) -> SkinResult<Size> {
    let (w, h) = image::image_dimensions(path)
        .map_err(|e| SkinError::asset(path, format!("decode image dimensions: {e}")))?;
    Ok(Size::new(f64::from(w), f64::from(h)))
}

#[cfg(test)]
#[path = "../../tests/unit/layer/store.rs"]
mod tests;
