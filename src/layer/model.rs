use std::{fmt, path::PathBuf};

use crate::foundation::{
    core::{Fill, Geometry, LayerId, Point, Size, VisualId, format_number},
    error::{SkinError, SkinResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// Closed set of layer kinds. Each kind maps to exactly one meter type.
pub enum LayerKind {
    /// Font-rendered string.
    Text,
    /// Static raster image.
    Image,
    /// Image swept between two angles by a measure value.
    Rotator,
    /// Two-color proportional fill.
    Bar,
    /// Primitive vector shape.
    Shape,
}

impl LayerKind {
    /// Prefix used for generated layer names.
    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Image => "Image",
            Self::Rotator => "Rotator",
            Self::Bar => "Bar",
            Self::Shape => "Shape",
        }
    }

    /// Every kind, in counter order.
    pub const ALL: [LayerKind; 5] = [
        Self::Text,
        Self::Image,
        Self::Rotator,
        Self::Bar,
        Self::Shape,
    ];

    /// Position of this kind in [`LayerKind::ALL`].
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Text => 0,
            Self::Image => 1,
            Self::Rotator => 2,
            Self::Bar => 3,
            Self::Shape => 4,
        }
    }

    /// Whether `geometry.position` is the object's center rather than its top-left corner.
    pub fn center_anchored(self) -> bool {
        matches!(self, Self::Image | Self::Rotator)
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Text layer content.
pub struct TextProps {
    /// Literal content, shown when the measure is `custom-text`.
    pub text: String,
    /// Font display name, e.g. `Roboto Bold`.
    pub font_name: String,
    /// Font size in editor pixels.
    pub font_size: f64,
    /// Text color.
    pub fill: Fill,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Image layer content.
pub struct ImageProps {
    /// Path of the referenced raster file.
    pub source: PathBuf,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Rotator (needle) layer content.
pub struct RotatorProps {
    /// Path of the needle image.
    pub source: PathBuf,
    /// Pivot offset from the image center, x axis.
    #[serde(default)]
    pub offset_x: f64,
    /// Pivot offset from the image center, y axis.
    #[serde(default)]
    pub offset_y: f64,
    /// Sweep start in degrees.
    #[serde(default)]
    pub start_angle: f64,
    /// Sweep length in degrees.
    #[serde(default = "default_rotation_angle")]
    pub rotation_angle: f64,
}

fn default_rotation_angle() -> f64 {
    90.0
}

impl RotatorProps {
    /// Extra property names, in display order.
    pub const PROPERTY_NAMES: [&'static str; 4] =
        ["offsetX", "offsetY", "startAngle", "rotationAngle"];

    /// Needle at `source` with the default calibration.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            offset_x: 0.0,
            offset_y: 0.0,
            start_angle: 0.0,
            rotation_angle: default_rotation_angle(),
        }
    }

    /// Ordered `(name, value)` pairs for the properties panel.
    pub fn extra_properties(&self) -> Vec<(String, String)> {
        Self::PROPERTY_NAMES
            .iter()
            .zip([
                self.offset_x,
                self.offset_y,
                self.start_angle,
                self.rotation_angle,
            ])
            .map(|(name, v)| ((*name).to_string(), format_number(v)))
            .collect()
    }

    /// Set one extra property from its textual value.
    pub fn set_extra_property(&mut self, name: &str, value: &str) -> SkinResult<()> {
        let parsed: f64 = value.trim().parse().map_err(|_| {
            SkinError::validation(format!("property '{name}' expects a number, got '{value}'"))
        })?;
        if !parsed.is_finite() {
            return Err(SkinError::validation(format!(
                "property '{name}' must be finite"
            )));
        }
        let slot = match name {
            "offsetX" => &mut self.offset_x,
            "offsetY" => &mut self.offset_y,
            "startAngle" => &mut self.start_angle,
            "rotationAngle" => &mut self.rotation_angle,
            other => {
                return Err(SkinError::validation(format!(
                    "unknown rotator property '{other}'"
                )));
            }
        };
        *slot = parsed;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Bar layer content: a background track with a foreground fill on top.
pub struct BarProps {
    /// Track color.
    pub background: Fill,
    /// Fill color.
    pub foreground: Fill,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Which half of a bar a fill edit targets.
pub enum BarPart {
    /// The track.
    Background,
    /// The proportional fill.
    Foreground,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Primitive shape outline.
pub enum ShapeKind {
    /// Axis-aligned rectangle.
    Rectangle,
    /// Ellipse inscribed in the box.
    Ellipse,
    /// Isosceles triangle with its apex at the top center.
    Triangle,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Shape layer content.
pub struct ShapeProps {
    /// Outline.
    pub shape: ShapeKind,
    /// Fill color.
    pub fill: Fill,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Kind-specific layer content.
pub enum LayerPayload {
    /// Text content.
    Text(TextProps),
    /// Image content.
    Image(ImageProps),
    /// Rotator content.
    Rotator(RotatorProps),
    /// Bar content.
    Bar(BarProps),
    /// Shape content.
    Shape(ShapeProps),
}

impl LayerPayload {
    /// Kind this payload belongs to.
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Text(_) => LayerKind::Text,
            Self::Image(_) => LayerKind::Image,
            Self::Rotator(_) => LayerKind::Rotator,
            Self::Bar(_) => LayerKind::Bar,
            Self::Shape(_) => LayerKind::Shape,
        }
    }

    /// Referenced raster file, for Image and Rotator payloads.
    pub fn image_source(&self) -> Option<&std::path::Path> {
        match self {
            Self::Image(p) => Some(&p.source),
            Self::Rotator(p) => Some(&p.source),
            Self::Text(_) | Self::Bar(_) | Self::Shape(_) => None,
        }
    }
}

/// One design element held by the store.
#[derive(Clone, Debug)]
pub struct Layer {
    /// Immutable identifier.
    pub id: LayerId,
    /// Unique name, also the meter section name.
    pub name: String,
    /// Selected measure identifier.
    pub measure: Option<String>,
    /// Kind-specific content.
    pub payload: LayerPayload,
    /// Back-link to the surface object owning the geometry.
    pub visual: VisualId,
    /// Editor-only visibility flag.
    pub visible: bool,
    /// Editor-only lock flag.
    pub locked: bool,
}

impl Layer {
    /// Kind of this layer.
    pub fn kind(&self) -> LayerKind {
        self.payload.kind()
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// The virtual canvas the skin is anchored to.
pub struct SkinBackground {
    /// Top-left corner on the working surface.
    pub position: Point,
    /// Canvas width.
    pub width: f64,
    /// Canvas height.
    pub height: f64,
    /// Editor-only backdrop color; never exported.
    #[serde(default = "default_backdrop")]
    pub backdrop_color: String,
}

fn default_backdrop() -> String {
    "#FFFFFF".to_string()
}

impl Default for SkinBackground {
    fn default() -> Self {
        Self {
            position: Point::new(400.0, 200.0),
            width: 400.0,
            height: 300.0,
            backdrop_color: default_backdrop(),
        }
    }
}

impl SkinBackground {
    /// Canvas size.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A layer with its geometry resolved, as consumed by the compiler.
pub struct LayerSnapshot {
    /// Identifier; irrelevant for hand-written designs.
    #[serde(default = "unassigned_id")]
    pub id: LayerId,
    /// Meter section name.
    pub name: String,
    /// Selected measure identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,
    /// Kind-specific content.
    pub payload: LayerPayload,
    /// Geometry read from the surface at snapshot time.
    pub geometry: Geometry,
    /// Editor-only visibility flag.
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    /// Editor-only lock flag.
    #[serde(default)]
    pub locked: bool,
}

fn unassigned_id() -> LayerId {
    LayerId(0)
}

fn visible_by_default() -> bool {
    true
}

impl LayerSnapshot {
    /// Kind of this layer.
    pub fn kind(&self) -> LayerKind {
        self.payload.kind()
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Ordered layers plus the background, bottom layer first.
pub struct SkinSnapshot {
    /// Skin canvas.
    pub background: SkinBackground,
    /// Layers in stacking and emission order.
    pub layers: Vec<LayerSnapshot>,
}

#[cfg(test)]
#[path = "../../tests/unit/layer/model.rs"]
mod tests;
