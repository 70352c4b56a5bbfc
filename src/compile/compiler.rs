use std::{
    collections::HashSet,
    path::{Component, Path},
};

use crate::{
    assets::{
        fonts::FontCache,
        resolver::{AssetPlan, image_ref},
    },
    compile::{
        font_face::decompose_font_name,
        ini::{MeasureDecl, MeterDecl, MeterType, Section, SkinDocument, encode_line_breaks},
    },
    foundation::{
        core::{Point, format_number},
        error::{SkinError, SkinResult},
    },
    geometry::normalize::{deg_to_rad, rebase, rotated_bounds},
    layer::model::{
        BarProps, LayerKind, LayerPayload, LayerSnapshot, RotatorProps, ShapeKind, ShapeProps,
        SkinSnapshot, TextProps,
    },
    measure::table::{self, CUSTOM_TEXT, MeasureEntry},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Fixed values baked into every compiled skin.
pub struct CompilerSettings {
    /// Engine update interval in milliseconds.
    pub update_ms: u32,
    /// Divisor applied to editor font sizes.
    pub font_scale_correction: f64,
    /// Scale step per mouse-wheel notch.
    pub scroll_increment: f64,
    /// Smallest scale reachable by scrolling.
    pub min_scale: f64,
    /// Skin folder name used when the metadata name is empty.
    pub default_skin_name: String,
    /// Name of the written skin file.
    pub skin_file_name: String,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            update_ms: 1000,
            font_scale_correction: 1.33,
            scroll_increment: 0.05,
            min_scale: 0.2,
            default_skin_name: "rmEditorSkin".to_string(),
            skin_file_name: "skin.ini".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Per-export switches.
pub struct ExportOptions {
    /// Emit mouse-wheel actions that adjust and persist `Scale`.
    #[serde(default)]
    pub allow_scroll_resize: bool,
    /// Compiler constants.
    #[serde(default)]
    pub settings: CompilerSettings,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// `[Metadata]` fields.
pub struct SkinMetadata {
    /// Skin name; also the output folder name when non-empty.
    pub name: String,
    /// Author.
    pub author: String,
    /// Version string.
    pub version: String,
    /// Free-form description.
    pub description: String,
}

impl SkinMetadata {
    /// Output folder name.
    pub fn skin_dir_name<'a>(&'a self, settings: &'a CompilerSettings) -> &'a str {
        if self.name.is_empty() {
            &settings.default_skin_name
        } else {
            &self.name
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Compiler output.
pub struct CompiledSkin {
    /// Skin file contents.
    pub text: String,
    /// Assets the text refers to.
    pub assets: AssetPlan,
    /// Names of layers that produced no declarations.
    pub skipped_layers: Vec<String>,
}

/// `(<v> * #Scale#)`.
fn scaled(v: f64) -> String {
    format!("({} * #Scale#)", format_number(v))
}

fn opt(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_string(), value.into())
}

fn measure_section_name(layer_name: &str) -> String {
    format!("Measure{layer_name}")
}

/// Compile a snapshot into skin text plus the assets it references.
///
/// Output depends only on the inputs, so compiling the same snapshot twice gives identical
/// text.
#[tracing::instrument(skip_all, fields(layers = snapshot.layers.len()))]
pub fn compile(
    snapshot: &SkinSnapshot,
    metadata: &SkinMetadata,
    options: &ExportOptions,
    fonts: &FontCache,
) -> SkinResult<CompiledSkin> {
    let settings = &options.settings;
    validate(snapshot, metadata, settings)?;

    let mut emitted = Vec::new();
    let mut skipped_layers = Vec::new();
    for layer in &snapshot.layers {
        if emits(layer) {
            emitted.push(layer);
        } else {
            tracing::warn!(
                layer = %layer.name,
                measure = layer.measure.as_deref().unwrap_or(""),
                "no usable measure; layer skipped"
            );
            skipped_layers.push(layer.name.clone());
        }
    }
    let assets = AssetPlan::collect(emitted.iter().copied(), fonts);

    let mut doc = SkinDocument::new(header(snapshot, metadata, options));
    let origin = snapshot.background.position;
    for layer in emitted {
        let ctx = LayerContext {
            layer,
            origin,
            settings,
            assets: &assets,
        };
        ctx.emit(&mut doc)?;
    }

    Ok(CompiledSkin {
        text: doc.render(),
        assets,
        skipped_layers,
    })
}

fn validate(
    snapshot: &SkinSnapshot,
    metadata: &SkinMetadata,
    settings: &CompilerSettings,
) -> SkinResult<()> {
    let bg = &snapshot.background;
    if !(bg.width.is_finite() && bg.height.is_finite()) || bg.width < 0.0 || bg.height < 0.0 {
        return Err(SkinError::validation(
            "background width/height must be finite and >= 0",
        ));
    }
    for (field, value) in [
        ("name", &metadata.name),
        ("author", &metadata.author),
        ("version", &metadata.version),
        ("description", &metadata.description),
    ] {
        if value.contains(['\n', '\r']) {
            return Err(SkinError::validation(format!(
                "metadata {field} must be a single line"
            )));
        }
    }
    let skin_name = metadata.skin_dir_name(settings);
    let mut parts = Path::new(skin_name).components();
    if !matches!(
        (parts.next(), parts.next()),
        (Some(Component::Normal(_)), None)
    ) {
        return Err(SkinError::validation(format!(
            "skin name '{skin_name}' must be a single directory name"
        )));
    }

    let mut names = HashSet::new();
    for layer in &snapshot.layers {
        if layer.name.is_empty() || layer.name.contains(['[', ']', '\n', '\r']) {
            return Err(SkinError::validation(format!(
                "layer name '{}' cannot be used as a section name",
                layer.name
            )));
        }
        if let LayerPayload::Text(props) = &layer.payload
            && props.font_name.contains(['\n', '\r'])
        {
            return Err(SkinError::validation(format!(
                "font name of layer '{}' must be a single line",
                layer.name
            )));
        }
        if !names.insert(layer.name.as_str()) {
            return Err(SkinError::validation(format!(
                "duplicate layer name '{}'",
                layer.name
            )));
        }
    }
    Ok(())
}

fn resolve(layer: &LayerSnapshot) -> Option<&'static MeasureEntry> {
    let entry = table::lookup(layer.measure.as_deref()?)?;
    (entry.kind == layer.kind()).then_some(entry)
}

/// Whether a layer produces any declaration. Text falls back to its literal content; Rotator
/// and Bar layers need a measure.
fn emits(layer: &LayerSnapshot) -> bool {
    match layer.kind() {
        LayerKind::Text | LayerKind::Image | LayerKind::Shape => true,
        LayerKind::Rotator | LayerKind::Bar => resolve(layer).is_some(),
    }
}

fn header(snapshot: &SkinSnapshot, metadata: &SkinMetadata, options: &ExportOptions) -> Vec<Section> {
    let s = &options.settings;
    let skin_size = snapshot.background.size();

    let meta = Section::new("Metadata")
        .entry("Name", &metadata.name)
        .entry("Author", &metadata.author)
        .entry("Version", &metadata.version)
        .entry("Description", &metadata.description);

    let mut rainmeter = Section::new("Rainmeter")
        .entry("Update", s.update_ms.to_string())
        .entry("BackgroundMode", "2")
        .entry("SolidColor", "0,0,0,1")
        .entry("SkinWidth", scaled(skin_size.width))
        .entry("SkinHeight", scaled(skin_size.height))
        .entry("AccurateText", "1");
    if options.allow_scroll_resize {
        let min = format_number(s.min_scale);
        let up = "(#Scale#+#ScrollMouseIncrement#)".to_string();
        let down = format!(
            "(#Scale#-#ScrollMouseIncrement# < {min} ? {min} : #Scale#-#ScrollMouseIncrement#)"
        );
        rainmeter = rainmeter
            .entry("MouseScrollUpAction", scale_action(&up))
            .entry("MouseScrollDownAction", scale_action(&down));
    }

    let variables = Section::new("Variables")
        .entry("Scale", "1.0")
        .entry("ScrollMouseIncrement", format_number(s.scroll_increment));

    vec![meta, rainmeter, variables]
}

fn scale_action(formula: &str) -> String {
    format!(
        "[!SetVariable Scale \"{formula}\"][!WriteKeyValue Variables Scale \"{formula}\"][!Refresh]"
    )
}

struct LayerContext<'a> {
    layer: &'a LayerSnapshot,
    origin: Point,
    settings: &'a CompilerSettings,
    assets: &'a AssetPlan,
}

impl LayerContext<'_> {
    fn emit(&self, doc: &mut SkinDocument) -> SkinResult<()> {
        tracing::debug!(layer = %self.layer.name, kind = ?self.layer.kind(), "emitting layer");
        match &self.layer.payload {
            LayerPayload::Text(p) => self.text(doc, p),
            LayerPayload::Image(p) => self.image(doc, &p.source),
            LayerPayload::Rotator(p) => self.rotator(doc, p),
            LayerPayload::Bar(p) => self.bar(doc, p),
            LayerPayload::Shape(p) => self.shape(doc, p),
        }
    }

    fn relative(&self) -> Point {
        rebase(self.layer.geometry.position, self.origin)
    }

    /// Push the entry's declarations and return the primary declaration name.
    fn push_measures(&self, doc: &mut SkinDocument, entry: &MeasureEntry) -> SkinResult<String> {
        let base = measure_section_name(&self.layer.name);
        let mut primary = None;
        for decl in &entry.recipe.declarations {
            let name = decl.name_for(&base);
            if decl.is_primary() {
                primary = Some(name.clone());
            }
            doc.push_measure(MeasureDecl {
                name,
                kind: decl.kind,
                options: decl.options_for(&base),
            })?;
        }
        primary.ok_or_else(|| {
            SkinError::validation(format!("measure '{}' has no primary declaration", entry.id))
        })
    }

    fn meter(
        &self,
        doc: &mut SkinDocument,
        meter: MeterType,
        measure: Option<String>,
        options: Vec<(String, String)>,
    ) -> SkinResult<()> {
        doc.push_meter(MeterDecl {
            name: self.layer.name.clone(),
            meter,
            measure_names: measure.into_iter().collect(),
            options,
        })
    }

    fn image_name(&self, source: &std::path::Path) -> SkinResult<String> {
        self.assets
            .image_index(source)
            .map(image_ref)
            .ok_or_else(|| SkinError::asset(source, "image missing from the asset plan"))
    }

    fn text(&self, doc: &mut SkinDocument, props: &TextProps) -> SkinResult<()> {
        let entry = resolve(self.layer);
        if entry.is_none()
            && let Some(m) = self.layer.measure.as_deref()
            && m != CUSTOM_TEXT
        {
            tracing::warn!(layer = %self.layer.name, measure = m, "unknown measure; emitting literal text");
        }

        let (measure, content) = match entry {
            Some(e) => (
                Some(self.push_measures(doc, e)?),
                e.recipe.value_template.clone(),
            ),
            None => (None, encode_line_breaks(&props.text).into_owned()),
        };

        let (face, style) = decompose_font_name(&props.font_name);
        let face = if face.is_empty() {
            props.font_name.clone()
        } else {
            face
        };
        let pos = self.relative();
        let options = vec![
            opt("FontFace", face),
            opt(
                "FontSize",
                scaled(props.font_size / self.settings.font_scale_correction),
            ),
            opt("FontColor", props.fill.to_rgba_string()),
            opt("StringStyle", style.as_str()),
            opt("X", scaled(pos.x)),
            opt("Y", scaled(pos.y)),
            opt("Angle", format_number(deg_to_rad(self.layer.geometry.angle_deg))),
            opt("AntiAlias", "1"),
            opt("Text", content),
        ];
        self.meter(doc, MeterType::String, measure, options)
    }

    fn image(&self, doc: &mut SkinDocument, source: &std::path::Path) -> SkinResult<()> {
        let g = &self.layer.geometry;
        let box_size = g.scaled_size();
        let bounds = rotated_bounds(box_size.width, box_size.height, g.angle_deg).size();
        let center = self.relative();
        let options = vec![
            opt("ImageName", self.image_name(source)?),
            opt("W", scaled(bounds.width)),
            opt("H", scaled(bounds.height)),
            opt("X", scaled(center.x - bounds.width / 2.0)),
            opt("Y", scaled(center.y - bounds.height / 2.0)),
            opt("ImageRotate", format_number(g.angle_deg)),
        ];
        self.meter(doc, MeterType::Image, None, options)
    }

    fn rotator(&self, doc: &mut SkinDocument, props: &RotatorProps) -> SkinResult<()> {
        let Some(entry) = resolve(self.layer) else {
            return Ok(());
        };
        let image_name = self.image_name(&props.source)?;
        let measure = self.push_measures(doc, entry)?;

        let size = self.layer.geometry.scaled_size();
        let (half_w, half_h) = (size.width / 2.0, size.height / 2.0);
        let center = self.relative();
        let mut options = vec![
            opt("ImageName", image_name),
            opt("W", scaled(size.width)),
            opt("H", scaled(size.height)),
            opt("X", scaled(center.x - half_w)),
            opt("Y", scaled(center.y - half_h)),
            opt("StartAngle", format_number(deg_to_rad(props.start_angle))),
            opt(
                "RotationAngle",
                format_number(deg_to_rad(props.rotation_angle)),
            ),
            opt("OffsetX", scaled(props.offset_x + half_w)),
            opt("OffsetY", scaled(props.offset_y + half_h)),
        ];
        if let Some(r) = entry.recipe.value_remainder {
            options.push(opt("ValueRemainder", r.to_string()));
        }
        self.meter(doc, MeterType::Rotator, Some(measure), options)
    }

    fn bar(&self, doc: &mut SkinDocument, props: &BarProps) -> SkinResult<()> {
        let Some(entry) = resolve(self.layer) else {
            return Ok(());
        };
        let measure = self.push_measures(doc, entry)?;
        let pos = self.relative();
        let size = self.layer.geometry.scaled_size();
        let options = vec![
            opt("X", scaled(pos.x)),
            opt("Y", scaled(pos.y)),
            opt("W", scaled(size.width)),
            opt("H", scaled(size.height)),
            opt("BarOrientation", "Horizontal"),
            opt("BarColor", props.background.to_rgba_string()),
            opt("SolidColor", props.foreground.to_rgba_string()),
        ];
        self.meter(doc, MeterType::Bar, Some(measure), options)
    }

    fn shape(&self, doc: &mut SkinDocument, props: &ShapeProps) -> SkinResult<()> {
        let g = &self.layer.geometry;
        let size = g.scaled_size();
        let (w, h) = (size.width, size.height);
        let pos = self.relative();

        let mut options = vec![opt("X", scaled(pos.x)), opt("Y", scaled(pos.y))];
        let outline = match props.shape {
            ShapeKind::Rectangle => format!("Rectangle 0,0,{},{}", scaled(w), scaled(h)),
            ShapeKind::Ellipse => {
                let (rx, ry) = (scaled(w / 2.0), scaled(h / 2.0));
                format!("Ellipse {rx},{ry},{rx},{ry}")
            }
            ShapeKind::Triangle => "Path TrianglePath".to_string(),
        };
        let mut shape = format!(
            "{outline} | Fill Color {} | StrokeWidth 0",
            props.fill.to_rgba_string()
        );
        if g.angle_deg != 0.0 {
            shape.push_str(&format!(" | Rotate {}", format_number(g.angle_deg)));
        }
        options.push(opt("Shape", shape));
        if props.shape == ShapeKind::Triangle {
            options.push(opt(
                "TrianglePath",
                format!(
                    "{},0 | LineTo {},{} | LineTo 0,{} | ClosePath 1",
                    scaled(w / 2.0),
                    scaled(w),
                    scaled(h),
                    scaled(h)
                ),
            ));
        }
        self.meter(doc, MeterType::Shape, None, options)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/compiler.rs"]
mod tests;
