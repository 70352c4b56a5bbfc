//! Output document model and its line-oriented renderer.
//!
//! A document is a fixed header (metadata, engine directives, variables) followed by every
//! measure declaration and then every meter declaration. Each section is `[Name]`, its
//! `Key=Value` lines, and one blank line.

use std::{borrow::Cow, fmt};

use crate::{
    foundation::error::{SkinError, SkinResult},
    measure::table::MeasureType,
};

/// Engine variable that renders as a line break inside a value.
pub const LINE_BREAK: &str = "#CRLF#";

/// Replace every `\r\n`, `\n` and `\r` in `value` with [`LINE_BREAK`].
pub fn encode_line_breaks(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r']) {
        Cow::Owned(
            value
                .replace("\r\n", LINE_BREAK)
                .replace(['\n', '\r'], LINE_BREAK),
        )
    } else {
        Cow::Borrowed(value)
    }
}

fn single_line<'a>(what: &str, values: impl IntoIterator<Item = &'a str>) -> SkinResult<()> {
    match values.into_iter().find(|v| v.contains(['\n', '\r'])) {
        Some(v) => Err(SkinError::validation(format!(
            "{what} '{}' spans several lines",
            v.escape_debug()
        ))),
        None => Ok(()),
    }
}

/// Most measures a single meter can reference.
pub const MAX_MEASURE_NAMES: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
/// A `[Name]` block with ordered entries.
pub struct Section {
    /// Section name, without brackets.
    pub name: String,
    /// `Key=Value` entries in emission order.
    pub entries: Vec<(String, String)>,
}

impl Section {
    /// Empty section.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Append one entry.
    pub fn entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}]", self.name)?;
        for (k, v) in &self.entries {
            writeln!(f, "{k}={}", encode_line_breaks(v))?;
        }
        writeln!(f)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A data-source declaration.
pub struct MeasureDecl {
    /// Section name, `Measure<LayerName><suffix>`.
    pub name: String,
    /// Declaration type.
    pub kind: MeasureType,
    /// Type options.
    pub options: Vec<(String, String)>,
}

impl MeasureDecl {
    /// Section form: `Measure=<Type>` followed by the options.
    pub fn to_section(&self) -> Section {
        let mut section = Section::new(&self.name).entry("Measure", self.kind.keyword());
        section.entries.extend(self.options.iter().cloned());
        section
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Visual element types.
pub enum MeterType {
    /// Text.
    String,
    /// Static image.
    Image,
    /// Rotating image.
    Rotator,
    /// Proportional bar.
    Bar,
    /// Vector shape.
    Shape,
}

impl MeterType {
    /// Keyword written after `Meter=`.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Image => "Image",
            Self::Rotator => "Rotator",
            Self::Bar => "Bar",
            Self::Shape => "Shape",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A visual-element declaration.
pub struct MeterDecl {
    /// Section name, the layer name.
    pub name: String,
    /// Meter type.
    pub meter: MeterType,
    /// Referenced measures, at most [`MAX_MEASURE_NAMES`].
    pub measure_names: Vec<String>,
    /// Type options.
    pub options: Vec<(String, String)>,
}

/// Key of the `index`-th (zero-based) measure reference.
pub fn measure_name_key(index: usize) -> String {
    if index == 0 {
        "MeasureName".to_string()
    } else {
        format!("MeasureName{}", index + 1)
    }
}

impl MeterDecl {
    /// Section form: `Meter=<Type>`, the measure references, then the options.
    pub fn to_section(&self) -> Section {
        let mut section = Section::new(&self.name).entry("Meter", self.meter.keyword());
        for (i, m) in self.measure_names.iter().enumerate() {
            section.entries.push((measure_name_key(i), m.clone()));
        }
        section.entries.extend(self.options.iter().cloned());
        section
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Complete output document.
pub struct SkinDocument {
    header: Vec<Section>,
    measures: Vec<MeasureDecl>,
    meters: Vec<MeterDecl>,
}

impl SkinDocument {
    /// Document starting with `header` sections.
    pub fn new(header: Vec<Section>) -> Self {
        Self {
            header,
            ..Self::default()
        }
    }

    /// Append a measure declaration.
    ///
    /// Names and option keys must be single lines; values are encoded when rendered.
    pub fn push_measure(&mut self, decl: MeasureDecl) -> SkinResult<()> {
        single_line("measure name", [decl.name.as_str()])?;
        single_line("option key", decl.options.iter().map(|(k, _)| k.as_str()))?;
        self.measures.push(decl);
        Ok(())
    }

    /// Append a meter declaration.
    pub fn push_meter(&mut self, decl: MeterDecl) -> SkinResult<()> {
        if decl.measure_names.len() > MAX_MEASURE_NAMES {
            return Err(SkinError::validation(format!(
                "meter '{}' references {} measures; at most {MAX_MEASURE_NAMES} are allowed",
                decl.name,
                decl.measure_names.len()
            )));
        }
        single_line("meter name", [decl.name.as_str()])?;
        single_line("measure name", decl.measure_names.iter().map(String::as_str))?;
        single_line("option key", decl.options.iter().map(|(k, _)| k.as_str()))?;
        self.meters.push(decl);
        Ok(())
    }

    /// Render to text.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SkinDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.header {
            write!(f, "{s}")?;
        }
        for m in &self.measures {
            write!(f, "{}", m.to_section())?;
        }
        for m in &self.meters {
            write!(f, "{}", m.to_section())?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/ini.rs"]
mod tests;
