use std::{
    fs::File,
    io::{BufReader, Read, Write},
    path::Path,
};

use crate::{
    compile::compiler::{CompilerSettings, ExportOptions, SkinMetadata},
    foundation::error::{SkinError, SkinResult},
    layer::model::{LayerSnapshot, SkinBackground, SkinSnapshot},
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// A saved design: everything the compiler needs, as JSON.
///
/// ```json
/// {
///   "metadata": { "name": "Clock" },
///   "background": { "position": { "x": 0, "y": 0 }, "width": 400, "height": 300, "backdrop_color": "#FFFFFF" },
///   "layers": [ ... ],
///   "allow_scroll_resize": true
/// }
/// ```
pub struct DesignDocument {
    /// `[Metadata]` fields.
    #[serde(default)]
    pub metadata: SkinMetadata,
    /// Skin canvas.
    #[serde(default)]
    pub background: SkinBackground,
    /// Layers in emission order.
    #[serde(default)]
    pub layers: Vec<LayerSnapshot>,
    /// Mouse-wheel resizing.
    #[serde(default)]
    pub allow_scroll_resize: bool,
    /// Compiler constants.
    #[serde(default)]
    pub settings: CompilerSettings,
}

impl DesignDocument {
    /// Document describing a store snapshot.
    pub fn from_snapshot(
        snapshot: SkinSnapshot,
        metadata: SkinMetadata,
        options: ExportOptions,
    ) -> Self {
        Self {
            metadata,
            background: snapshot.background,
            layers: snapshot.layers,
            allow_scroll_resize: options.allow_scroll_resize,
            settings: options.settings,
        }
    }

    /// Parse a document from JSON.
    pub fn from_reader(r: impl Read) -> SkinResult<Self> {
        serde_json::from_reader(r).map_err(|e| SkinError::serde(e.to_string()))
    }

    /// Read and parse a JSON document at `path`.
    pub fn from_path(path: &Path) -> SkinResult<Self> {
        let f = File::open(path).map_err(|e| {
            SkinError::serde(format!("open design '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Write pretty-printed JSON.
    pub fn to_writer_pretty(&self, w: impl Write) -> SkinResult<()> {
        serde_json::to_writer_pretty(w, self).map_err(|e| SkinError::serde(e.to_string()))
    }

    /// Background and layers.
    pub fn snapshot(&self) -> SkinSnapshot {
        SkinSnapshot {
            background: self.background.clone(),
            layers: self.layers.clone(),
        }
    }

    /// Export switches.
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            allow_scroll_resize: self.allow_scroll_resize,
            settings: self.settings.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/design/document.rs"]
mod tests;
