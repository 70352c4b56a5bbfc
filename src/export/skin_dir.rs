//! Writes a compiled skin to disk.
//!
//! Layout under the chosen root:
//!
//! ```text
//! <root>/<SkinName>/skin.ini
//! <root>/<SkinName>/@Resources/Fonts/<font files>
//! <root>/<SkinName>/@Resources/Images/<index>.png
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    assets::{
        fonts::FontCache,
        resolver::{FONTS_DIR, IMAGES_DIR, copy_assets},
    },
    compile::compiler::{ExportOptions, SkinMetadata, compile},
    foundation::error::{SkinError, SkinResult},
    layer::model::SkinSnapshot,
};

/// Resource folder name inside a skin directory.
pub const RESOURCES_DIR: &str = "@Resources";

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// What an export wrote.
pub struct ExportReport {
    /// Created skin directory.
    pub skin_dir: PathBuf,
    /// Written skin file.
    pub ini_path: PathBuf,
    /// Font files copied.
    pub fonts_copied: Vec<String>,
    /// Fonts referenced but absent from the font directory.
    pub fonts_skipped: Vec<String>,
    /// Image files written, by index.
    pub images_copied: Vec<PathBuf>,
    /// Layers that produced nothing.
    pub skipped_layers: Vec<String>,
}

/// Compile `snapshot` and write the skin directory under `root`.
///
/// The skin directory must not exist yet. Directories created before a failure are left in
/// place. The skin file is written only after every asset copy has finished.
#[tracing::instrument(skip(snapshot, metadata, options, fonts), fields(skin = metadata.name.as_str()))]
pub fn export_skin(
    root: &Path,
    snapshot: &SkinSnapshot,
    metadata: &SkinMetadata,
    options: &ExportOptions,
    fonts: &FontCache,
) -> SkinResult<ExportReport> {
    let compiled = compile(snapshot, metadata, options, fonts)?;

    let skin_dir = root.join(metadata.skin_dir_name(&options.settings));
    let resources = skin_dir.join(RESOURCES_DIR);
    create_dir(&skin_dir)?;
    create_dir(&resources)?;
    create_dir(&resources.join(FONTS_DIR))?;
    create_dir(&resources.join(IMAGES_DIR))?;

    let copied = copy_assets(&compiled.assets, fonts, &resources)?;

    let ini_path = skin_dir.join(&options.settings.skin_file_name);
    std::fs::write(&ini_path, compiled.text.as_bytes())
        .with_context(|| format!("write skin file '{}'", ini_path.display()))?;

    tracing::info!(path = %ini_path.display(), "skin exported");
    Ok(ExportReport {
        skin_dir,
        ini_path,
        fonts_copied: copied.fonts_copied,
        fonts_skipped: copied.fonts_skipped,
        images_copied: copied.images_copied,
        skipped_layers: compiled.skipped_layers,
    })
}

fn create_dir(path: &Path) -> SkinResult<()> {
    std::fs::create_dir(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
            SkinError::export(format!("'{}' already exists", path.display()))
        } else {
            SkinError::export(format!("create directory '{}': {e}", path.display()))
        }
    })
}

#[cfg(test)]
#[path = "../../tests/unit/export/skin_dir.rs"]
mod tests;
