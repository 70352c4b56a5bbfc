use std::path::{Path, PathBuf};

use anyhow::Context;
use rayon::prelude::*;

use crate::{
    assets::fonts::FontCache,
    foundation::error::{SkinError, SkinResult},
    layer::model::{LayerPayload, LayerSnapshot},
};

/// Resource subfolder holding copied fonts.
pub const FONTS_DIR: &str = "Fonts";
/// Resource subfolder holding copied images.
pub const IMAGES_DIR: &str = "Images";

/// Image identifier a meter uses for the image at `index`.
pub fn image_ref(index: usize) -> String {
    format!("#@#{IMAGES_DIR}/{index}.png")
}

/// File name an image at `index` is copied to.
pub fn image_file_name(index: usize) -> String {
    format!("{index}.png")
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
/// Deduplicated assets referenced by a set of layers.
pub struct AssetPlan {
    /// Font file names, first-seen order, no duplicates.
    pub fonts: Vec<String>,
    /// Image sources, first-seen order, no duplicates. The position is the image index.
    pub images: Vec<PathBuf>,
}

impl AssetPlan {
    /// Collect the fonts of Text layers that resolve in `fonts` and the sources of Image and
    /// Rotator layers.
    pub fn collect<'a>(
        layers: impl IntoIterator<Item = &'a LayerSnapshot>,
        fonts: &FontCache,
    ) -> Self {
        let mut plan = Self::default();
        for layer in layers {
            if let LayerPayload::Text(props) = &layer.payload
                && let Some(entry) = fonts.find(&props.font_name)
            {
                plan.add_font(&entry.file_name);
            }
            if let Some(source) = layer.payload.image_source() {
                plan.add_image(source);
            }
        }
        plan
    }

    fn add_font(&mut self, file_name: &str) {
        if !self.fonts.iter().any(|f| f == file_name) {
            self.fonts.push(file_name.to_string());
        }
    }

    fn add_image(&mut self, source: &Path) {
        if self.image_index(source).is_none() {
            self.images.push(source.to_path_buf());
        }
    }

    /// Index assigned to `source`.
    pub fn image_index(&self, source: &Path) -> Option<usize> {
        self.images.iter().position(|p| p == source)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
/// Outcome of the copy phase.
pub struct AssetCopyReport {
    /// Fonts copied into the font folder.
    pub fonts_copied: Vec<String>,
    /// Fonts absent from the font directory.
    pub fonts_skipped: Vec<String>,
    /// Destination of each copied image, by index.
    pub images_copied: Vec<PathBuf>,
}

enum FontOutcome {
    Copied(String),
    Skipped(String),
}

/// Copy every planned asset under `resources_dir` (`Fonts/` and `Images/` must exist).
///
/// All copies run to completion before this returns. Fonts missing from the font directory
/// are skipped; any other failure is reported as [`SkinError::Asset`] for the first failing
/// asset in plan order.
#[tracing::instrument(skip(plan, fonts))]
pub fn copy_assets(
    plan: &AssetPlan,
    fonts: &FontCache,
    resources_dir: &Path,
) -> SkinResult<AssetCopyReport> {
    let fonts_dir = resources_dir.join(FONTS_DIR);
    let images_dir = resources_dir.join(IMAGES_DIR);

    let font_results: Vec<SkinResult<FontOutcome>> = plan
        .fonts
        .par_iter()
        .map(|file_name| {
            let src = fonts.source_path(file_name);
            if !src.is_file() {
                tracing::warn!(font = %file_name, "font file missing; skipped");
                return Ok(FontOutcome::Skipped(file_name.clone()));
            }
            copy_file(&src, &fonts_dir.join(file_name))?;
            Ok(FontOutcome::Copied(file_name.clone()))
        })
        .collect();

    let image_results: Vec<SkinResult<PathBuf>> = plan
        .images
        .par_iter()
        .enumerate()
        .map(|(i, src)| {
            let dst = images_dir.join(image_file_name(i));
            copy_file(src, &dst)?;
            Ok(dst)
        })
        .collect();

    let mut report = AssetCopyReport::default();
    for r in font_results {
        match r? {
            FontOutcome::Copied(f) => report.fonts_copied.push(f),
            FontOutcome::Skipped(f) => report.fonts_skipped.push(f),
        }
    }
    for r in image_results {
        report.images_copied.push(r?);
    }
    tracing::debug!(
        fonts = report.fonts_copied.len(),
        skipped = report.fonts_skipped.len(),
        images = report.images_copied.len(),
        "assets copied"
    );
    Ok(report)
}

fn copy_file(src: &Path, dst: &Path) -> SkinResult<()> {
    std::fs::copy(src, dst)
        .with_context(|| format!("copy to '{}'", dst.display()))
        .map_err(|e| SkinError::asset(src, format!("{e:#}")))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolver.rs"]
mod tests;
