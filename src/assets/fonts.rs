use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// One scanned font file.
pub struct FontEntry {
    /// Name shown in the font picker and stored on text layers, e.g. `Roboto Bold`.
    pub display_name: String,
    /// File name inside the font directory.
    pub file_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Read-only index of the fonts available for export.
pub struct FontCache {
    /// Directory the font files live in.
    pub dir: PathBuf,
    /// Entries in file-name order.
    pub entries: Vec<FontEntry>,
}

impl FontCache {
    /// Cache over explicit entries.
    pub fn from_entries(dir: impl Into<PathBuf>, entries: Vec<FontEntry>) -> Self {
        Self {
            dir: dir.into(),
            entries,
        }
    }

    /// Scan `dir` for `.ttf`/`.otf` files. Unreadable directories yield an empty cache and
    /// unparsable files are skipped.
    #[tracing::instrument]
    pub fn scan_dir(dir: &Path) -> Self {
        let mut cache = Self {
            dir: dir.to_path_buf(),
            entries: Vec::new(),
        };
        let Ok(rd) = std::fs::read_dir(dir) else {
            tracing::warn!("font directory is not readable");
            return cache;
        };

        let mut paths: Vec<PathBuf> = rd
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_font_file(p))
            .collect();
        paths.sort();

        for path in paths {
            let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            match display_name(&path) {
                Some(display_name) => cache.entries.push(FontEntry {
                    display_name,
                    file_name: file_name.to_string(),
                }),
                None => tracing::debug!(file = file_name, "no usable face in font file"),
            }
        }
        tracing::debug!(fonts = cache.entries.len(), "font directory scanned");
        cache
    }

    /// Entry whose display name equals `display_name`.
    pub fn find(&self, display_name: &str) -> Option<&FontEntry> {
        self.entries.iter().find(|e| e.display_name == display_name)
    }

    /// Full path of `file_name` inside the scanned directory.
    pub fn source_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ext == "ttf" || ext == "otf"
        })
        .unwrap_or(false)
}

/// Family name of the first face, suffixed with ` Bold` and/or ` Italic`.
fn display_name(path: &Path) -> Option<String> {
    let data = std::fs::read(path).ok()?;
    let mut db = usvg::fontdb::Database::new();
    db.load_font_data(data);
    let face = db.faces().next()?;
    let (family, _) = face.families.first()?;

    let mut name = family.clone();
    if face.weight.0 >= usvg::fontdb::Weight::BOLD.0 {
        name.push_str(" Bold");
    }
    if matches!(
        face.style,
        usvg::fontdb::Style::Italic | usvg::fontdb::Style::Oblique
    ) {
        name.push_str(" Italic");
    }
    Some(name)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
