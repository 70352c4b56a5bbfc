use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Text style written as `StringStyle`.
pub enum FontStyle {
    /// Upright, regular weight.
    #[default]
    Normal,
    /// Bold weight.
    Bold,
    /// Italic.
    Italic,
    /// Bold weight and italic.
    BoldItalic,
}

impl FontStyle {
    /// Option value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::BoldItalic => "bolditalic",
        }
    }

    fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => Self::Normal,
            (true, false) => Self::Bold,
            (false, true) => Self::Italic,
            (true, true) => Self::BoldItalic,
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a font display name into its face name and style.
///
/// Trailing ` Bold`, ` Italic` and ` Regular` suffixes are stripped repeatedly, in any order,
/// so `X Bold Italic` and `X Italic Bold` both give face `X` with [`FontStyle::BoldItalic`].
/// Suffixes in the middle of a name are part of the face.
pub fn decompose_font_name(name: &str) -> (String, FontStyle) {
    let mut face = name.trim_end();
    let (mut bold, mut italic) = (false, false);
    loop {
        if let Some(rest) = face.strip_suffix(" Bold") {
            bold = true;
            face = rest.trim_end();
        } else if let Some(rest) = face.strip_suffix(" Italic") {
            italic = true;
            face = rest.trim_end();
        } else if let Some(rest) = face.strip_suffix(" Regular") {
            face = rest.trim_end();
        } else {
            break;
        }
    }
    (face.to_string(), FontStyle::from_flags(bold, italic))
}

#[cfg(test)]
#[path = "../../tests/unit/compile/font_face.rs"]
mod tests;
