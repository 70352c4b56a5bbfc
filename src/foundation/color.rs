//! Color/opacity encoding for the output format.

/// Encoding used whenever a color or opacity cannot be parsed.
pub const OPAQUE_BLACK: &str = "0,0,0,255";

/// Encode a hex color and an opacity as `R,G,B,A`, with `A = round(opacity * 255)`.
///
/// Accepts `#RRGGBB`, `#RGB` and the same forms without `#`. Anything else, including a
/// non-finite opacity, yields [`OPAQUE_BLACK`]. Opacity is clamped to `[0, 1]`.
pub fn hex_to_rgb(hex: &str, opacity: f64) -> String {
    let Some([r, g, b]) = parse_hex_rgb(hex) else {
        return OPAQUE_BLACK.to_string();
    };
    if !opacity.is_finite() {
        return OPAQUE_BLACK.to_string();
    }
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("{r},{g},{b},{alpha}")
}

/// Parse `#RRGGBB` / `#RGB` into channel bytes.
pub fn parse_hex_rgb(hex: &str) -> Option<[u8; 3]> {
    let s = hex.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    fn byte(pair: &str) -> Option<u8> {
        u8::from_str_radix(pair, 16).ok()
    }

    match s.len() {
        6 => Some([byte(&s[0..2])?, byte(&s[2..4])?, byte(&s[4..6])?]),
        3 => {
            let mut out = [0u8; 3];
            for (slot, c) in out.iter_mut().zip(s.chars()) {
                let nibble = c.to_digit(16)? as u8;
                *slot = nibble * 17;
            }
            Some(out)
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
