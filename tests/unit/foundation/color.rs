use super::*;

#[test]
fn red_at_half_opacity_rounds_to_nearest_byte() {
    assert_eq!(hex_to_rgb("#FF0000", 0.5), "255,0,0,128");
}

#[test]
fn accepts_lowercase_and_missing_hash() {
    assert_eq!(hex_to_rgb("ffa500", 1.0), "255,165,0,255");
}

#[test]
fn expands_short_form() {
    assert_eq!(hex_to_rgb("#0F0", 0.0), "0,255,0,0");
}

#[test]
fn malformed_color_falls_back_to_opaque_black() {
    assert_eq!(hex_to_rgb("black", 0.3), OPAQUE_BLACK);
    assert_eq!(hex_to_rgb("#12345", 1.0), OPAQUE_BLACK);
    assert_eq!(hex_to_rgb("", 1.0), OPAQUE_BLACK);
}

#[test]
fn non_finite_opacity_falls_back_to_opaque_black() {
    assert_eq!(hex_to_rgb("#FFFFFF", f64::NAN), OPAQUE_BLACK);
}

#[test]
fn opacity_is_clamped() {
    assert_eq!(hex_to_rgb("#010203", 4.0), "1,2,3,255");
    assert_eq!(hex_to_rgb("#010203", -1.0), "1,2,3,0");
}
