use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SkinError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(SkinError::measure("x").to_string().contains("measure error:"));
    assert!(SkinError::export("x").to_string().contains("export error:"));
    assert!(
        SkinError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn asset_error_names_the_path() {
    let err = SkinError::asset("/tmp/needle.png", "copy failed");
    let msg = err.to_string();
    assert!(msg.contains("/tmp/needle.png"));
    assert!(msg.contains("copy failed"));
}

#[test]
fn unknown_layer_shows_id() {
    let err = SkinError::UnknownLayer(LayerId(7));
    assert_eq!(err.to_string(), "unknown layer layer_7");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SkinError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
