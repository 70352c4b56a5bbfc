use super::*;
use crate::{
    assets::fonts::FontEntry,
    foundation::core::{Fill, Geometry, LayerId, Point, Size},
    layer::model::{ImageProps, LayerPayload, LayerSnapshot, SkinBackground, TextProps},
};

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "skinforge_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &Path) {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(path, bytes).unwrap();
}

fn snapshot(layers: Vec<LayerSnapshot>) -> SkinSnapshot {
    SkinSnapshot {
        background: SkinBackground {
            position: Point::ZERO,
            ..SkinBackground::default()
        },
        layers,
    }
}

fn text_layer(name: &str, font: &str) -> LayerSnapshot {
    LayerSnapshot {
        id: LayerId(0),
        name: name.to_string(),
        measure: Some("time-second".to_string()),
        payload: LayerPayload::Text(TextProps {
            text: "45".to_string(),
            font_name: font.to_string(),
            font_size: 24.0,
            fill: Fill::solid("#000000"),
        }),
        geometry: Geometry::new(Point::new(10.0, 10.0), Size::new(30.0, 27.0)),
        visible: true,
        locked: false,
    }
}

fn image_layer(name: &str, source: &Path) -> LayerSnapshot {
    LayerSnapshot {
        id: LayerId(0),
        name: name.to_string(),
        measure: None,
        payload: LayerPayload::Image(ImageProps {
            source: source.to_path_buf(),
        }),
        geometry: Geometry::new(Point::new(50.0, 50.0), Size::new(4.0, 4.0)),
        visible: true,
        locked: false,
    }
}

fn metadata(name: &str) -> SkinMetadata {
    SkinMetadata {
        name: name.to_string(),
        ..SkinMetadata::default()
    }
}

#[test]
fn writes_layout_assets_and_skin_file() {
    let work = temp_dir("export_layout");
    let fonts_dir = work.join("fonts");
    std::fs::create_dir_all(&fonts_dir).unwrap();
    std::fs::write(fonts_dir.join("Roboto-Bold.ttf"), b"font").unwrap();
    let png = work.join("logo.png");
    write_png(&png);

    let fonts = FontCache::from_entries(
        &fonts_dir,
        vec![
            FontEntry {
                display_name: "Roboto Bold".to_string(),
                file_name: "Roboto-Bold.ttf".to_string(),
            },
            FontEntry {
                display_name: "Ghost".to_string(),
                file_name: "Ghost.ttf".to_string(),
            },
        ],
    );
    let out = work.join("out");
    std::fs::create_dir_all(&out).unwrap();

    let report = export_skin(
        &out,
        &snapshot(vec![
            text_layer("Text1", "Roboto Bold"),
            text_layer("Text2", "Ghost"),
            image_layer("Image1", &png),
            image_layer("Image2", &png),
        ]),
        &metadata("Clock"),
        &ExportOptions::default(),
        &fonts,
    )
    .unwrap();

    assert_eq!(report.skin_dir, out.join("Clock"));
    assert_eq!(report.ini_path, out.join("Clock").join("skin.ini"));
    assert_eq!(report.fonts_copied, vec!["Roboto-Bold.ttf"]);
    assert_eq!(report.fonts_skipped, vec!["Ghost.ttf"]);
    assert_eq!(report.images_copied.len(), 1);

    let resources = out.join("Clock").join("@Resources");
    assert_eq!(
        std::fs::read(resources.join("Fonts").join("Roboto-Bold.ttf")).unwrap(),
        b"font"
    );
    assert_eq!(
        std::fs::read(resources.join("Images").join("0.png")).unwrap(),
        std::fs::read(&png).unwrap()
    );

    let ini = std::fs::read_to_string(&report.ini_path).unwrap();
    assert!(ini.starts_with("[Metadata]\nName=Clock\n"));
    assert!(ini.contains("[MeasureText1]\nMeasure=Time\nFormat=%S\n"));
    assert_eq!(ini.matches("ImageName=#@#Images/0.png").count(), 2);

    let _ = std::fs::remove_dir_all(&work);
}

#[test]
fn empty_name_uses_default_folder() {
    let out = temp_dir("export_default");
    let report = export_skin(
        &out,
        &snapshot(Vec::new()),
        &SkinMetadata::default(),
        &ExportOptions::default(),
        &FontCache::default(),
    )
    .unwrap();
    assert_eq!(report.skin_dir, out.join("rmEditorSkin"));
    assert!(report.ini_path.is_file());
    assert!(out.join("rmEditorSkin/@Resources/Fonts").is_dir());
    assert!(out.join("rmEditorSkin/@Resources/Images").is_dir());
    let _ = std::fs::remove_dir_all(&out);
}

#[test]
fn existing_skin_directory_aborts() {
    let out = temp_dir("export_exists");
    std::fs::create_dir_all(out.join("Clock")).unwrap();
    let err = export_skin(
        &out,
        &snapshot(Vec::new()),
        &metadata("Clock"),
        &ExportOptions::default(),
        &FontCache::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SkinError::Export(_)));
    assert!(!out.join("Clock").join("skin.ini").exists());
    let _ = std::fs::remove_dir_all(&out);
}

#[test]
fn missing_image_fails_without_skin_file() {
    let out = temp_dir("export_missing_image");
    let err = export_skin(
        &out,
        &snapshot(vec![image_layer("Image1", &out.join("nope.png"))]),
        &metadata("Broken"),
        &ExportOptions::default(),
        &FontCache::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SkinError::Asset { .. }));
    assert!(out.join("Broken").join("@Resources").is_dir());
    assert!(!out.join("Broken").join("skin.ini").exists());
    let _ = std::fs::remove_dir_all(&out);
}

#[test]
fn invalid_snapshot_creates_nothing() {
    let out = temp_dir("export_invalid");
    let result = export_skin(
        &out,
        &snapshot(vec![text_layer("Dup", "Arial"), text_layer("Dup", "Arial")]),
        &metadata("Dup"),
        &ExportOptions::default(),
        &FontCache::default(),
    );
    assert!(matches!(result, Err(SkinError::Validation(_))));
    assert!(!out.join("Dup").exists());
    let _ = std::fs::remove_dir_all(&out);
}

#[test]
fn skin_name_cannot_leave_the_root() {
    let work = temp_dir("export_escape");
    let root = work.join("root");
    std::fs::create_dir_all(&root).unwrap();
    let outside = work.join("outside").join("Escaped");

    let err = export_skin(
        &root,
        &snapshot(vec![text_layer("Text1", "Arial")]),
        &metadata(outside.to_str().unwrap()),
        &ExportOptions::default(),
        &FontCache::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SkinError::Validation(_)));
    assert!(!outside.exists());

    let err = export_skin(
        &root,
        &snapshot(Vec::new()),
        &metadata("../Sibling"),
        &ExportOptions::default(),
        &FontCache::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SkinError::Validation(_)));
    assert!(!work.join("Sibling").exists());
    assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);

    let _ = std::fs::remove_dir_all(&work);
}
