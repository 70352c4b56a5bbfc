use super::*;
use crate::{
    assets::fonts::FontEntry,
    foundation::core::{Fill, Geometry, LayerId, Size, Vec2},
    layer::model::{ImageProps, SkinBackground},
};

fn background(x: f64, y: f64) -> SkinBackground {
    SkinBackground {
        position: Point::new(x, y),
        width: 400.0,
        height: 300.0,
        backdrop_color: "#FFFFFF".to_string(),
    }
}

fn snap(name: &str, measure: Option<&str>, payload: LayerPayload, g: Geometry) -> LayerSnapshot {
    LayerSnapshot {
        id: LayerId(0),
        name: name.to_string(),
        measure: measure.map(str::to_string),
        payload,
        geometry: g,
        visible: true,
        locked: false,
    }
}

fn text_payload(text: &str, font: &str) -> LayerPayload {
    LayerPayload::Text(TextProps {
        text: text.to_string(),
        font_name: font.to_string(),
        font_size: 24.0,
        fill: Fill::solid("#000000"),
    })
}

fn meta() -> SkinMetadata {
    SkinMetadata {
        name: "Clock".to_string(),
        author: "me".to_string(),
        version: "1.0".to_string(),
        description: "demo".to_string(),
    }
}

fn run(layers: Vec<LayerSnapshot>, bg: SkinBackground) -> CompiledSkin {
    let snapshot = SkinSnapshot {
        background: bg,
        layers,
    };
    compile(
        &snapshot,
        &meta(),
        &ExportOptions::default(),
        &FontCache::default(),
    )
    .unwrap()
}

const HEADER: &str = "[Metadata]\nName=Clock\nAuthor=me\nVersion=1.0\nDescription=demo\n\n\
[Rainmeter]\nUpdate=1000\nBackgroundMode=2\nSolidColor=0,0,0,1\n\
SkinWidth=(400 * #Scale#)\nSkinHeight=(300 * #Scale#)\nAccurateText=1\n\n\
[Variables]\nScale=1.0\nScrollMouseIncrement=0.05\n\n";

#[test]
fn clock_text_layer_compiles_exactly() {
    let layer = snap(
        "Text1",
        Some("time-hour-minute-24"),
        text_payload("15:15", "Times New Roman"),
        Geometry::new(Point::new(10.0, 10.0), Size::new(60.0, 27.0)),
    );
    let out = run(vec![layer], background(0.0, 0.0));

    let expected = format!(
        "{HEADER}[MeasureText1]\nMeasure=Time\nFormat=%H:%M\n\n\
         [Text1]\nMeter=String\nMeasureName=MeasureText1\nFontFace=Times New Roman\n\
         FontSize=(18.045112781954888 * #Scale#)\nFontColor=0,0,0,255\nStringStyle=normal\n\
         X=(10 * #Scale#)\nY=(10 * #Scale#)\nAngle=0\nAntiAlias=1\nText=%1\n\n"
    );
    assert_eq!(out.text, expected);
    assert!(out.skipped_layers.is_empty());
}

#[test]
fn positions_are_rebased_against_the_background() {
    let layer = snap(
        "Text1",
        Some("custom-text"),
        text_payload("Hello", "Roboto Bold"),
        Geometry::new(Point::new(412.5, 230.0), Size::new(60.0, 27.0)),
    );
    let out = run(vec![layer], background(400.0, 200.0));
    assert!(out.text.contains("X=(12.5 * #Scale#)\nY=(30 * #Scale#)\n"));
    assert!(out.text.contains("FontFace=Roboto\n"));
    assert!(out.text.contains("StringStyle=bold\n"));
    assert!(out.text.contains("Text=Hello\n"));
    assert!(!out.text.contains("MeasureName"));
    assert!(!out.text.contains("[MeasureText1]"));
}

#[test]
fn text_angle_is_written_in_radians() {
    let g = Geometry {
        angle_deg: 45.0,
        ..Geometry::new(Point::new(0.0, 0.0), Size::new(10.0, 10.0))
    };
    let out = run(
        vec![snap("Text1", None, text_payload("x", "Arial"), g)],
        background(0.0, 0.0),
    );
    assert!(out.text.contains("Angle=0.7853981633974483\n"));
}

#[test]
fn unknown_text_measure_degrades_to_literal_text() {
    let layer = snap(
        "Text1",
        Some("time-fortnight"),
        text_payload("fallback", "Arial"),
        Geometry::new(Point::ZERO, Size::new(10.0, 10.0)),
    );
    let out = run(vec![layer], background(0.0, 0.0));
    assert!(out.text.contains("Text=fallback\n"));
    assert!(!out.text.contains("Measure="));
    assert!(out.skipped_layers.is_empty());
}

#[test]
fn bar_cpu_emits_one_measure_and_one_meter() {
    let layer = snap(
        "Bar1",
        Some("bar-cpu"),
        LayerPayload::Bar(BarProps {
            background: Fill::solid("#000000"),
            foreground: Fill::new("#FFA500", 0.5),
        }),
        Geometry::new(Point::new(20.0, 30.0), Size::new(200.0, 50.0)),
    );
    let out = run(vec![layer], background(10.0, 10.0));
    let expected = format!(
        "{}[MeasureBar1]\nMeasure=CPU\n\n\
         [Bar1]\nMeter=Bar\nMeasureName=MeasureBar1\nX=(10 * #Scale#)\nY=(20 * #Scale#)\n\
         W=(200 * #Scale#)\nH=(50 * #Scale#)\nBarOrientation=Horizontal\n\
         BarColor=0,0,0,255\nSolidColor=255,165,0,128\n\n",
        HEADER
    );
    assert_eq!(out.text, expected);
    assert_eq!(out.text.matches("Measure=").count(), 1);
    assert_eq!(out.text.matches("Meter=").count(), 1);
}

#[test]
fn bar_size_uses_scale() {
    let g = Geometry {
        scale: Vec2::new(1.5, 2.0),
        ..Geometry::new(Point::ZERO, Size::new(200.0, 50.0))
    };
    let layer = snap(
        "Bar1",
        Some("bar-disk"),
        LayerPayload::Bar(BarProps {
            background: Fill::solid("#000"),
            foreground: Fill::solid("#FFF"),
        }),
        g,
    );
    let out = run(vec![layer], background(0.0, 0.0));
    assert!(out.text.contains("W=(300 * #Scale#)\nH=(100 * #Scale#)\n"));
    assert!(out.text.contains(
        "[MeasureBar1]\nMeasure=FreeDiskSpace\nDrive=C:\nInvertMeasure=1\nUpdateDivider=5\n\n"
    ));
}

#[test]
fn rotator_pivot_and_angles() {
    let mut props = RotatorProps::new("/img/needle.png");
    props.offset_y = 30.0;
    props.rotation_angle = 270.0;
    let g = Geometry {
        angle_deg: 90.0,
        ..Geometry::new(Point::new(200.0, 150.0), Size::new(20.0, 100.0))
    };
    let layer = snap(
        "Rotator1",
        Some("rotator-time-second"),
        LayerPayload::Rotator(props),
        g,
    );
    let out = run(vec![layer], background(0.0, 0.0));
    let expected = format!(
        "{HEADER}[MeasureRotator1]\nMeasure=Time\n\n\
         [Rotator1]\nMeter=Rotator\nMeasureName=MeasureRotator1\nImageName=#@#Images/0.png\n\
         W=(20 * #Scale#)\nH=(100 * #Scale#)\nX=(190 * #Scale#)\nY=(100 * #Scale#)\n\
         StartAngle=0\nRotationAngle=4.71238898038469\n\
         OffsetX=(10 * #Scale#)\nOffsetY=(80 * #Scale#)\nValueRemainder=60\n\n"
    );
    assert_eq!(out.text, expected);
    assert_eq!(out.assets.images, vec![std::path::PathBuf::from("/img/needle.png")]);
}

#[test]
fn disk_usage_rotator_chains_three_measures() {
    let layer = snap(
        "Rotator1",
        Some("rotator-disk-c-usage"),
        LayerPayload::Rotator(RotatorProps::new("/img/needle.png")),
        Geometry::new(Point::new(50.0, 50.0), Size::new(10.0, 10.0)),
    );
    let out = run(vec![layer], background(0.0, 0.0));
    let measures = "[MeasureRotator1Total]\nMeasure=FreeDiskSpace\nDrive=C:\nTotal=1\nUpdateDivider=5\n\n\
                    [MeasureRotator1Used]\nMeasure=FreeDiskSpace\nDrive=C:\nInvertMeasure=1\nUpdateDivider=5\n\n\
                    [MeasureRotator1]\nMeasure=Calc\nFormula=MeasureRotator1Used / MeasureRotator1Total\nUpdateDivider=5\n\n";
    assert!(out.text.contains(measures));
    assert!(out.text.contains("MeasureName=MeasureRotator1\n"));
    assert!(!out.text.contains("MeasureName2"));
    assert!(!out.text.contains("ValueRemainder"));
}

#[test]
fn rotator_and_bar_without_measure_are_skipped() {
    let layers = vec![
        snap(
            "Rotator1",
            Some("cpu-average"),
            LayerPayload::Rotator(RotatorProps::new("/img/needle.png")),
            Geometry::default(),
        ),
        snap(
            "Bar1",
            None,
            LayerPayload::Bar(BarProps {
                background: Fill::solid("#000"),
                foreground: Fill::solid("#FFF"),
            }),
            Geometry::default(),
        ),
    ];
    let out = run(layers, background(0.0, 0.0));
    assert_eq!(out.text, HEADER);
    assert_eq!(out.skipped_layers, vec!["Rotator1", "Bar1"]);
    assert!(out.assets.images.is_empty());
}

#[test]
fn image_layers_share_indices_by_source() {
    let image = |name: &str, src: &str, x: f64| {
        snap(
            name,
            None,
            LayerPayload::Image(ImageProps { source: src.into() }),
            Geometry::new(Point::new(x, 100.0), Size::new(40.0, 20.0)),
        )
    };
    let layers = vec![
        image("Image1", "/a/x.png", 100.0),
        image("Image2", "/a/y.png", 150.0),
        image("Image3", "/a/x.png", 200.0),
    ];
    let out = run(layers, background(0.0, 0.0));
    assert_eq!(
        out.text.matches("ImageName=#@#Images/0.png\n").count(),
        2
    );
    assert_eq!(out.text.matches("ImageName=#@#Images/1.png\n").count(), 1);
    assert!(out.text.contains(
        "[Image1]\nMeter=Image\nImageName=#@#Images/0.png\nW=(40 * #Scale#)\nH=(20 * #Scale#)\n\
         X=(80 * #Scale#)\nY=(90 * #Scale#)\nImageRotate=0\n\n"
    ));
    assert_eq!(out.assets.images.len(), 2);
}

#[test]
fn rotated_image_grows_its_box_and_keeps_degrees() {
    let g = Geometry {
        angle_deg: 30.0,
        ..Geometry::new(Point::new(100.0, 100.0), Size::new(40.0, 20.0))
    };
    let layer = snap(
        "Image1",
        None,
        LayerPayload::Image(ImageProps {
            source: "/a/x.png".into(),
        }),
        g,
    );
    let out = run(vec![layer], background(0.0, 0.0));
    assert!(out.text.contains("ImageRotate=30\n"));
    let w_line = out
        .text
        .lines()
        .find(|l| l.starts_with("W=("))
        .unwrap();
    let w: f64 = w_line
        .trim_start_matches("W=(")
        .trim_end_matches(" * #Scale#)")
        .parse()
        .unwrap();
    let expected = 40.0 * 30f64.to_radians().cos() + 20.0 * 30f64.to_radians().sin();
    assert!((w - expected).abs() < 1e-9);
}

#[test]
fn measures_precede_meters_in_layer_order() {
    let layers = vec![
        snap(
            "Text1",
            Some("cpu-average"),
            text_payload("x", "Arial"),
            Geometry::default(),
        ),
        snap(
            "Text2",
            Some("date-day-full"),
            text_payload("y", "Arial"),
            Geometry::default(),
        ),
    ];
    let out = run(layers, background(0.0, 0.0));
    let pos = |needle: &str| out.text.find(needle).unwrap();
    assert!(pos("[MeasureText1]") < pos("[MeasureText2]"));
    assert!(pos("[MeasureText2]") < pos("[Text1]"));
    assert!(pos("[Text1]") < pos("[Text2]"));
    assert!(out.text.contains("Text=%1%\n"));
}

#[test]
fn compiling_twice_is_byte_identical() {
    let layers = vec![
        snap(
            "Text1",
            Some("date-yyyy-mm-dd"),
            text_payload("x", "Arial Italic"),
            Geometry::new(Point::new(3.0, 4.0), Size::new(10.0, 10.0)),
        ),
        snap(
            "Image1",
            None,
            LayerPayload::Image(ImageProps {
                source: "/a/x.png".into(),
            }),
            Geometry::new(Point::new(50.0, 60.0), Size::new(10.0, 10.0)),
        ),
    ];
    let a = run(layers.clone(), background(1.0, 2.0));
    let b = run(layers, background(1.0, 2.0));
    assert_eq!(a, b);
}

#[test]
fn scroll_resize_adds_clamped_actions() {
    let snapshot = SkinSnapshot {
        background: background(0.0, 0.0),
        layers: Vec::new(),
    };
    let options = ExportOptions {
        allow_scroll_resize: true,
        ..ExportOptions::default()
    };
    let out = compile(&snapshot, &meta(), &options, &FontCache::default()).unwrap();
    assert!(out.text.contains(
        "AccurateText=1\nMouseScrollUpAction=[!SetVariable Scale \"(#Scale#+#ScrollMouseIncrement#)\"]\
         [!WriteKeyValue Variables Scale \"(#Scale#+#ScrollMouseIncrement#)\"][!Refresh]\n"
    ));
    assert!(out.text.contains(
        "MouseScrollDownAction=[!SetVariable Scale \"(#Scale#-#ScrollMouseIncrement# < 0.2 ? 0.2 : #Scale#-#ScrollMouseIncrement#)\"]\
         [!WriteKeyValue Variables Scale \"(#Scale#-#ScrollMouseIncrement# < 0.2 ? 0.2 : #Scale#-#ScrollMouseIncrement#)\"][!Refresh]\n\n[Variables]"
    ));
}

#[test]
fn fonts_in_cache_are_planned_for_copy() {
    let fonts = FontCache::from_entries(
        "/fonts",
        vec![FontEntry {
            display_name: "Roboto Bold".to_string(),
            file_name: "Roboto-Bold.ttf".to_string(),
        }],
    );
    let snapshot = SkinSnapshot {
        background: background(0.0, 0.0),
        layers: vec![
            snap(
                "Text1",
                Some("custom-text"),
                text_payload("a", "Roboto Bold"),
                Geometry::default(),
            ),
            snap(
                "Text2",
                Some("time-second"),
                text_payload("b", "Roboto Bold"),
                Geometry::default(),
            ),
        ],
    };
    let out = compile(&snapshot, &meta(), &ExportOptions::default(), &fonts).unwrap();
    assert_eq!(out.assets.fonts, vec!["Roboto-Bold.ttf"]);
}

#[test]
fn duplicate_or_malformed_names_are_rejected() {
    let t = |name: &str| {
        snap(
            name,
            None,
            text_payload("x", "Arial"),
            Geometry::default(),
        )
    };
    let fonts = FontCache::default();
    let opts = ExportOptions::default();
    for layers in [vec![t("Text1"), t("Text1")], vec![t("Bad]Name")], vec![t("")]] {
        let snapshot = SkinSnapshot {
            background: background(0.0, 0.0),
            layers,
        };
        assert!(matches!(
            compile(&snapshot, &meta(), &opts, &fonts),
            Err(SkinError::Validation(_))
        ));
    }

    let bad_meta = SkinMetadata {
        description: "two\nlines".to_string(),
        ..meta()
    };
    let snapshot = SkinSnapshot {
        background: background(0.0, 0.0),
        layers: Vec::new(),
    };
    assert!(compile(&snapshot, &bad_meta, &opts, &fonts).is_err());
}

#[test]
fn multi_line_text_stays_inside_its_meter() {
    let snapshot = SkinSnapshot {
        background: background(0.0, 0.0),
        layers: vec![snap(
            "Text1",
            Some("custom-text"),
            text_payload("Hello\n[Evil]\r\nMeter=Image", "Arial"),
            Geometry::default(),
        )],
    };
    let out = compile(&snapshot, &meta(), &ExportOptions::default(), &FontCache::default())
        .unwrap();
    assert!(out.text.contains("Text=Hello#CRLF#[Evil]#CRLF#Meter=Image\n"));
    let headers: Vec<&str> = out
        .text
        .lines()
        .filter(|l| l.starts_with('['))
        .collect();
    assert_eq!(
        headers,
        vec!["[Metadata]", "[Rainmeter]", "[Variables]", "[Text1]"]
    );
}

#[test]
fn multi_line_font_name_is_rejected() {
    let snapshot = SkinSnapshot {
        background: background(0.0, 0.0),
        layers: vec![snap(
            "Text1",
            None,
            text_payload("x", "Arial\nX=1"),
            Geometry::default(),
        )],
    };
    assert!(matches!(
        compile(&snapshot, &meta(), &ExportOptions::default(), &FontCache::default()),
        Err(SkinError::Validation(_))
    ));
}

#[test]
fn skin_names_must_be_one_directory() {
    let snapshot = SkinSnapshot {
        background: background(0.0, 0.0),
        layers: Vec::new(),
    };
    let fonts = FontCache::default();
    let opts = ExportOptions::default();
    for name in ["/tmp/Escaped", "..", ".", "a/b", "../Clock"] {
        let m = SkinMetadata {
            name: name.to_string(),
            ..meta()
        };
        assert!(
            matches!(compile(&snapshot, &m, &opts, &fonts), Err(SkinError::Validation(_))),
            "{name}"
        );
    }
    let m = SkinMetadata {
        name: "My Clock".to_string(),
        ..meta()
    };
    assert!(compile(&snapshot, &m, &opts, &fonts).is_ok());
}

#[test]
fn shapes_compile_to_shape_meters() {
    let g = Geometry {
        angle_deg: 15.0,
        ..Geometry::new(Point::new(5.0, 5.0), Size::new(100.0, 60.0))
    };
    let layers = vec![
        snap(
            "Shape1",
            None,
            LayerPayload::Shape(ShapeProps {
                shape: ShapeKind::Rectangle,
                fill: Fill::solid("#0000FF"),
            }),
            Geometry::new(Point::new(5.0, 5.0), Size::new(100.0, 60.0)),
        ),
        snap(
            "Shape2",
            None,
            LayerPayload::Shape(ShapeProps {
                shape: ShapeKind::Ellipse,
                fill: Fill::solid("#008000"),
            }),
            g,
        ),
        snap(
            "Shape3",
            None,
            LayerPayload::Shape(ShapeProps {
                shape: ShapeKind::Triangle,
                fill: Fill::solid("#FF0000"),
            }),
            Geometry::new(Point::ZERO, Size::new(100.0, 60.0)),
        ),
    ];
    let out = run(layers, background(0.0, 0.0));
    assert!(out.text.contains(
        "Shape=Rectangle 0,0,(100 * #Scale#),(60 * #Scale#) | Fill Color 0,0,255,255 | StrokeWidth 0\n"
    ));
    assert!(out.text.contains(
        "Shape=Ellipse (50 * #Scale#),(30 * #Scale#),(50 * #Scale#),(30 * #Scale#) | Fill Color 0,128,0,255 | StrokeWidth 0 | Rotate 15\n"
    ));
    assert!(out.text.contains(
        "Shape=Path TrianglePath | Fill Color 255,0,0,255 | StrokeWidth 0\n\
         TrianglePath=(50 * #Scale#),0 | LineTo (100 * #Scale#),(60 * #Scale#) | LineTo 0,(60 * #Scale#) | ClosePath 1\n"
    ));
    assert_eq!(out.text.matches("Meter=Shape\n").count(), 3);
}

#[test]
fn skin_dir_name_falls_back_to_default() {
    let settings = CompilerSettings::default();
    let mut m = SkinMetadata::default();
    assert_eq!(m.skin_dir_name(&settings), "rmEditorSkin");
    m.name = "Clock".to_string();
    assert_eq!(m.skin_dir_name(&settings), "Clock");
}
