//! skinforge turns a visually composed desktop-widget design into a Rainmeter skin.
//!
//! The crate has two halves:
//!
//! - a [`LayerStore`] that holds the design-time layers (text, images, rotating needles, bars,
//!   shapes) and keeps them in sync with a rendering [`Surface`]
//! - a compiler that turns a [`SkinSnapshot`] into `skin.ini` text plus the fonts and images it
//!   references, and [`export_skin`] which lays the result out on disk
//!
//! ```text
//! <Root>/<SkinName>/skin.ini
//! <Root>/<SkinName>/@Resources/Fonts/<copied fonts>
//! <Root>/<SkinName>/@Resources/Images/<index>.png
//! ```
//!
//! Compilation is pure: the same snapshot always produces byte-identical text.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod compile;
mod design;
mod export;
mod foundation;
mod geometry;
mod layer;
mod measure;
mod surface;

/// Measure/Format Table queries.
pub mod measures {
    pub use crate::measure::table::{
        CUSTOM_TEXT, CUSTOM_TEXT_PREVIEW, DeclarationSpec, MeasureCategory, MeasureEntry,
        MeasureType, Recipe, all_measures, categories_for_kind, default_measure, is_known, lookup,
        measures_for_kind, preview_value,
    };
}

pub use crate::assets::fonts::{FontCache, FontEntry};
pub use crate::assets::resolver::{AssetCopyReport, AssetPlan, copy_assets, image_ref};
pub use crate::compile::compiler::{
    CompiledSkin, CompilerSettings, ExportOptions, SkinMetadata, compile,
};
pub use crate::compile::font_face::{FontStyle, decompose_font_name};
pub use crate::design::DesignDocument;
pub use crate::export::skin_dir::{ExportReport, export_skin};
pub use crate::foundation::color::hex_to_rgb;
pub use crate::foundation::core::{
    Fill, Geometry, LayerId, Point, Size, Vec2, VisualId, format_number,
};
pub use crate::foundation::error::{SkinError, SkinResult};
pub use crate::geometry::normalize::{RotatedBounds, deg_to_rad, rebase, rotated_bounds};
pub use crate::layer::model::{
    BarPart, BarProps, ImageProps, Layer, LayerKind, LayerPayload, LayerSnapshot, RotatorProps,
    ShapeKind, ShapeProps, SkinBackground, SkinSnapshot, TextProps,
};
pub use crate::layer::overlay::RotatorOverlay;
pub use crate::layer::store::{LayerStore, MoveDirection, StoreConfig};
pub use crate::layer::tool::ActiveTool;
pub use crate::surface::{
    AssetPicker, GeometryListener, MemoryObject, MemorySurface, Surface, VisualSpec,
};
