use crate::layer::model::LayerKind;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Editor tool. Every non-select tool places one layer and then hands control back to `Select`.
pub enum ActiveTool {
    /// Pick and drag existing layers.
    #[default]
    Select,
    /// Place a text layer.
    Text,
    /// Place an image layer.
    Image,
    /// Place a rotator layer.
    Rotator,
    /// Place a bar layer.
    Bar,
}

impl ActiveTool {
    /// Layer kind a placement with this tool creates.
    pub fn placement_kind(self) -> Option<LayerKind> {
        match self {
            Self::Select => None,
            Self::Text => Some(LayerKind::Text),
            Self::Image => Some(LayerKind::Image),
            Self::Rotator => Some(LayerKind::Rotator),
            Self::Bar => Some(LayerKind::Bar),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/tool.rs"]
mod tests;
