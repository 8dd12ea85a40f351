//! The two recursive container shapes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::component::{deserialize_id, ComponentId, ComponentRef};

pub const GRID_TYPE: &str = "column";
pub const PARALLAX_TYPE: &str = "parallax";

pub const GRID_CONTENTS_KEY: &str = "gridContents";
pub const PAGES_KEY: &str = "pages";

/// Grid cell index (`row * numCols + col`) to the components in that cell.
///
/// Keys serialize as decimal strings, matching the persisted JSON.
pub type GridContents = BTreeMap<usize, Vec<ComponentRef>>;

/// One layer of a parallax canvas.
///
/// Import normalizes a layer: a missing `height` reads as 100, and a
/// `null` `backgroundImageUrl`, `backgroundColor` or `depth` is dropped on
/// export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallaxLayer {
    /// Unique within the owning parallax component only.
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: ComponentId,

    #[serde(default = "default_layer_height")]
    pub height: f64,

    /// Absolutely positioned children (`x`, `y`, `width`, `height`, `zIndex` props).
    #[serde(default)]
    pub components: Vec<ComponentRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    /// Paint/transform order; unrelated to array position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,

    /// Keys this model does not interpret, kept for round-trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_layer_height() -> f64 {
    100.0
}

impl ParallaxLayer {
    pub fn new(id: ComponentId) -> Self {
        Self {
            id,
            height: default_layer_height(),
            components: Vec::new(),
            background_image_url: None,
            background_color: None,
            depth: None,
            extra: Map::new(),
        }
    }

    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_components(mut self, components: Vec<ComponentRef>) -> Self {
        self.components = components;
        self
    }
}

/// Borrowed view of a component's children, dispatched on by every tree walk.
#[derive(Debug, Clone, Copy)]
pub enum ContainerKind<'a> {
    Grid(&'a GridContents),
    Layers(&'a [ParallaxLayer]),
    None,
}

impl<'a> ContainerKind<'a> {
    /// Every child array in stable order: cells by index, layers by position.
    pub fn child_arrays(self) -> Vec<&'a [ComponentRef]> {
        match self {
            ContainerKind::Grid(cells) => cells.values().map(Vec::as_slice).collect(),
            ContainerKind::Layers(layers) => {
                layers.iter().map(|layer| layer.components.as_slice()).collect()
            }
            ContainerKind::None => Vec::new(),
        }
    }
}

pub(crate) fn is_container_key(component_type: &str, key: &str) -> bool {
    matches!(
        (component_type, key),
        (GRID_TYPE, GRID_CONTENTS_KEY) | (PARALLAX_TYPE, PAGES_KEY)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layer_defaults_and_extra_keys() {
        let layer: ParallaxLayer = serde_json::from_value(json!({
            "id": 7,
            "components": [],
            "label": "hero"
        }))
        .unwrap();

        assert_eq!(layer.id, 7);
        assert_eq!(layer.height, 100.0);
        assert_eq!(layer.depth, None);
        assert_eq!(layer.extra.get("label"), Some(&json!("hero")));

        let back = serde_json::to_value(&layer).unwrap();
        assert_eq!(back["label"], json!("hero"));
        assert!(back.get("backgroundColor").is_none());
    }

    #[test]
    fn test_layer_export_is_normalized() {
        let layer: ParallaxLayer = serde_json::from_value(json!({
            "id": 2,
            "depth": null,
            "backgroundColor": null
        }))
        .unwrap();

        let back = serde_json::to_value(&layer).unwrap();
        assert_eq!(back, json!({ "id": 2, "height": 100.0, "components": [] }));
    }

    #[test]
    fn test_grid_keys_serialize_as_strings() {
        let mut cells = GridContents::new();
        cells.insert(3, Vec::new());

        let value = serde_json::to_value(&cells).unwrap();
        assert_eq!(value, json!({ "3": [] }));

        let parsed: GridContents = serde_json::from_value(value).unwrap();
        assert!(parsed.contains_key(&3));
    }
}
