//! Built-in block definitions and their default props.

use serde_json::json;

use pagebuilder_model::{
    grid, Component, ComponentId, GridContents, ParallaxLayer, Props, GRID_CONTENTS_KEY, GRID_TYPE,
    PAGES_KEY, PARALLAX_TYPE,
};

use crate::registry::ComponentDefinition;

pub const TEXT_TYPE: &str = "text";
pub const HEADING_TYPE: &str = "heading";
pub const DIVIDER_TYPE: &str = "divider";
pub const IMAGE_TYPE: &str = "image";
pub const HTML_TYPE: &str = "html";
pub const ALERT_TYPE: &str = "alert";

/// Built-ins in palette order.
pub fn builtin_definitions() -> Vec<ComponentDefinition> {
    vec![
        ComponentDefinition::new(TEXT_TYPE, "Text", text),
        ComponentDefinition::new(HEADING_TYPE, "Heading", heading),
        ComponentDefinition::new(DIVIDER_TYPE, "Divider", divider),
        ComponentDefinition::new(IMAGE_TYPE, "Image", image),
        ComponentDefinition::new(HTML_TYPE, "HTML", html),
        ComponentDefinition::new(GRID_TYPE, "Columns", column),
        ComponentDefinition::new(ALERT_TYPE, "Alert", alert),
        ComponentDefinition::new(PARALLAX_TYPE, "Parallax", parallax),
    ]
}

fn typography(content: &str, text_size: u64) -> Props {
    Props::new()
        .with("content", content)
        .with("textAlign", "left")
        .with("textSize", text_size)
        .with("fontFamily", "sans-serif")
        .with("textEffect", "none")
}

pub fn text(id: ComponentId) -> Component {
    Component::new(id, TEXT_TYPE, typography("Your text...", 12))
}

pub fn heading(id: ComponentId) -> Component {
    Component::new(id, HEADING_TYPE, typography("<b>Your heading...</b>", 16))
}

pub fn divider(id: ComponentId) -> Component {
    Component::new(id, DIVIDER_TYPE, Props::new())
}

pub fn image(id: ComponentId) -> Component {
    let props = Props::new()
        .with("url", "")
        .with("externalImageUrl", "")
        .with("width", 250)
        .with("height", 180)
        .with("alt", "")
        .with("x", 0)
        .with("y", 0)
        .with("filter", "none")
        .with("shape", "rect")
        .with(
            "customFilters",
            json!({
                "brightness": 1,
                "contrast": 1,
                "saturate": 1,
                "grayscale": 0,
                "sepia": 0,
                "invert": 0,
                "blur": 0,
                "hue-rotate": 0,
                "opacity": 1
            }),
        );
    Component::new(id, IMAGE_TYPE, props)
}

pub fn html(id: ComponentId) -> Component {
    Component::new(id, HTML_TYPE, Props::new().with("code", "<div>Hello</div>"))
}

/// One row of two equal columns, per-column arrays filled.
pub fn column(id: ComponentId) -> Component {
    let props = Props::new()
        .with(grid::NUM_ROWS_KEY, 1)
        .with(grid::NUM_COLS_KEY, 2)
        .with(grid::COL_WIDTHS_KEY, json!([1, 1]))
        .with(GRID_CONTENTS_KEY, GridContents::new())
        .with("containerClasses", "")
        .with("containerStyles", "");
    Component::new(id, GRID_TYPE, grid::reconciled(&props))
}

pub fn alert(id: ComponentId) -> Component {
    let props = Props::new()
        .with("title", "Alert Title")
        .with("content", "This is an important message.");
    Component::new(id, ALERT_TYPE, props)
}

pub fn parallax(id: ComponentId) -> Component {
    let layer = ParallaxLayer::new(1)
        .with_background_color("#F3F4F6")
        .with_depth(0.0);
    let props = Props::new()
        .with("containerHeight", 100)
        .with("containerHeightUnit", "vh")
        .with("perspective", 3)
        .with("is3DEnabled", true)
        .with(PAGES_KEY, vec![layer]);
    Component::new(id, PARALLAX_TYPE, props)
}
