use std::sync::Arc;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use pagebuilder_editor::{
    DragPayload, DragSession, DropTarget, EditorConfig, EditorError, MutationContext, MutationStatus,
    TreeContext,
};
use pagebuilder_model::{forest_to_value, Component, ComponentId, Props};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// JS numbers carry ids; anything that is not a non-negative integer is rejected.
fn to_id(id: f64) -> Result<ComponentId, JsValue> {
    if id.is_finite() && id >= 0.0 && id.fract() == 0.0 {
        Ok(id as ComponentId)
    } else {
        Err(JsValue::from_str(&format!("Invalid component id: {}", id)))
    }
}

fn status_name(status: MutationStatus) -> String {
    serde_json::to_value(status)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DefinitionSummary<'a> {
    #[serde(rename = "type")]
    component_type: &'a str,
    label: &'a str,
}

/// Editor handle owned by the host page.
#[wasm_bindgen]
pub struct PageBuilderHandle {
    context: TreeContext,
    drag: DragSession,
}

#[wasm_bindgen]
impl PageBuilderHandle {
    /// Build an editor from an optional `pagebuilder.config.json` body.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<PageBuilderHandle, JsValue> {
        let config = match config_json {
            Some(text) => EditorConfig::parse(&text)
                .map_err(EditorError::from)
                .map_err(js_error)?,
            None => EditorConfig::default(),
        };

        Ok(PageBuilderHandle {
            context: TreeContext::from_config(&config),
            drag: DragSession::new(),
        })
    }

    #[wasm_bindgen(js_name = addComponent)]
    pub fn add_component(&mut self, component_type: &str, index: Option<usize>) -> String {
        status_name(self.context.add_component(component_type, index))
    }

    /// `patch_json` is a props object shallow-merged into the component.
    #[wasm_bindgen(js_name = updateComponent)]
    pub fn update_component(&mut self, id: f64, patch_json: &str) -> Result<String, JsValue> {
        let id = to_id(id)?;
        let patch: Props = serde_json::from_str(patch_json).map_err(js_error)?;
        Ok(status_name(self.context.update_component(id, patch)))
    }

    #[wasm_bindgen(js_name = deleteComponent)]
    pub fn delete_component(&mut self, id: f64) -> Result<String, JsValue> {
        let id = to_id(id)?;
        Ok(status_name(self.context.delete_component(id)))
    }

    #[wasm_bindgen(js_name = moveComponentToRoot)]
    pub fn move_component_to_root(&mut self, component_json: &str, index: usize) -> Result<String, JsValue> {
        let component: Component = serde_json::from_str(component_json).map_err(js_error)?;
        Ok(status_name(
            self.context.move_component_to_root(Arc::new(component), index),
        ))
    }

    #[wasm_bindgen(js_name = importJSON)]
    pub fn import_json(&mut self, payload: &str) -> Result<(), JsValue> {
        self.context
            .import_json_str(payload)
            .map_err(EditorError::from)
            .map_err(js_error)
    }

    /// `{ components, className?, style? }`
    #[wasm_bindgen(js_name = exportJSON)]
    pub fn export_json(&self) -> Result<String, JsValue> {
        self.context.to_json_string().map_err(js_error)
    }

    #[wasm_bindgen(js_name = getComponents)]
    pub fn get_components(&self) -> String {
        forest_to_value(self.context.components()).to_string()
    }

    #[wasm_bindgen(js_name = getComponent)]
    pub fn get_component(&self, id: f64) -> Result<Option<String>, JsValue> {
        let id = to_id(id)?;
        self.context
            .get_component(id)
            .map(|component| serde_json::to_string(&*component).map_err(js_error))
            .transpose()
    }

    /// Palette entries in registration order: `[{ type, label }]`.
    #[wasm_bindgen(js_name = listDefinitions)]
    pub fn list_definitions(&self) -> Result<String, JsValue> {
        let summaries: Vec<DefinitionSummary<'_>> = self
            .context
            .registry()
            .list_definitions()
            .map(|definition| DefinitionSummary {
                component_type: &definition.component_type,
                label: &definition.label,
            })
            .collect();
        serde_json::to_string(&summaries).map_err(js_error)
    }

    /// Start a drag with a `{ "from": ... }` payload.
    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(&mut self, payload_json: &str) -> Result<(), JsValue> {
        let payload: DragPayload = serde_json::from_str(payload_json).map_err(js_error)?;
        self.drag.begin(&mut self.context, payload);
        Ok(())
    }

    #[wasm_bindgen(js_name = cancelDrag)]
    pub fn cancel_drag(&mut self) {
        self.drag.cancel(&mut self.context);
    }

    #[wasm_bindgen(js_name = dropOnRoot)]
    pub fn drop_on_root(&mut self, index: usize) -> String {
        let target = DropTarget::Root { index };
        status_name(self.drag.drop_on(&mut self.context, target))
    }

    #[wasm_bindgen(js_name = dropOnGridCell)]
    pub fn drop_on_grid_cell(&mut self, container_id: f64, cell_index: usize, index: usize) -> Result<String, JsValue> {
        let target = DropTarget::GridCell {
            container_id: to_id(container_id)?,
            cell_index,
            index,
        };
        Ok(status_name(self.drag.drop_on(&mut self.context, target)))
    }

    #[wasm_bindgen(js_name = dropOnParallaxLayer)]
    pub fn drop_on_parallax_layer(
        &mut self,
        container_id: f64,
        layer_index: usize,
        x: f64,
        y: f64,
    ) -> Result<String, JsValue> {
        let target = DropTarget::ParallaxLayer {
            container_id: to_id(container_id)?,
            layer_index,
            x,
            y,
        };
        Ok(status_name(self.drag.drop_on(&mut self.context, target)))
    }

    #[wasm_bindgen(js_name = setReadOnly)]
    pub fn set_read_only(&mut self, read_only: bool) {
        self.context.flags_mut().read_only = read_only;
    }

    #[wasm_bindgen(js_name = setPreviewing)]
    pub fn set_previewing(&mut self, previewing: bool) {
        self.context.flags_mut().is_previewing = previewing;
    }

    #[wasm_bindgen(js_name = setActiveOverlay)]
    pub fn set_active_overlay(&mut self, id: Option<f64>) -> Result<(), JsValue> {
        self.context.flags_mut().active_overlay_id = id.map(to_id).transpose()?;
        Ok(())
    }

    #[wasm_bindgen(js_name = setActiveSettings)]
    pub fn set_active_settings(&mut self, id: Option<f64>) -> Result<(), JsValue> {
        self.context.flags_mut().active_settings_id = id.map(to_id).transpose()?;
        Ok(())
    }

    /// Current UI flags as JSON.
    #[wasm_bindgen(js_name = getFlags)]
    pub fn get_flags(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.context.flags()).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn version(&self) -> f64 {
        self.context.version() as f64
    }
}
