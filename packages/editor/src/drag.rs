//! # Drag and drop
//!
//! Resolves a drop into exactly one mutation path.
//!
//! | source   | root                     | grid cell                      | parallax layer |
//! |----------|--------------------------|--------------------------------|----------------|
//! | `menu`   | `add_component`          | create, insert                 | create, place  |
//! | `main`   | [`reorder_root`]         | remove from root, insert       | rejected       |
//! | `column` | `move_component_to_root` | remove from source cell, insert| rejected       |
//!
//! Moves are applied as a single forest replacement so a drop bumps the
//! version once.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use pagebuilder_model::{
    grid, tree, ComponentId, ComponentRef, Forest, Props, GRID_CONTENTS_KEY, GRID_TYPE,
    PARALLAX_TYPE,
};

use crate::context::{insert_clamped, MutationContext, MutationStatus};
use crate::scoped::ScopedContext;

/// Component width and height for blocks dropped onto a parallax layer.
pub const LAYER_DROP_WIDTH: f64 = 250.0;
pub const LAYER_DROP_HEIGHT: f64 = 150.0;

/// What is being dragged, as carried by the host's drag event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "lowercase")]
pub enum DragPayload {
    /// A palette entry.
    Menu {
        #[serde(rename = "type")]
        component_type: String,
    },
    /// A root component.
    Main { id: ComponentId, component: ComponentRef },
    /// A component inside a grid cell.
    Column {
        component: ComponentRef,
        #[serde(rename = "sourceCellIndex")]
        source_cell_index: usize,
    },
}

impl DragPayload {
    pub fn component_type(&self) -> &str {
        match self {
            DragPayload::Menu { component_type } => component_type,
            DragPayload::Main { component, .. } | DragPayload::Column { component, .. } => {
                &component.component_type
            }
        }
    }

    /// The existing component being moved, if any.
    pub fn component(&self) -> Option<&ComponentRef> {
        match self {
            DragPayload::Menu { .. } => None,
            DragPayload::Main { component, .. } | DragPayload::Column { component, .. } => {
                Some(component)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropTarget {
    /// Slot `index` of the root forest.
    Root { index: usize },
    GridCell {
        container_id: ComponentId,
        cell_index: usize,
        index: usize,
    },
    /// Canvas coordinates relative to the layer's top-left corner.
    ParallaxLayer {
        container_id: ComponentId,
        layer_index: usize,
        x: f64,
        y: f64,
    },
}

/// Pending drag between the host's drag-start and drop events.
#[derive(Debug, Default)]
pub struct DragSession {
    payload: Option<DragPayload>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, ctx: &mut dyn MutationContext, payload: DragPayload) {
        ctx.flags_mut().is_dragging = true;
        self.payload = Some(payload);
    }

    pub fn pending(&self) -> Option<&DragPayload> {
        self.payload.as_ref()
    }

    /// Abandon the drag. The forest is never touched.
    pub fn cancel(&mut self, ctx: &mut dyn MutationContext) {
        ctx.flags_mut().is_dragging = false;
        self.payload = None;
    }

    pub fn drop_on(&mut self, ctx: &mut dyn MutationContext, target: DropTarget) -> MutationStatus {
        ctx.flags_mut().is_dragging = false;

        let Some(payload) = self.payload.take() else {
            return MutationStatus::Rejected;
        };
        if ctx.flags().read_only {
            tracing::debug!(drop_target = ?target, "drop ignored: editor is read-only");
            return MutationStatus::Rejected;
        }

        resolve_drop(ctx, &payload, target)
    }
}

pub fn resolve_drop(
    ctx: &mut dyn MutationContext,
    payload: &DragPayload,
    target: DropTarget,
) -> MutationStatus {
    match target {
        DropTarget::Root { index } => match payload {
            DragPayload::Menu { component_type } => ctx.add_component(component_type, Some(index)),
            DragPayload::Main { id, .. } => reorder_root(ctx, *id, index),
            DragPayload::Column { component, .. } => {
                ctx.move_component_to_root(Arc::clone(component), index)
            }
        },
        DropTarget::GridCell {
            container_id,
            cell_index,
            index,
        } => drop_on_grid_cell(ctx, payload, container_id, cell_index, index),
        DropTarget::ParallaxLayer {
            container_id,
            layer_index,
            x,
            y,
        } => drop_on_layer(ctx, payload, container_id, layer_index, x, y),
    }
}

/// Move root component `id` to drop slot `drop_index`, where slots are
/// counted before the dragged component is lifted out.
pub fn reorder_root(ctx: &mut dyn MutationContext, id: ComponentId, drop_index: usize) -> MutationStatus {
    let mut next = ctx.components().to_vec();
    let Some(position) = next.iter().position(|c| c.id == id) else {
        tracing::debug!(component_id = id, "reorder skipped: not a root component");
        return MutationStatus::NotFound;
    };

    let adjusted = if position < drop_index {
        drop_index - 1
    } else {
        drop_index
    };
    let dragged = next.remove(position);
    insert_clamped(&mut next, Some(adjusted), dragged);
    ctx.set_components(next);
    MutationStatus::Applied
}

fn drop_on_grid_cell(
    ctx: &mut dyn MutationContext,
    payload: &DragPayload,
    container_id: ComponentId,
    cell_index: usize,
    index: usize,
) -> MutationStatus {
    let Some(container) = ctx.get_component(container_id) else {
        return MutationStatus::NotFound;
    };
    let Some(cells) = grid::cells_of(&container) else {
        return MutationStatus::Rejected;
    };
    if cell_index >= grid::cell_count(&container.props) {
        tracing::debug!(container_id, cell_index, "drop outside grid bounds");
        return MutationStatus::Rejected;
    }

    let component_type = payload.component_type();
    if !ctx.allow_component_to_be_added(component_type, Some(GRID_TYPE)) {
        tracing::warn!(component_type, container_id, "component not allowed in grid");
        return MutationStatus::Denied;
    }

    let Some(dragged) = payload.component() else {
        let Some(component) = ctx.create_component(component_type) else {
            return MutationStatus::UnknownType;
        };
        return ScopedContext::grid_cell(ctx, container_id, cell_index)
            .insert_child(Arc::new(component), Some(index));
    };

    if tree::contains(std::slice::from_ref(dragged), container_id) {
        tracing::debug!(component_id = dragged.id, container_id, "cannot drop a container into itself");
        return MutationStatus::Rejected;
    }

    let mut index = index;
    if let DragPayload::Column {
        source_cell_index, ..
    } = payload
    {
        let same_cell_position = cells
            .get(source_cell_index)
            .filter(|_| *source_cell_index == cell_index)
            .and_then(|children| children.iter().position(|c| c.id == dragged.id));
        if same_cell_position.is_some_and(|position| position < index) {
            index -= 1;
        }
    }

    let lifted = tree::deep_delete(ctx.components(), dragged.id);
    match insert_into_cell(&lifted, container_id, cell_index, index, Arc::clone(dragged)) {
        Some(next) => {
            ctx.set_components(next);
            MutationStatus::Applied
        }
        None => MutationStatus::NotFound,
    }
}

fn insert_into_cell(
    forest: &[ComponentRef],
    container_id: ComponentId,
    cell_index: usize,
    index: usize,
    component: ComponentRef,
) -> Option<Forest> {
    let container = tree::find_component(forest, container_id)?;
    let mut cells = grid::cells_of(&container)?;
    insert_clamped(cells.entry(cell_index).or_default(), Some(index), component);
    tree::try_update(forest, container_id, &Props::new().with(GRID_CONTENTS_KEY, cells))
}

fn drop_on_layer(
    ctx: &mut dyn MutationContext,
    payload: &DragPayload,
    container_id: ComponentId,
    layer_index: usize,
    x: f64,
    y: f64,
) -> MutationStatus {
    let DragPayload::Menu { component_type } = payload else {
        return MutationStatus::Rejected;
    };

    let Some(container) = ctx.get_component(container_id) else {
        return MutationStatus::NotFound;
    };
    if container.component_type != PARALLAX_TYPE {
        return MutationStatus::Rejected;
    }
    if container.props.pages().map_or(true, |layers| layer_index >= layers.len()) {
        return MutationStatus::NotFound;
    }

    if !ctx.allow_component_to_be_added(component_type, Some(PARALLAX_TYPE)) {
        tracing::warn!(component_type = component_type.as_str(), container_id, "component not allowed in parallax");
        return MutationStatus::Denied;
    }

    let Some(component) = ctx.create_component(component_type) else {
        return MutationStatus::UnknownType;
    };
    let placed = component.with_patch(
        &Props::new()
            .with("x", (x - LAYER_DROP_WIDTH / 2.0).max(0.0))
            .with("y", (y - LAYER_DROP_HEIGHT / 2.0).max(0.0))
            .with("width", LAYER_DROP_WIDTH)
            .with("height", LAYER_DROP_HEIGHT)
            .with("zIndex", 1),
    );

    ScopedContext::parallax_layer(ctx, container_id, layer_index).insert_child(Arc::new(placed), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use pagebuilder_model::{Component, GridContents, IdGenerator};

    use crate::policy::PlacementRules;
    use crate::registry::ComponentRegistry;
    use crate::{blocks, TreeContext};

    fn leaf(id: ComponentId) -> ComponentRef {
        Arc::new(Component::new(id, "text", Props::new()))
    }

    /// root: [1, grid 2 { cell 0: [3, 4, 5] }, parallax 6, 7]
    fn context() -> TreeContext {
        let mut cells = GridContents::new();
        cells.insert(0, vec![leaf(3), leaf(4), leaf(5)]);
        let grid_block = Arc::new(blocks::column(2).with_grid_contents(cells));
        let parallax = Arc::new(blocks::parallax(6));

        TreeContext::new(Arc::new(ComponentRegistry::builtin()))
            .with_id_generator(Arc::new(IdGenerator::starting_at(1)))
            .with_components(vec![leaf(1), grid_block, parallax, leaf(7)])
    }

    fn root_ids(ctx: &TreeContext) -> Vec<ComponentId> {
        ctx.components().iter().map(|c| c.id).collect()
    }

    fn cell_ids(ctx: &TreeContext, grid_id: ComponentId, cell: usize) -> Vec<ComponentId> {
        ctx.get_component(grid_id)
            .and_then(|g| g.props.grid_contents().and_then(|c| c.get(&cell)).cloned())
            .unwrap_or_default()
            .iter()
            .map(|c| c.id)
            .collect()
    }

    fn main_payload(ctx: &TreeContext, id: ComponentId) -> DragPayload {
        DragPayload::Main {
            id,
            component: ctx.get_component(id).unwrap(),
        }
    }

    #[test]
    fn test_payload_wire_shape() {
        let payload: DragPayload = serde_json::from_value(json!({ "from": "menu", "type": "text" })).unwrap();
        assert_eq!(payload.component_type(), "text");

        let payload: DragPayload = serde_json::from_value(json!({
            "from": "column",
            "sourceCellIndex": 1,
            "component": { "id": 9, "type": "html", "props": {} }
        }))
        .unwrap();
        assert!(matches!(payload, DragPayload::Column { source_cell_index: 1, .. }));
    }

    #[test]
    fn test_reorder_root_downward_and_upward() {
        let mut ctx = context();

        // drop 1 into the slot before 7
        assert_eq!(reorder_root(&mut ctx, 1, 3), MutationStatus::Applied);
        assert_eq!(root_ids(&ctx), vec![2, 6, 1, 7]);

        assert_eq!(reorder_root(&mut ctx, 7, 0), MutationStatus::Applied);
        assert_eq!(root_ids(&ctx), vec![7, 2, 6, 1]);

        assert_eq!(reorder_root(&mut ctx, 3, 0), MutationStatus::NotFound);
    }

    #[test]
    fn test_menu_drop_on_root() {
        let mut ctx = context();
        let mut session = DragSession::new();

        session.begin(&mut ctx, DragPayload::Menu { component_type: "divider".into() });
        assert!(ctx.flags().is_dragging);

        let status = session.drop_on(&mut ctx, DropTarget::Root { index: 1 });
        assert_eq!(status, MutationStatus::Applied);
        assert!(!ctx.flags().is_dragging);
        assert_eq!(ctx.components()[1].component_type, "divider");
        assert!(session.pending().is_none());
    }

    #[test]
    fn test_cancel_leaves_forest_untouched() {
        let mut ctx = context();
        let mut session = DragSession::new();

        let payload = main_payload(&ctx, 1);
        session.begin(&mut ctx, payload);
        session.cancel(&mut ctx);

        assert_eq!(ctx.version(), 0);
        assert!(!ctx.flags().is_dragging);
        assert_eq!(session.drop_on(&mut ctx, DropTarget::Root { index: 0 }), MutationStatus::Rejected);
    }

    #[test]
    fn test_read_only_rejects_drop() {
        let mut ctx = context();
        ctx.flags_mut().read_only = true;
        let mut session = DragSession::new();

        session.begin(&mut ctx, DragPayload::Menu { component_type: "text".into() });
        assert_eq!(session.drop_on(&mut ctx, DropTarget::Root { index: 0 }), MutationStatus::Rejected);
        assert_eq!(ctx.version(), 0);
    }

    #[test]
    fn test_main_drop_into_grid_cell() {
        let mut ctx = context();
        let payload = main_payload(&ctx, 7);

        let status = resolve_drop(
            &mut ctx,
            &payload,
            DropTarget::GridCell { container_id: 2, cell_index: 1, index: 0 },
        );

        assert_eq!(status, MutationStatus::Applied);
        assert_eq!(ctx.version(), 1);
        assert_eq!(root_ids(&ctx), vec![1, 2, 6]);
        assert_eq!(cell_ids(&ctx, 2, 1), vec![7]);
    }

    #[test]
    fn test_column_drop_down_within_same_cell() {
        let mut ctx = context();
        let payload = DragPayload::Column {
            component: ctx.get_component(3).unwrap(),
            source_cell_index: 0,
        };

        // slot 2 is between 4 and 5 before 3 is lifted
        let status = resolve_drop(
            &mut ctx,
            &payload,
            DropTarget::GridCell { container_id: 2, cell_index: 0, index: 2 },
        );

        assert_eq!(status, MutationStatus::Applied);
        assert_eq!(cell_ids(&ctx, 2, 0), vec![4, 3, 5]);
    }

    #[test]
    fn test_column_drop_to_root_moves_once() {
        let mut ctx = context();
        let payload = DragPayload::Column {
            component: ctx.get_component(4).unwrap(),
            source_cell_index: 0,
        };

        let status = resolve_drop(&mut ctx, &payload, DropTarget::Root { index: 0 });

        assert_eq!(status, MutationStatus::Applied);
        assert_eq!(ctx.version(), 1);
        assert_eq!(root_ids(&ctx), vec![4, 1, 2, 6, 7]);
        assert_eq!(cell_ids(&ctx, 2, 0), vec![3, 5]);
    }

    #[test]
    fn test_grid_drop_validation() {
        let mut ctx = context().with_policy(PlacementRules::new().deny(Some("column"), "column"));

        let out_of_bounds = resolve_drop(
            &mut ctx,
            &DragPayload::Menu { component_type: "text".into() },
            DropTarget::GridCell { container_id: 2, cell_index: 2, index: 0 },
        );
        assert_eq!(out_of_bounds, MutationStatus::Rejected);

        let denied = resolve_drop(
            &mut ctx,
            &DragPayload::Menu { component_type: "column".into() },
            DropTarget::GridCell { container_id: 2, cell_index: 0, index: 0 },
        );
        assert_eq!(denied, MutationStatus::Denied);

        let unknown = resolve_drop(
            &mut ctx,
            &DragPayload::Menu { component_type: "video".into() },
            DropTarget::GridCell { container_id: 2, cell_index: 0, index: 0 },
        );
        assert_eq!(unknown, MutationStatus::UnknownType);
        assert_eq!(ctx.version(), 0);
    }

    #[test]
    fn test_cannot_drop_grid_into_itself() {
        let mut ctx = context();
        let payload = main_payload(&ctx, 2);

        let status = resolve_drop(
            &mut ctx,
            &payload,
            DropTarget::GridCell { container_id: 2, cell_index: 1, index: 0 },
        );
        assert_eq!(status, MutationStatus::Rejected);
        assert_eq!(ctx.version(), 0);
    }

    #[test]
    fn test_menu_drop_on_parallax_layer_positions_block() {
        let mut ctx = context();

        let status = resolve_drop(
            &mut ctx,
            &DragPayload::Menu { component_type: "image".into() },
            DropTarget::ParallaxLayer { container_id: 6, layer_index: 0, x: 100.0, y: 200.0 },
        );
        assert_eq!(status, MutationStatus::Applied);

        let parallax = ctx.get_component(6).unwrap();
        let placed = &parallax.props.pages().unwrap()[0].components[0];
        assert_eq!(placed.props.get_f64("x"), Some(0.0));
        assert_eq!(placed.props.get_f64("y"), Some(125.0));
        assert_eq!(placed.props.get_f64("width"), Some(250.0));
        assert_eq!(placed.props.get_u64("zIndex"), Some(1));
    }

    #[test]
    fn test_parallax_accepts_menu_only() {
        let mut ctx = context();
        let payload = main_payload(&ctx, 1);

        let status = resolve_drop(
            &mut ctx,
            &payload,
            DropTarget::ParallaxLayer { container_id: 6, layer_index: 0, x: 0.0, y: 0.0 },
        );
        assert_eq!(status, MutationStatus::Rejected);
    }

    #[test]
    fn test_parallax_drop_denied_by_policy() {
        let ids = Arc::new(IdGenerator::starting_at(100));
        let mut ctx = context()
            .with_id_generator(Arc::clone(&ids))
            .with_policy(PlacementRules::new().deny(Some(PARALLAX_TYPE), "image"));

        let status = resolve_drop(
            &mut ctx,
            &DragPayload::Menu { component_type: "image".into() },
            DropTarget::ParallaxLayer { container_id: 6, layer_index: 0, x: 10.0, y: 10.0 },
        );

        assert_eq!(status, MutationStatus::Denied);
        assert_eq!(ids.peek(), 100);
        assert_eq!(ctx.version(), 0);
        assert!(ctx.get_component(6).unwrap().props.pages().unwrap()[0].components.is_empty());
    }

    #[test]
    fn test_drop_into_grid_without_contents() {
        let bare = Arc::new(Component::new(20, GRID_TYPE, Props::new().with("numCols", 2)));
        let mut ctx = TreeContext::new(Arc::new(ComponentRegistry::builtin()))
            .with_components(vec![leaf(1), bare]);

        let payload = main_payload(&ctx, 1);
        let status = resolve_drop(
            &mut ctx,
            &payload,
            DropTarget::GridCell { container_id: 20, cell_index: 1, index: 0 },
        );

        assert_eq!(status, MutationStatus::Applied);
        assert_eq!(root_ids(&ctx), vec![20]);
        assert_eq!(cell_ids(&ctx, 20, 1), vec![1]);

        let status = resolve_drop(
            &mut ctx,
            &DragPayload::Menu { component_type: "divider".into() },
            DropTarget::GridCell { container_id: 20, cell_index: 0, index: 0 },
        );
        assert_eq!(status, MutationStatus::Applied);
        assert_eq!(cell_ids(&ctx, 20, 0).len(), 1);
    }
}
