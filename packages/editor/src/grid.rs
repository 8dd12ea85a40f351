//! Grid editing helpers.

use serde_json::json;

use pagebuilder_model::grid::{
    col_widths, normalize_widths, num_cols, COL_WIDTHS_KEY, NUM_COLS_KEY, NUM_ROWS_KEY,
};
use pagebuilder_model::{ComponentId, Props, GRID_TYPE};

use crate::context::{MutationContext, MutationStatus};

/// Resize grid `grid_id`. Shrinking drops the cells that fall outside the
/// new bounds; per-column arrays and widths are reconciled in the same update.
pub fn set_dimensions(
    ctx: &mut dyn MutationContext,
    grid_id: ComponentId,
    cols: usize,
    rows: usize,
) -> MutationStatus {
    if cols == 0 || rows == 0 {
        return MutationStatus::Rejected;
    }
    match ctx.get_component(grid_id) {
        None => return MutationStatus::NotFound,
        Some(component) if component.component_type != GRID_TYPE => {
            return MutationStatus::Rejected
        }
        Some(_) => {}
    }

    ctx.update_component(
        grid_id,
        Props::new().with(NUM_COLS_KEY, cols).with(NUM_ROWS_KEY, rows),
    )
}

/// Drag the border between column `index` and `index + 1`.
///
/// `left_px` and `right_px` are the measured widths of the two columns after
/// the drag; their combined fraction is split in the same proportion.
pub fn resize_columns(
    ctx: &mut dyn MutationContext,
    grid_id: ComponentId,
    index: usize,
    left_px: f64,
    right_px: f64,
) -> MutationStatus {
    let Some(component) = ctx.get_component(grid_id) else {
        return MutationStatus::NotFound;
    };
    if component.component_type != GRID_TYPE {
        return MutationStatus::Rejected;
    }

    let cols = num_cols(&component.props);
    let total_px = left_px + right_px;
    if index + 1 >= cols || left_px < 0.0 || right_px < 0.0 || total_px <= 0.0 || !total_px.is_finite() {
        tracing::debug!(grid_id, index, left_px, right_px, "column resize ignored");
        return MutationStatus::Rejected;
    }

    let mut widths = normalize_widths(&col_widths(&component.props), cols);
    let pair = widths[index] + widths[index + 1];
    widths[index] = pair * left_px / total_px;
    widths[index + 1] = pair - widths[index];

    ctx.update_component(grid_id, Props::new().with(COL_WIDTHS_KEY, json!(widths)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use pagebuilder_model::grid::{cell_count, PER_COLUMN_KEYS};
    use pagebuilder_model::{Component, GridContents, IdGenerator};

    use crate::registry::ComponentRegistry;
    use crate::{blocks, TreeContext};

    fn context() -> TreeContext {
        let mut cells = GridContents::new();
        cells.insert(0, vec![Arc::new(blocks::text(2))]);
        cells.insert(1, vec![Arc::new(blocks::divider(3))]);

        TreeContext::new(Arc::new(ComponentRegistry::builtin()))
            .with_id_generator(Arc::new(IdGenerator::starting_at(10)))
            .with_components(vec![Arc::new(blocks::column(1).with_grid_contents(cells))])
    }

    fn grid(ctx: &TreeContext) -> Arc<Component> {
        ctx.get_component(1).unwrap()
    }

    #[test]
    fn test_grow_fills_per_column_arrays() {
        let mut ctx = context();

        assert_eq!(set_dimensions(&mut ctx, 1, 3, 2), MutationStatus::Applied);

        let grid = grid(&ctx);
        assert_eq!(cell_count(&grid.props), 6);
        for key in PER_COLUMN_KEYS {
            assert_eq!(grid.props.get_array(key).map(Vec::len), Some(3), "{key}");
        }
        let sum: f64 = col_widths(&grid.props).iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_shrink_drops_out_of_bounds_cells() {
        let mut ctx = context();

        assert_eq!(set_dimensions(&mut ctx, 1, 1, 1), MutationStatus::Applied);
        assert!(ctx.get_component(2).is_some());
        assert!(ctx.get_component(3).is_none());
        assert_eq!(col_widths(&grid(&ctx).props), vec![1.0]);
    }

    #[test]
    fn test_set_dimensions_validation() {
        let mut ctx = context();

        assert_eq!(set_dimensions(&mut ctx, 1, 0, 1), MutationStatus::Rejected);
        assert_eq!(set_dimensions(&mut ctx, 2, 2, 2), MutationStatus::Rejected);
        assert_eq!(set_dimensions(&mut ctx, 42, 2, 2), MutationStatus::NotFound);
        assert_eq!(ctx.version(), 0);
    }

    #[test]
    fn test_resize_columns_splits_pair() {
        let mut ctx = context();

        assert_eq!(resize_columns(&mut ctx, 1, 0, 300.0, 100.0), MutationStatus::Applied);
        assert_eq!(col_widths(&grid(&ctx).props), vec![0.75, 0.25]);

        assert_eq!(resize_columns(&mut ctx, 1, 1, 50.0, 50.0), MutationStatus::Rejected);
        assert_eq!(resize_columns(&mut ctx, 1, 0, 0.0, 0.0), MutationStatus::Rejected);
    }
}
