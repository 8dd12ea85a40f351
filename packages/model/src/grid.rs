//! # Grid reconciliation
//!
//! Keeps a `column` component's per-column arrays, width fractions and cell
//! map consistent with its `numCols` / `numRows`.
//!
//! ## Invariant
//!
//! - every per-column array has exactly `numCols` entries
//! - `colWidths` sums to 1 (uniform when the previous widths sum to zero)
//! - `gridContents` holds no cell index `>= numRows * numCols`
//! - `numCols` and `numRows` never exceed [`MAX_GRID_DIMENSION`]
//!
//! [`reconcile`] restores the invariant and is idempotent: on an already
//! consistent grid it returns `None`.

use serde_json::{json, Value};

use crate::component::{Component, Props};
use crate::container::{GridContents, GRID_CONTENTS_KEY, GRID_TYPE};

pub const NUM_COLS_KEY: &str = "numCols";
pub const NUM_ROWS_KEY: &str = "numRows";
pub const COL_WIDTHS_KEY: &str = "colWidths";

/// Per-column cosmetic arrays, kept at `numCols` entries.
pub const PER_COLUMN_KEYS: [&str; 7] = [
    "colClasses",
    "colStyles",
    "colColors",
    "colPaddings",
    "colMargins",
    "colTextColors",
    "colFullHeight",
];

/// Upper bound for `numCols` and `numRows`; larger values are clamped.
pub const MAX_GRID_DIMENSION: usize = 64;

const WIDTH_SUM_TOLERANCE: f64 = 1e-9;

fn pad_value(key: &str) -> Value {
    match key {
        "colClasses" | "colStyles" => json!(""),
        "colPaddings" | "colMargins" => json!({}),
        "colFullHeight" => json!(false),
        _ => Value::Null,
    }
}

fn dimension(props: &Props, key: &str) -> usize {
    props
        .get_u64(key)
        .map_or(1, |n| n.min(MAX_GRID_DIMENSION as u64) as usize)
}

pub fn num_cols(props: &Props) -> usize {
    dimension(props, NUM_COLS_KEY)
}

pub fn num_rows(props: &Props) -> usize {
    dimension(props, NUM_ROWS_KEY)
}

/// Number of addressable cells (`numRows * numCols`).
pub fn cell_count(props: &Props) -> usize {
    num_cols(props).saturating_mul(num_rows(props))
}

pub fn cell_index(row: usize, col: usize, cols: usize) -> usize {
    row * cols + col
}

/// Cells of a `column` component. A grid without `gridContents` reads as
/// empty; any other component type has no cells.
pub fn cells_of(component: &Component) -> Option<GridContents> {
    if component.component_type != GRID_TYPE {
        return None;
    }
    Some(component.props.grid_contents().cloned().unwrap_or_default())
}

/// Width fractions as stored; non-numeric entries read as 0.
pub fn col_widths(props: &Props) -> Vec<f64> {
    props
        .get_array(COL_WIDTHS_KEY)
        .map(|widths| widths.iter().map(|w| w.as_f64().unwrap_or(0.0)).collect())
        .unwrap_or_default()
}

/// Fit `widths` to `cols` entries (padding with 1) and normalize to sum 1.
pub fn normalize_widths(widths: &[f64], cols: usize) -> Vec<f64> {
    let mut fitted: Vec<f64> = widths.iter().copied().take(cols).collect();
    fitted.resize(cols, 1.0);

    let total: f64 = fitted.iter().sum();
    if fitted.len() == widths.len() && (total - 1.0).abs() < WIDTH_SUM_TOLERANCE {
        return fitted;
    }

    if total > 0.0 && total.is_finite() {
        fitted.iter().map(|w| w / total).collect()
    } else {
        vec![1.0 / cols as f64; cols]
    }
}

/// Patch that restores the grid invariant, or `None` when nothing drifted.
pub fn reconcile(props: &Props) -> Option<Props> {
    let cols = num_cols(props);
    let limit = cell_count(props);
    let mut patch = Props::new();

    for (key, value) in [(NUM_COLS_KEY, cols), (NUM_ROWS_KEY, num_rows(props))] {
        if props.get_u64(key).is_some_and(|raw| raw > value as u64) {
            tracing::warn!(key, clamped = value, "grid dimension clamped");
            patch.insert(key, value);
        }
    }

    for key in PER_COLUMN_KEYS {
        let current = props.get_array(key);
        let mut fitted: Vec<Value> = current
            .map(|values| values.iter().take(cols).cloned().collect())
            .unwrap_or_default();
        fitted.resize(cols, pad_value(key));

        if current != Some(&fitted) {
            patch.insert(key, Value::Array(fitted));
        }
    }

    let current_widths = col_widths(props);
    let widths = normalize_widths(&current_widths, cols);
    if props.get_array(COL_WIDTHS_KEY).is_none() || widths != current_widths {
        patch.insert(COL_WIDTHS_KEY, json!(widths));
    }

    match props.grid_contents() {
        Some(cells) => {
            if cells.keys().any(|&index| index >= limit) {
                let kept: GridContents = cells
                    .iter()
                    .filter(|&(&index, _)| index < limit)
                    .map(|(&index, children)| (index, children.clone()))
                    .collect();
                patch.insert(GRID_CONTENTS_KEY, kept);
            }
        }
        None => {
            patch.insert(GRID_CONTENTS_KEY, GridContents::new());
        }
    }

    (!patch.is_empty()).then_some(patch)
}

/// `props` with [`reconcile`]'s patch applied.
pub fn reconciled(props: &Props) -> Props {
    let mut next = props.clone();
    if let Some(fix) = reconcile(props) {
        next.merge(fix);
    }
    next
}
