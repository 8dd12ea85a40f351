//! # Page Builder Model
//!
//! Data model and pure tree functions for the page builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: Forest of components                 │
//! │  - Component { id, type, props }            │
//! │  - Two container shapes: grid cells and     │
//! │    parallax layers                          │
//! │  - deep_update / deep_delete /              │
//! │    ensure_unique_ids                        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: registry, mutation contexts,        │
//! │ scoped projections, drop resolution         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Immutable by replacement**: every mutation returns a new forest
//! 2. **Structural sharing**: untouched subtrees keep their `Arc`
//! 3. **Global id uniqueness**: enforced at import, assumed everywhere else
//! 4. **Total functions**: well-formed input always yields well-formed output
//!
//! ## Usage
//!
//! ```rust
//! use pagebuilder_model::{forest_from_str, tree, IdGenerator, Props};
//!
//! let forest = forest_from_str(r#"[{"id": 1, "type": "text", "props": {"content": "Hi"}}]"#)?;
//! let forest = tree::ensure_unique_ids(&forest, &IdGenerator::starting_at(100));
//! let forest = tree::deep_update(&forest, 1, &Props::new().with("content", "Hello"));
//! assert_eq!(forest[0].props.get_str("content"), Some("Hello"));
//! # Ok::<(), pagebuilder_model::ImportError>(())
//! ```

mod component;
mod container;
mod error;
pub mod grid;
mod id_generator;
mod payload;
pub mod tree;

pub use component::{Component, ComponentId, ComponentRef, Forest, PropValue, Props};
pub use container::{
    ContainerKind, GridContents, ParallaxLayer, GRID_CONTENTS_KEY, GRID_TYPE, PAGES_KEY,
    PARALLAX_TYPE,
};
pub use error::{ImportError, ImportResult};
pub use id_generator::IdGenerator;
pub use payload::{forest_from_str, forest_from_value, forest_to_value, PageData};
