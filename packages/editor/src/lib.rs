//! # Page Builder Editor
//!
//! Editing engine for the page builder's nested component tree.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: Forest, tree functions, grid rules   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor                                      │
//! │  - ComponentRegistry: type tag → factory    │
//! │  - TreeContext: owns the forest, commits    │
//! │  - ScopedContext: one cell / one layer      │
//! │  - InsertionPolicy: may X go into Y?        │
//! │  - DragSession: drop → one mutation path    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ host: renderer, palette, wasm bindings      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Single source of truth**: only the root context holds the forest
//! 2. **Locality**: a nested block edits through a projection that knows
//!    only its own container
//! 3. **Silent no-ops**: stale ids and refused placements report a status,
//!    they never raise
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use pagebuilder_editor::{
//!     ComponentRegistry, MutationContext, MutationStatus, ScopedContext, TreeContext,
//! };
//! use pagebuilder_model::Props;
//!
//! let mut editor = TreeContext::new(Arc::new(ComponentRegistry::builtin()));
//! editor.add_component("column", None);
//! let grid_id = editor.components()[0].id;
//!
//! let mut cell = ScopedContext::grid_cell(&mut editor, grid_id, 1);
//! let text = Arc::new(cell.create_component("text").unwrap());
//! let text_id = text.id;
//! cell.insert_child(text, None);
//!
//! let status = ScopedContext::grid_cell(&mut editor, grid_id, 1)
//!     .update_component(text_id, Props::new().with("content", "Hello"));
//! assert_eq!(status, MutationStatus::Applied);
//! ```

pub mod blocks;
pub mod config;
pub mod context;
pub mod drag;
pub mod errors;
pub mod grid;
pub mod parallax;
pub mod policy;
pub mod registry;
pub mod scoped;
pub mod tree_context;

pub use config::{ConfigError, EditorConfig, DEFAULT_CONFIG_NAME};
pub use context::{EditorFlags, MutationContext, MutationStatus};
pub use drag::{resolve_drop, reorder_root, DragPayload, DragSession, DropTarget};
pub use errors::EditorError;
pub use parallax::ZDirection;
pub use policy::{AllowAll, InsertionPolicy, PlacementRules};
pub use registry::{ComponentDefinition, ComponentRegistry};
pub use scoped::{Locator, ScopedContext};
pub use tree_context::{SubscriptionId, TreeContext};
