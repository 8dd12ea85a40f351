//! # Mutation context
//!
//! The shape every editing context exposes, whether it is the root
//! [`TreeContext`](crate::TreeContext) or a [`ScopedContext`](crate::ScopedContext)
//! projected onto one grid cell or parallax layer.
//!
//! Mutations never raise. They report a [`MutationStatus`] and leave the
//! forest untouched unless the status is `Applied`.

use serde::{Deserialize, Serialize};

use pagebuilder_model::{Component, ComponentId, ComponentRef, Forest, Props};

/// Outcome of a single mutation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationStatus {
    Applied,
    /// No component with that id in the searched scope.
    NotFound,
    /// The insertion policy refused the placement.
    Denied,
    /// The registry has no definition for the type.
    UnknownType,
    /// The request was malformed or the editor state forbids it.
    Rejected,
}

impl MutationStatus {
    pub fn is_applied(self) -> bool {
        self == MutationStatus::Applied
    }
}

/// Transient UI state shared by every context of one editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorFlags {
    pub read_only: bool,
    pub is_dragging: bool,
    pub is_previewing: bool,
    pub active_overlay_id: Option<ComponentId>,
    pub active_settings_id: Option<ComponentId>,
}

pub trait MutationContext {
    /// Root forest of the editor.
    fn components(&self) -> &[ComponentRef];

    /// Replace the root forest wholesale.
    fn set_components(&mut self, components: Forest);

    /// Look up `id` within this context's scope.
    fn get_component(&self, id: ComponentId) -> Option<ComponentRef>;

    fn update_component(&mut self, id: ComponentId, patch: Props) -> MutationStatus;

    fn delete_component(&mut self, id: ComponentId) -> MutationStatus;

    /// Create a `component_type` through the registry and insert it at the
    /// root, at `index` (clamped) or at the end.
    fn add_component(&mut self, component_type: &str, index: Option<usize>) -> MutationStatus;

    /// Remove `component` from wherever it lives and insert it at the root.
    fn move_component_to_root(&mut self, component: ComponentRef, index: usize) -> MutationStatus;

    /// Registry factory with a freshly allocated id; `None` for unknown types.
    fn create_component(&self, component_type: &str) -> Option<Component>;

    /// `destination` is the container type, `None` for the root.
    fn allow_component_to_be_added(&self, component_type: &str, destination: Option<&str>) -> bool;

    fn flags(&self) -> &EditorFlags;

    fn flags_mut(&mut self) -> &mut EditorFlags;

    /// `true` for projections onto a container's sub-collection.
    fn is_nested(&self) -> bool {
        false
    }
}

/// Insert `item` at `index` clamped to `forest.len()`, or append.
pub(crate) fn insert_clamped(forest: &mut Forest, index: Option<usize>, item: ComponentRef) {
    let at = index.map_or(forest.len(), |index| index.min(forest.len()));
    forest.insert(at, item);
}
