//! # Scoped Context
//!
//! A [`MutationContext`] projected onto one sub-collection of a container:
//! a single grid cell or a single parallax layer.
//!
//! ```text
//! TreeContext (root forest)
//!   └─ ScopedContext { GridCell { container_id: 2, cell_index: 0 } }
//!        └─ ScopedContext { ParallaxLayer { container_id: 4, layer_index: 1 } }
//! ```
//!
//! Updates and deletes search only the projected children, rewrite that one
//! array and hand the container's new `gridContents` / `pages` to the parent
//! as an ordinary update. Each level therefore only knows its own container;
//! the root applies the change as a single transition. Everything else
//! delegates to the parent unchanged.

use pagebuilder_model::{
    grid, tree, Component, ComponentId, ComponentRef, Forest, Props, GRID_CONTENTS_KEY, GRID_TYPE,
    PAGES_KEY, PARALLAX_TYPE,
};

use crate::context::{insert_clamped, EditorFlags, MutationContext, MutationStatus};

/// Which sub-collection of which container a [`ScopedContext`] sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    GridCell {
        container_id: ComponentId,
        cell_index: usize,
    },
    ParallaxLayer {
        container_id: ComponentId,
        layer_index: usize,
    },
}

impl Locator {
    pub fn container_id(&self) -> ComponentId {
        match *self {
            Locator::GridCell { container_id, .. } | Locator::ParallaxLayer { container_id, .. } => {
                container_id
            }
        }
    }
}

pub struct ScopedContext<'a> {
    parent: &'a mut dyn MutationContext,
    locator: Locator,
}

impl<'a> ScopedContext<'a> {
    pub fn new(parent: &'a mut dyn MutationContext, locator: Locator) -> Self {
        Self { parent, locator }
    }

    pub fn grid_cell(
        parent: &'a mut dyn MutationContext,
        container_id: ComponentId,
        cell_index: usize,
    ) -> Self {
        Self::new(
            parent,
            Locator::GridCell {
                container_id,
                cell_index,
            },
        )
    }

    pub fn parallax_layer(
        parent: &'a mut dyn MutationContext,
        container_id: ComponentId,
        layer_index: usize,
    ) -> Self {
        Self::new(
            parent,
            Locator::ParallaxLayer {
                container_id,
                layer_index,
            },
        )
    }

    pub fn locator(&self) -> Locator {
        self.locator
    }

    /// Current children of the projected sub-collection, read through the
    /// parent so a chain of projections never sees a stale container.
    pub fn children(&self) -> Forest {
        let Some(container) = self.parent.get_component(self.locator.container_id()) else {
            return Vec::new();
        };

        match self.locator {
            Locator::GridCell { cell_index, .. } => grid::cells_of(&container)
                .and_then(|mut cells| cells.remove(&cell_index))
                .unwrap_or_default(),
            Locator::ParallaxLayer { layer_index, .. } => container
                .props
                .pages()
                .and_then(|layers| layers.get(layer_index))
                .map(|layer| layer.components.clone())
                .unwrap_or_default(),
        }
    }

    /// Insert `component` into the projected sub-collection at `index`
    /// (clamped) or at the end, subject to the insertion policy.
    pub fn insert_child(&mut self, component: ComponentRef, index: Option<usize>) -> MutationStatus {
        let destination = match self.locator {
            Locator::GridCell { .. } => GRID_TYPE,
            Locator::ParallaxLayer { .. } => PARALLAX_TYPE,
        };
        if !self
            .parent
            .allow_component_to_be_added(&component.component_type, Some(destination))
        {
            tracing::warn!(
                component_type = component.component_type.as_str(),
                locator = ?self.locator,
                "component not allowed in container"
            );
            return MutationStatus::Denied;
        }

        self.rewrite(|children| {
            let mut next = children.to_vec();
            insert_clamped(&mut next, index, component);
            Some(next)
        })
    }

    /// Pass the projected children through `rewrite` and forward the
    /// container's new value to the parent. `None` from `rewrite` means the
    /// target is not in this scope.
    fn rewrite<F>(&mut self, rewrite: F) -> MutationStatus
    where
        F: FnOnce(&[ComponentRef]) -> Option<Forest>,
    {
        let container_id = self.locator.container_id();
        let Some(container) = self.parent.get_component(container_id) else {
            tracing::debug!(container_id, "scoped container not found");
            return MutationStatus::NotFound;
        };

        let patch = match self.locator {
            Locator::GridCell { cell_index, .. } => {
                let Some(mut cells) = grid::cells_of(&container) else {
                    return MutationStatus::NotFound;
                };
                if cell_index >= grid::cell_count(&container.props) {
                    tracing::debug!(container_id, cell_index, "cell outside grid bounds");
                    return MutationStatus::Rejected;
                }
                let current = cells.get(&cell_index).map(Vec::as_slice).unwrap_or(&[]);
                let Some(next) = rewrite(current) else {
                    return MutationStatus::NotFound;
                };
                cells.insert(cell_index, next);
                Props::new().with(GRID_CONTENTS_KEY, cells)
            }
            Locator::ParallaxLayer { layer_index, .. } => {
                let Some(layers) = container.props.pages() else {
                    return MutationStatus::NotFound;
                };
                let Some(layer) = layers.get(layer_index) else {
                    return MutationStatus::NotFound;
                };
                let Some(next) = rewrite(&layer.components) else {
                    return MutationStatus::NotFound;
                };
                let mut layers = layers.to_vec();
                layers[layer_index].components = next;
                Props::new().with(PAGES_KEY, layers)
            }
        };

        self.parent.update_component(container_id, patch)
    }
}

impl MutationContext for ScopedContext<'_> {
    fn components(&self) -> &[ComponentRef] {
        self.parent.components()
    }

    fn set_components(&mut self, components: Forest) {
        self.parent.set_components(components);
    }

    fn get_component(&self, id: ComponentId) -> Option<ComponentRef> {
        tree::find_component(&self.children(), id)
    }

    fn update_component(&mut self, id: ComponentId, patch: Props) -> MutationStatus {
        let status = self.rewrite(|children| tree::try_update(children, id, &patch));
        if status == MutationStatus::NotFound {
            tracing::debug!(component_id = id, locator = ?self.locator, "scoped update skipped");
        }
        status
    }

    fn delete_component(&mut self, id: ComponentId) -> MutationStatus {
        let status = self.rewrite(|children| tree::try_delete(children, id));
        if status == MutationStatus::NotFound {
            tracing::debug!(component_id = id, locator = ?self.locator, "scoped delete skipped");
        }
        status
    }

    fn add_component(&mut self, component_type: &str, index: Option<usize>) -> MutationStatus {
        self.parent.add_component(component_type, index)
    }

    fn move_component_to_root(&mut self, component: ComponentRef, index: usize) -> MutationStatus {
        self.parent.move_component_to_root(component, index)
    }

    fn create_component(&self, component_type: &str) -> Option<Component> {
        self.parent.create_component(component_type)
    }

    fn allow_component_to_be_added(&self, component_type: &str, destination: Option<&str>) -> bool {
        self.parent.allow_component_to_be_added(component_type, destination)
    }

    fn flags(&self) -> &EditorFlags {
        self.parent.flags()
    }

    fn flags_mut(&mut self) -> &mut EditorFlags {
        self.parent.flags_mut()
    }

    fn is_nested(&self) -> bool {
        true
    }
}

impl std::fmt::Debug for ScopedContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedContext")
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}
