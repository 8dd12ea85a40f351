//! # Tree functions
//!
//! Pure functions over a [`Forest`], recursing into grid cells and parallax
//! layers at any depth.
//!
//! ## Structural sharing
//!
//! Only the ancestors of a changed node are rebuilt. Every other node keeps
//! its `Arc`, so `Arc::ptr_eq` against the previous forest tells a renderer
//! which subtrees it can skip.
//!
//! ## Semantics
//!
//! - `deep_update`: first match only, shallow props merge
//! - `deep_delete`: removes the node (and so its subtree) from whichever array holds it
//! - `ensure_unique_ids`: depth-first, array order; first occurrence keeps its id

use std::collections::HashSet;
use std::sync::Arc;

use crate::component::{Component, ComponentId, ComponentRef, Forest, Props};
use crate::container::{ContainerKind, GridContents, ParallaxLayer};
use crate::id_generator::IdGenerator;

/// `forest` with the props of component `id` shallow-merged with `patch`.
///
/// Unknown ids return an element-wise identical forest.
pub fn deep_update(forest: &[ComponentRef], id: ComponentId, patch: &Props) -> Forest {
    try_update(forest, id, patch).unwrap_or_else(|| forest.to_vec())
}

/// Like [`deep_update`], but `None` when `id` is not in the forest.
pub fn try_update(forest: &[ComponentRef], id: ComponentId, patch: &Props) -> Option<Forest> {
    for (index, item) in forest.iter().enumerate() {
        let replacement = if item.id == id {
            Some(item.with_patch(patch))
        } else {
            rewrite_children(item, true, |children| try_update(children, id, patch))
        };

        if let Some(replacement) = replacement {
            let mut next = forest.to_vec();
            next[index] = Arc::new(replacement);
            return Some(next);
        }
    }
    None
}

/// `forest` without component `id` (and everything it contained).
pub fn deep_delete(forest: &[ComponentRef], id: ComponentId) -> Forest {
    try_delete(forest, id).unwrap_or_else(|| forest.to_vec())
}

/// Like [`deep_delete`], but `None` when `id` is not in the forest.
pub fn try_delete(forest: &[ComponentRef], id: ComponentId) -> Option<Forest> {
    let mut changed = false;
    let mut next = Vec::with_capacity(forest.len());

    for item in forest {
        if item.id == id {
            changed = true;
            continue;
        }

        match rewrite_children(item, false, |children| try_delete(children, id)) {
            Some(rewritten) => {
                changed = true;
                next.push(Arc::new(rewritten));
            }
            None => next.push(Arc::clone(item)),
        }
    }

    changed.then_some(next)
}

/// Rebuild `component` with each child array passed through `rewrite`.
///
/// `rewrite` returns `None` for arrays it leaves alone. With `first_only`
/// the walk stops at the first array that changed. Returns `None` when no
/// array changed.
fn rewrite_children<F>(component: &Component, first_only: bool, mut rewrite: F) -> Option<Component>
where
    F: FnMut(&[ComponentRef]) -> Option<Forest>,
{
    match component.container() {
        ContainerKind::Grid(cells) => {
            let mut next: Option<GridContents> = None;
            for (&cell, children) in cells {
                if let Some(rewritten) = rewrite(children) {
                    next.get_or_insert_with(|| cells.clone()).insert(cell, rewritten);
                    if first_only {
                        break;
                    }
                }
            }
            next.map(|cells| component.with_grid_contents(cells))
        }
        ContainerKind::Layers(layers) => {
            let mut next: Option<Vec<ParallaxLayer>> = None;
            for (index, layer) in layers.iter().enumerate() {
                if let Some(rewritten) = rewrite(&layer.components) {
                    next.get_or_insert_with(|| layers.to_vec())[index].components = rewritten;
                    if first_only {
                        break;
                    }
                }
            }
            next.map(|layers| component.with_pages(layers))
        }
        ContainerKind::None => None,
    }
}

/// Give every component a forest-wide unique, non-zero id.
///
/// The first occurrence of an id keeps it. Zero or repeated ids get a fresh
/// id from `ids` that collides with nothing in the input nor anything
/// assigned during the walk. Layer ids are made unique within each parallax
/// component the same way.
pub fn ensure_unique_ids(forest: &[ComponentRef], ids: &IdGenerator) -> Forest {
    let present: HashSet<ComponentId> = collect_ids(forest).into_iter().collect();
    if let Some(&max) = present.iter().max() {
        ids.reserve_through(max);
    }

    let mut walker = UniqueIds {
        ids,
        present,
        seen: HashSet::new(),
    };
    walker.visit(forest)
}

struct UniqueIds<'a> {
    ids: &'a IdGenerator,
    present: HashSet<ComponentId>,
    seen: HashSet<ComponentId>,
}

impl UniqueIds<'_> {
    fn visit(&mut self, items: &[ComponentRef]) -> Forest {
        items.iter().map(|item| self.visit_component(item)).collect()
    }

    fn visit_component(&mut self, item: &ComponentRef) -> ComponentRef {
        let id = self.claim(item.id);

        let rewritten = match item.container() {
            ContainerKind::Grid(cells) => {
                let next: GridContents = cells
                    .iter()
                    .map(|(&cell, children)| (cell, self.visit(children)))
                    .collect();
                let unchanged = cells
                    .iter()
                    .all(|(cell, children)| same_refs(children, &next[cell]));
                (!unchanged).then(|| item.with_grid_contents(next))
            }
            ContainerKind::Layers(layers) => {
                let mut layer_ids = HashSet::new();
                let next: Vec<ParallaxLayer> = layers
                    .iter()
                    .map(|layer| {
                        let mut layer = layer.clone();
                        while layer.id == 0 || !layer_ids.insert(layer.id) {
                            layer.id = self.ids.next_id();
                        }
                        layer.components = self.visit(&layer.components);
                        layer
                    })
                    .collect();
                let unchanged = layers.iter().zip(&next).all(|(before, after)| {
                    before.id == after.id && same_refs(&before.components, &after.components)
                });
                (!unchanged).then(|| item.with_pages(next))
            }
            ContainerKind::None => None,
        };

        match rewritten {
            Some(component) => Arc::new(component.with_id(id)),
            None if id != item.id => Arc::new(item.with_id(id)),
            None => Arc::clone(item),
        }
    }

    fn claim(&mut self, id: ComponentId) -> ComponentId {
        if id != 0 && self.seen.insert(id) {
            return id;
        }
        loop {
            let fresh = self.ids.next_id();
            if !self.present.contains(&fresh) && self.seen.insert(fresh) {
                return fresh;
            }
        }
    }
}

fn same_refs(a: &[ComponentRef], b: &[ComponentRef]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
}

/// Depth-first search for component `id`.
pub fn find_component(forest: &[ComponentRef], id: ComponentId) -> Option<ComponentRef> {
    for item in forest {
        if item.id == id {
            return Some(Arc::clone(item));
        }
        for children in item.container().child_arrays() {
            if let Some(found) = find_component(children, id) {
                return Some(found);
            }
        }
    }
    None
}

pub fn contains(forest: &[ComponentRef], id: ComponentId) -> bool {
    find_component(forest, id).is_some()
}

/// Every component in depth-first, array order.
pub fn walk<'a>(forest: &'a [ComponentRef], visit: &mut impl FnMut(&'a ComponentRef, usize)) {
    walk_at(forest, 0, visit);
}

fn walk_at<'a>(
    forest: &'a [ComponentRef],
    depth: usize,
    visit: &mut impl FnMut(&'a ComponentRef, usize),
) {
    for item in forest {
        visit(item, depth);
        for children in item.container().child_arrays() {
            walk_at(children, depth + 1, visit);
        }
    }
}

/// Ids of every component, in walk order (duplicates included).
pub fn collect_ids(forest: &[ComponentRef]) -> Vec<ComponentId> {
    let mut ids = Vec::new();
    walk(forest, &mut |component, _| ids.push(component.id));
    ids
}

pub fn max_id(forest: &[ComponentRef]) -> Option<ComponentId> {
    collect_ids(forest).into_iter().max()
}

/// Total number of components at every depth.
pub fn count(forest: &[ComponentRef]) -> usize {
    let mut total = 0;
    walk(forest, &mut |_, _| total += 1);
    total
}
