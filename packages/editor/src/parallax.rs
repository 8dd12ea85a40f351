//! Parallax layer editing. Every edit goes through the context's update
//! path, so it works the same on the root context and on a projection.

use pagebuilder_model::{ComponentId, ParallaxLayer, Props, PAGES_KEY, PARALLAX_TYPE};

use crate::context::{MutationContext, MutationStatus};

pub const Z_INDEX_KEY: &str = "zIndex";
pub const NEW_LAYER_COLOR: &str = "#ffffff";

/// Depth step between consecutive layers.
const LAYER_DEPTH_STEP: f64 = -2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZDirection {
    Front,
    Back,
}

fn layers_of(ctx: &dyn MutationContext, parallax_id: ComponentId) -> Result<Vec<ParallaxLayer>, MutationStatus> {
    let component = ctx
        .get_component(parallax_id)
        .ok_or(MutationStatus::NotFound)?;
    if component.component_type != PARALLAX_TYPE {
        return Err(MutationStatus::Rejected);
    }
    Ok(component.props.pages().map(<[_]>::to_vec).unwrap_or_default())
}

fn write_layers(ctx: &mut dyn MutationContext, parallax_id: ComponentId, layers: Vec<ParallaxLayer>) -> MutationStatus {
    ctx.update_component(parallax_id, Props::new().with(PAGES_KEY, layers))
}

/// Append a layer below the existing ones.
pub fn add_layer(ctx: &mut dyn MutationContext, parallax_id: ComponentId) -> MutationStatus {
    let mut layers = match layers_of(ctx, parallax_id) {
        Ok(layers) => layers,
        Err(status) => return status,
    };

    let id = layers.iter().map(|layer| layer.id).max().unwrap_or(0) + 1;
    let depth = LAYER_DEPTH_STEP * layers.len() as f64;
    layers.push(
        ParallaxLayer::new(id)
            .with_background_color(NEW_LAYER_COLOR)
            .with_depth(depth),
    );
    write_layers(ctx, parallax_id, layers)
}

/// Drop the layer at `index` together with its components.
pub fn remove_layer(ctx: &mut dyn MutationContext, parallax_id: ComponentId, index: usize) -> MutationStatus {
    let mut layers = match layers_of(ctx, parallax_id) {
        Ok(layers) => layers,
        Err(status) => return status,
    };
    if index >= layers.len() {
        return MutationStatus::NotFound;
    }

    layers.remove(index);
    write_layers(ctx, parallax_id, layers)
}

pub fn update_layer<F>(
    ctx: &mut dyn MutationContext,
    parallax_id: ComponentId,
    index: usize,
    edit: F,
) -> MutationStatus
where
    F: FnOnce(&mut ParallaxLayer),
{
    let mut layers = match layers_of(ctx, parallax_id) {
        Ok(layers) => layers,
        Err(status) => return status,
    };
    let Some(layer) = layers.get_mut(index) else {
        return MutationStatus::NotFound;
    };

    edit(layer);
    write_layers(ctx, parallax_id, layers)
}

/// Raise or lower a positioned child by one step. Lowering stops at 1.
pub fn shift_z_index(ctx: &mut dyn MutationContext, child_id: ComponentId, direction: ZDirection) -> MutationStatus {
    let Some(child) = ctx.get_component(child_id) else {
        return MutationStatus::NotFound;
    };

    let current = child
        .props
        .get_f64(Z_INDEX_KEY)
        .map_or(1, |z| z.round() as i64);
    let next = match direction {
        ZDirection::Front => current + 1,
        ZDirection::Back => (current - 1).max(1),
    };

    ctx.update_component(child_id, Props::new().with(Z_INDEX_KEY, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use pagebuilder_model::{Component, IdGenerator};

    use crate::registry::ComponentRegistry;
    use crate::{blocks, ScopedContext, TreeContext};

    fn context() -> TreeContext {
        let child = Arc::new(Component::new(2, "image", Props::new().with(Z_INDEX_KEY, 1)));
        let parallax = blocks::parallax(1);
        let mut layers = parallax.props.pages().unwrap().to_vec();
        layers[0].components.push(child);

        TreeContext::new(Arc::new(ComponentRegistry::builtin()))
            .with_id_generator(Arc::new(IdGenerator::starting_at(10)))
            .with_components(vec![Arc::new(parallax.with_pages(layers))])
    }

    fn layers(ctx: &TreeContext) -> Vec<ParallaxLayer> {
        ctx.get_component(1).unwrap().props.pages().unwrap().to_vec()
    }

    #[test]
    fn test_add_layer_steps_depth() {
        let mut ctx = context();

        assert_eq!(add_layer(&mut ctx, 1), MutationStatus::Applied);
        assert_eq!(add_layer(&mut ctx, 1), MutationStatus::Applied);

        let layers = layers(&ctx);
        assert_eq!(layers.len(), 3);
        assert_eq!(layers[1].id, 2);
        assert_eq!(layers[1].depth, Some(-2.0));
        assert_eq!(layers[2].depth, Some(-4.0));
        assert_eq!(layers[2].background_color.as_deref(), Some(NEW_LAYER_COLOR));
    }

    #[test]
    fn test_remove_layer_takes_components() {
        let mut ctx = context();
        add_layer(&mut ctx, 1);

        assert_eq!(remove_layer(&mut ctx, 1, 0), MutationStatus::Applied);
        assert!(ctx.get_component(2).is_none());
        assert_eq!(remove_layer(&mut ctx, 1, 5), MutationStatus::NotFound);
    }

    #[test]
    fn test_update_layer() {
        let mut ctx = context();

        let status = update_layer(&mut ctx, 1, 0, |layer| layer.height = 60.0);
        assert_eq!(status, MutationStatus::Applied);
        assert_eq!(layers(&ctx)[0].height, 60.0);
        assert_eq!(layers(&ctx)[0].components.len(), 1);
    }

    #[test]
    fn test_layer_edits_reject_non_parallax() {
        let mut ctx = context();
        ctx.add_component("text", None);

        assert_eq!(add_layer(&mut ctx, 10), MutationStatus::Rejected);
        assert_eq!(add_layer(&mut ctx, 99), MutationStatus::NotFound);
    }

    #[test]
    fn test_shift_z_index_through_layer_scope() {
        let mut ctx = context();
        {
            let mut layer = ScopedContext::parallax_layer(&mut ctx, 1, 0);
            assert_eq!(shift_z_index(&mut layer, 2, ZDirection::Front), MutationStatus::Applied);
            assert_eq!(shift_z_index(&mut layer, 2, ZDirection::Front), MutationStatus::Applied);
        }
        assert_eq!(ctx.get_component(2).unwrap().props.get_u64(Z_INDEX_KEY), Some(3));

        for _ in 0..5 {
            shift_z_index(&mut ctx, 2, ZDirection::Back);
        }
        assert_eq!(ctx.get_component(2).unwrap().props.get_u64(Z_INDEX_KEY), Some(1));
    }
}
