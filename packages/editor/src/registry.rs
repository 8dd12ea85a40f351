//! # Component Registry
//!
//! Maps a type tag to the recipe for that block: a label for the palette, a
//! factory producing a fresh instance, and an opaque renderer capability the
//! host attaches and later downcasts. The registry itself never looks inside
//! the renderer.
//!
//! Palette order is insertion order. Registering a tag twice replaces the
//! definition in place, so overrides keep the slot of the block they replace.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use pagebuilder_model::{Component, ComponentId, IdGenerator};

use crate::blocks;

pub type Factory = Arc<dyn Fn(ComponentId) -> Component + Send + Sync>;
pub type Renderer = Arc<dyn Any + Send + Sync>;

#[derive(Clone)]
pub struct ComponentDefinition {
    pub component_type: String,
    pub label: String,
    create: Factory,
    renderer: Option<Renderer>,
}

impl ComponentDefinition {
    pub fn new<F>(component_type: impl Into<String>, label: impl Into<String>, create: F) -> Self
    where
        F: Fn(ComponentId) -> Component + Send + Sync + 'static,
    {
        Self {
            component_type: component_type.into(),
            label: label.into(),
            create: Arc::new(create),
            renderer: None,
        }
    }

    pub fn with_renderer<R: Any + Send + Sync>(mut self, renderer: R) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Run the factory for a component that will carry `id`.
    pub fn create(&self, id: ComponentId) -> Component {
        (self.create)(id)
    }

    pub fn renderer(&self) -> Option<&Renderer> {
        self.renderer.as_ref()
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("component_type", &self.component_type)
            .field("label", &self.label)
            .field("has_renderer", &self.renderer.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    definitions: IndexMap<String, ComponentDefinition>,
}

impl ComponentRegistry {
    pub fn new(definitions: impl IntoIterator<Item = ComponentDefinition>) -> Self {
        let mut registry = Self::default();
        for definition in definitions {
            registry.register(definition);
        }
        registry
    }

    /// The eight built-in blocks.
    pub fn builtin() -> Self {
        Self::new(blocks::builtin_definitions())
    }

    /// Built-ins, then host `additional` definitions, then minus `excluded` tags.
    pub fn setup<S: AsRef<str>>(
        additional: impl IntoIterator<Item = ComponentDefinition>,
        excluded: &[S],
    ) -> Self {
        let mut registry = Self::builtin();
        for definition in additional {
            registry.register(definition);
        }
        for component_type in excluded {
            registry.exclude(component_type.as_ref());
        }
        registry
    }

    pub fn register(&mut self, definition: ComponentDefinition) {
        let replaced = self
            .definitions
            .insert(definition.component_type.clone(), definition);
        if let Some(previous) = replaced {
            tracing::debug!(
                component_type = previous.component_type.as_str(),
                "definition overridden"
            );
        }
    }

    pub fn exclude(&mut self, component_type: &str) -> Option<ComponentDefinition> {
        self.definitions.shift_remove(component_type)
    }

    pub fn get_definition(&self, component_type: &str) -> Option<&ComponentDefinition> {
        self.definitions.get(component_type)
    }

    pub fn list_definitions(&self) -> impl Iterator<Item = &ComponentDefinition> {
        self.definitions.values()
    }

    pub fn contains(&self, component_type: &str) -> bool {
        self.definitions.contains_key(component_type)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Fresh instance of `component_type`. Unknown types allocate no id.
    pub fn create_component(&self, component_type: &str, ids: &IdGenerator) -> Option<Component> {
        let definition = self.get_definition(component_type)?;
        Some(definition.create(ids.next_id()))
    }

    /// Host renderer attached to `component_type`, if it is an `R`.
    pub fn renderer<R: Any + Send + Sync>(&self, component_type: &str) -> Option<Arc<R>> {
        let renderer = Arc::clone(self.get_definition(component_type)?.renderer()?);
        renderer.downcast::<R>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagebuilder_model::Props;

    fn custom(component_type: &str, label: &str) -> ComponentDefinition {
        let tag = component_type.to_string();
        ComponentDefinition::new(component_type, label, move |id| {
            Component::new(id, tag.as_str(), Props::new())
        })
    }

    fn tags(registry: &ComponentRegistry) -> Vec<&str> {
        registry
            .list_definitions()
            .map(|d| d.component_type.as_str())
            .collect()
    }

    #[test]
    fn test_builtin_order() {
        let registry = ComponentRegistry::builtin();
        assert_eq!(
            tags(&registry),
            vec!["text", "heading", "divider", "image", "html", "column", "alert", "parallax"]
        );
    }

    #[test]
    fn test_setup_additions_overrides_and_exclusions() {
        let registry = ComponentRegistry::setup(
            vec![custom("video", "Video"), custom("text", "Rich Text")],
            &["html", "alert"],
        );

        assert_eq!(
            tags(&registry),
            vec!["text", "heading", "divider", "image", "column", "parallax", "video"]
        );
        assert_eq!(registry.get_definition("text").unwrap().label, "Rich Text");
        assert!(!registry.contains("html"));
    }

    #[test]
    fn test_create_component_allocates_only_when_known() {
        let registry = ComponentRegistry::builtin();
        let ids = IdGenerator::starting_at(10);

        assert!(registry.create_component("nope", &ids).is_none());
        assert_eq!(ids.peek(), 10);

        let divider = registry.create_component("divider", &ids).unwrap();
        assert_eq!(divider.id, 10);
        assert_eq!(divider.component_type, "divider");
        assert_eq!(ids.peek(), 11);
    }

    #[test]
    fn test_renderer_downcast() {
        struct HtmlRenderer(&'static str);

        let registry = ComponentRegistry::new(vec![
            custom("hero", "Hero").with_renderer(HtmlRenderer("<section/>"))
        ]);

        let renderer = registry.renderer::<HtmlRenderer>("hero").unwrap();
        assert_eq!(renderer.0, "<section/>");
        assert!(registry.renderer::<String>("hero").is_none());
        assert!(registry.renderer::<HtmlRenderer>("missing").is_none());
    }
}
