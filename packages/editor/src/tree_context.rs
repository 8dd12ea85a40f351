//! # Tree Context
//!
//! Root editing context. Owns the forest as the single source of truth and
//! applies every mutation as one state transition:
//!
//! ```text
//! request → policy / registry checks → tree function → commit
//!                                                     ├─ version += 1
//!                                                     └─ notify subscribers
//! ```
//!
//! Requests that change nothing (unknown id, denied placement, unknown type)
//! return early and neither bump the version nor notify.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use pagebuilder_model::{
    forest_from_value, tree, Component, ComponentId, ComponentRef, Forest, IdGenerator,
    ImportError, PageData, Props,
};

use crate::config::EditorConfig;
use crate::context::{insert_clamped, EditorFlags, MutationContext, MutationStatus};
use crate::policy::{AllowAll, InsertionPolicy};
use crate::registry::ComponentRegistry;

/// Handle returned by [`TreeContext::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

type Listener = Box<dyn FnMut(&[ComponentRef])>;

pub struct TreeContext {
    components: Forest,
    registry: Arc<ComponentRegistry>,
    policy: Arc<dyn InsertionPolicy>,
    ids: Arc<IdGenerator>,
    flags: EditorFlags,

    /// Increments on each committed state transition
    version: u64,

    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: usize,

    class_name: Option<String>,
    style: Option<Map<String, Value>>,
}

impl TreeContext {
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        Self {
            components: Vec::new(),
            registry,
            policy: Arc::new(AllowAll),
            ids: IdGenerator::global(),
            flags: EditorFlags::default(),
            version: 0,
            listeners: Vec::new(),
            next_subscription: 0,
            class_name: None,
            style: None,
        }
    }

    /// Built-in registry minus `excludedComponents`, placement rules as the
    /// policy, page-level class and style carried into exports.
    pub fn from_config(config: &EditorConfig) -> Self {
        let registry = ComponentRegistry::setup(Vec::new(), &config.excluded_components);
        let mut context = Self::new(Arc::new(registry))
            .with_policy(config.placement_rules.clone());
        context.flags.read_only = config.read_only;
        context.class_name = config.class_name.clone();
        context.style = config.style.clone();
        context
    }

    pub fn with_policy(mut self, policy: impl InsertionPolicy + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Initial forest. Ids are taken as-is; the generator is moved past them.
    pub fn with_components(mut self, components: Forest) -> Self {
        if let Some(max) = tree::max_id(&components) {
            self.ids.reserve_through(max);
        }
        self.components = components;
        self
    }

    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    pub fn ids(&self) -> &Arc<IdGenerator> {
        &self.ids
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Call `listener` with the new forest after every committed transition.
    pub fn subscribe(&mut self, listener: impl FnMut(&[ComponentRef]) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Replace the forest with a persisted payload (bare array or
    /// `{ "components": [...] }`), repairing duplicate and missing ids.
    pub fn import_json(&mut self, payload: Value) -> Result<(), ImportError> {
        let (class_name, style) = match &payload {
            Value::Object(object) => (
                object.get("className").and_then(Value::as_str).map(str::to_string),
                object.get("style").and_then(Value::as_object).cloned(),
            ),
            _ => (None, None),
        };

        let forest = forest_from_value(payload)?;
        let forest = tree::ensure_unique_ids(&forest, &self.ids);

        tracing::debug!(components = tree::count(&forest), "imported forest");

        if class_name.is_some() {
            self.class_name = class_name;
        }
        if style.is_some() {
            self.style = style;
        }
        self.commit(forest);
        Ok(())
    }

    pub fn import_json_str(&mut self, payload: &str) -> Result<(), ImportError> {
        self.import_json(serde_json::from_str(payload)?)
    }

    pub fn export_data(&self) -> PageData {
        PageData {
            components: self.components.clone(),
            class_name: self.class_name.clone(),
            style: self.style.clone(),
        }
    }

    /// `{ components, className?, style? }`
    pub fn export_json(&self) -> Value {
        serde_json::to_value(self.export_data()).unwrap_or(Value::Null)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.export_data())
    }

    fn commit(&mut self, next: Forest) {
        self.components = next;
        self.version += 1;

        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.components);
        }
    }
}

impl MutationContext for TreeContext {
    fn components(&self) -> &[ComponentRef] {
        &self.components
    }

    fn set_components(&mut self, components: Forest) {
        self.commit(components);
    }

    fn get_component(&self, id: ComponentId) -> Option<ComponentRef> {
        tree::find_component(&self.components, id)
    }

    fn update_component(&mut self, id: ComponentId, patch: Props) -> MutationStatus {
        match tree::try_update(&self.components, id, &patch) {
            Some(next) => {
                self.commit(next);
                MutationStatus::Applied
            }
            None => {
                tracing::debug!(component_id = id, "update skipped: component not found");
                MutationStatus::NotFound
            }
        }
    }

    fn delete_component(&mut self, id: ComponentId) -> MutationStatus {
        match tree::try_delete(&self.components, id) {
            Some(next) => {
                self.commit(next);
                MutationStatus::Applied
            }
            None => {
                tracing::debug!(component_id = id, "delete skipped: component not found");
                MutationStatus::NotFound
            }
        }
    }

    fn add_component(&mut self, component_type: &str, index: Option<usize>) -> MutationStatus {
        if !self.allow_component_to_be_added(component_type, None) {
            tracing::warn!(component_type, "component not allowed at root");
            return MutationStatus::Denied;
        }

        let Some(component) = self.create_component(component_type) else {
            tracing::debug!(component_type, "add skipped: unknown component type");
            return MutationStatus::UnknownType;
        };

        let mut next = self.components.clone();
        insert_clamped(&mut next, index, Arc::new(component));
        self.commit(next);
        MutationStatus::Applied
    }

    fn move_component_to_root(&mut self, component: ComponentRef, index: usize) -> MutationStatus {
        if !self.allow_component_to_be_added(&component.component_type, None) {
            tracing::warn!(
                component_id = component.id,
                component_type = component.component_type.as_str(),
                "component not allowed at root"
            );
            return MutationStatus::Denied;
        }

        let mut next = tree::deep_delete(&self.components, component.id);
        insert_clamped(&mut next, Some(index), component);
        self.commit(next);
        MutationStatus::Applied
    }

    fn create_component(&self, component_type: &str) -> Option<Component> {
        self.registry.create_component(component_type, &self.ids)
    }

    fn allow_component_to_be_added(&self, component_type: &str, destination: Option<&str>) -> bool {
        self.policy.allow(component_type, destination)
    }

    fn flags(&self) -> &EditorFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut EditorFlags {
        &mut self.flags
    }
}

impl fmt::Debug for TreeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeContext")
            .field("components", &self.components.len())
            .field("version", &self.version)
            .field("flags", &self.flags)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
