//! # Components and props
//!
//! A component is `{ id, type, props }`. Props are a flat string-keyed map;
//! the only nested components live inside the two container-shaped values
//! (`gridContents` on a `column`, `pages` on a `parallax`), which are held
//! as typed [`PropValue::Cells`] / [`PropValue::Layers`] so tree walks can
//! dispatch on them instead of poking at raw JSON.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::container::{
    is_container_key, ContainerKind, GridContents, ParallaxLayer, GRID_CONTENTS_KEY, GRID_TYPE,
    PAGES_KEY, PARALLAX_TYPE,
};
use crate::grid;

/// Component identifier. Zero means "missing".
pub type ComponentId = u64;

/// Shared handle to an immutable component.
pub type ComponentRef = Arc<Component>;

/// Ordered sequence of root components.
pub type Forest = Vec<ComponentRef>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub id: ComponentId,

    #[serde(rename = "type")]
    pub component_type: String,

    pub props: Props,
}

impl Component {
    pub fn new(id: ComponentId, component_type: impl Into<String>, props: Props) -> Self {
        Self {
            id,
            component_type: component_type.into(),
            props,
        }
    }

    /// Which container shape (if any) this component carries.
    pub fn container(&self) -> ContainerKind<'_> {
        match self.component_type.as_str() {
            GRID_TYPE => match self.props.get(GRID_CONTENTS_KEY) {
                Some(PropValue::Cells(cells)) => ContainerKind::Grid(cells),
                _ => ContainerKind::None,
            },
            PARALLAX_TYPE => match self.props.get(PAGES_KEY) {
                Some(PropValue::Layers(layers)) => ContainerKind::Layers(layers),
                _ => ContainerKind::None,
            },
            _ => ContainerKind::None,
        }
    }

    pub fn is_container(&self) -> bool {
        !matches!(self.container(), ContainerKind::None)
    }

    /// Copy of this component with `patch` shallow-merged into its props.
    ///
    /// Container keys arriving as raw JSON are parsed into their typed shape.
    /// A patch touching `numCols` or `numRows` on a grid also reconciles the
    /// per-column arrays and cell map in the same step.
    pub fn with_patch(&self, patch: &Props) -> Component {
        let mut props = self.props.clone();

        for (key, value) in patch.iter() {
            match value.clone().for_key(&self.component_type, key) {
                Ok(value) => {
                    props.insert(key.clone(), value);
                }
                Err(e) => {
                    tracing::warn!(
                        component_id = self.id,
                        key = key.as_str(),
                        error = %e,
                        "ignoring malformed container value in props patch"
                    );
                }
            }
        }

        if self.component_type == GRID_TYPE
            && (patch.contains_key(grid::NUM_COLS_KEY) || patch.contains_key(grid::NUM_ROWS_KEY))
        {
            if let Some(fix) = grid::reconcile(&props) {
                props.merge(fix);
            }
        }

        Component {
            id: self.id,
            component_type: self.component_type.clone(),
            props,
        }
    }

    pub fn with_grid_contents(&self, cells: GridContents) -> Component {
        let mut next = self.clone();
        next.props.insert(GRID_CONTENTS_KEY, cells);
        next
    }

    pub fn with_pages(&self, layers: Vec<ParallaxLayer>) -> Component {
        let mut next = self.clone();
        next.props.insert(PAGES_KEY, layers);
        next
    }

    pub fn with_id(&self, id: ComponentId) -> Component {
        let mut next = self.clone();
        next.id = id;
        next
    }
}

#[derive(Deserialize)]
struct RawComponent {
    #[serde(default, deserialize_with = "deserialize_id")]
    id: ComponentId,

    #[serde(rename = "type")]
    component_type: String,

    #[serde(default)]
    props: Map<String, Value>,
}

impl<'de> Deserialize<'de> for Component {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawComponent::deserialize(deserializer)?;
        let props = Props::from_json(&raw.component_type, raw.props).map_err(de::Error::custom)?;

        Ok(Component {
            id: raw.id,
            component_type: raw.component_type,
            props,
        })
    }
}

/// Reads an id leniently: missing, null, negative or non-numeric becomes 0.
pub(crate) fn deserialize_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<ComponentId, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(id_from_value).unwrap_or(0))
}

pub(crate) fn id_from_value(value: &Value) -> Option<ComponentId> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 1.0 && f.fract() == 0.0)
                .map(|f| f as ComponentId)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A single prop value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropValue {
    Json(Value),
    Cells(GridContents),
    Layers(Vec<ParallaxLayer>),
}

impl PropValue {
    /// Normalizes a value for `key` on a component of `component_type`.
    fn for_key(self, component_type: &str, key: &str) -> Result<PropValue, serde_json::Error> {
        match self {
            PropValue::Json(value) if is_container_key(component_type, key) => {
                if component_type == GRID_TYPE {
                    serde_json::from_value(value).map(PropValue::Cells)
                } else {
                    serde_json::from_value(value).map(PropValue::Layers)
                }
            }
            other => Ok(other),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            PropValue::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            PropValue::Json(value) => value.clone(),
            other => serde_json::to_value(other).unwrap_or_default(),
        }
    }
}

// Patches coming from a host carry no type context, so every value starts as
// raw JSON and is normalized against the target component on merge.
impl<'de> Deserialize<'de> for PropValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(PropValue::Json)
    }
}

impl From<Value> for PropValue {
    fn from(value: Value) -> Self {
        PropValue::Json(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Json(Value::from(value))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Json(Value::from(value))
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Json(Value::from(value))
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Json(Value::from(value))
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Json(Value::from(value))
    }
}

impl From<u64> for PropValue {
    fn from(value: u64) -> Self {
        PropValue::Json(Value::from(value))
    }
}

impl From<usize> for PropValue {
    fn from(value: usize) -> Self {
        PropValue::Json(Value::from(value))
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Json(Value::from(value))
    }
}

impl From<GridContents> for PropValue {
    fn from(value: GridContents) -> Self {
        PropValue::Cells(value)
    }
}

impl From<Vec<ParallaxLayer>> for PropValue {
    fn from(value: Vec<ParallaxLayer>) -> Self {
        PropValue::Layers(value)
    }
}

/// Flat props map with typed container values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Props {
    entries: BTreeMap<String, PropValue>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds props for a component of `component_type` from raw JSON.
    pub fn from_json(
        component_type: &str,
        map: Map<String, Value>,
    ) -> Result<Props, serde_json::Error> {
        let mut entries = BTreeMap::new();
        for (key, value) in map {
            let value = PropValue::Json(value).for_key(component_type, &key)?;
            entries.insert(key, value);
        }
        Ok(Props { entries })
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Option<PropValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.entries.remove(key)
    }

    /// Shallow merge: keys in `patch` overwrite, everything else persists.
    pub fn merge(&mut self, patch: Props) {
        self.entries.extend(patch.entries);
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries.get(key)
    }

    pub fn get_json(&self, key: &str) -> Option<&Value> {
        self.get(key).and_then(PropValue::as_json)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get_json(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_json(key).and_then(Value::as_bool)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get_json(key).and_then(Value::as_f64)
    }

    /// Non-negative integer, accepting integral floats such as `2.0`.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        let value = self.get_json(key)?;
        value.as_u64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        })
    }

    pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.get_json(key).and_then(Value::as_array)
    }

    pub fn grid_contents(&self) -> Option<&GridContents> {
        match self.get(GRID_CONTENTS_KEY) {
            Some(PropValue::Cells(cells)) => Some(cells),
            _ => None,
        }
    }

    pub fn pages(&self) -> Option<&[ParallaxLayer]> {
        match self.get(PAGES_KEY) {
            Some(PropValue::Layers(layers)) => Some(layers),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropValue)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Props::new();
        for (key, value) in iter {
            props.insert(key, value);
        }
        props
    }
}
