//! # Persisted payloads
//!
//! A forest persists either as a bare component array or as
//! `{ "components": [...] }` (optionally with page-level `className` and
//! `style`). Anything else is rejected.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::component::{Component, ComponentRef, Forest};
use crate::error::{ImportError, ImportResult};

/// Page export: the forest plus page-level presentation hints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    pub components: Forest,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Map<String, Value>>,
}

/// Parse either payload shape into a forest.
pub fn forest_from_value(payload: Value) -> ImportResult<Forest> {
    let list = match payload {
        Value::Array(list) => list,
        Value::Object(mut object) => match object.remove("components") {
            Some(Value::Array(list)) => list,
            _ => return Err(ImportError::NotAForest),
        },
        _ => return Err(ImportError::NotAForest),
    };

    list.into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value::<Component>(value)
                .map(Arc::new)
                .map_err(|source| ImportError::InvalidComponent { index, source })
        })
        .collect()
}

pub fn forest_from_str(payload: &str) -> ImportResult<Forest> {
    forest_from_value(serde_json::from_str(payload)?)
}

/// Bare-array JSON for a forest.
pub fn forest_to_value(forest: &[ComponentRef]) -> Value {
    serde_json::to_value(forest).unwrap_or_else(|_| Value::Array(Vec::new()))
}
