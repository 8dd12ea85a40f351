//! # Insertion policy
//!
//! Host hook consulted before any component is placed into a container or
//! the root. `destination` is the container's type tag, or `None` for the
//! root.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Key used for the root container in [`PlacementRules`].
pub const ROOT_DESTINATION: &str = "root";

pub trait InsertionPolicy: Send + Sync {
    fn allow(&self, component_type: &str, destination: Option<&str>) -> bool;
}

impl<F> InsertionPolicy for F
where
    F: Fn(&str, Option<&str>) -> bool + Send + Sync,
{
    fn allow(&self, component_type: &str, destination: Option<&str>) -> bool {
        self(component_type, destination)
    }
}

/// Allows every placement.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl InsertionPolicy for AllowAll {
    fn allow(&self, _component_type: &str, _destination: Option<&str>) -> bool {
        true
    }
}

/// Deny lists keyed by destination type (`"root"` for the root).
///
/// ```json
/// { "deny": { "column": ["column", "parallax"], "root": ["alert"] } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRules {
    #[serde(default)]
    pub deny: BTreeMap<String, BTreeSet<String>>,
}

impl PlacementRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deny(mut self, destination: Option<&str>, component_type: impl Into<String>) -> Self {
        self.deny
            .entry(destination.unwrap_or(ROOT_DESTINATION).to_string())
            .or_default()
            .insert(component_type.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.deny.values().all(BTreeSet::is_empty)
    }
}

impl InsertionPolicy for PlacementRules {
    fn allow(&self, component_type: &str, destination: Option<&str>) -> bool {
        let destination = destination.unwrap_or(ROOT_DESTINATION);
        !self
            .deny
            .get(destination)
            .is_some_and(|denied| denied.contains(component_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_policy() {
        let no_nested_grids = |t: &str, dest: Option<&str>| !(t == "column" && dest == Some("column"));

        assert!(no_nested_grids.allow("column", None));
        assert!(!no_nested_grids.allow("column", Some("column")));
        assert!(no_nested_grids.allow("text", Some("column")));
    }

    #[test]
    fn test_placement_rules() {
        let rules = PlacementRules::new()
            .deny(Some("parallax"), "column")
            .deny(None, "alert");

        assert!(!rules.allow("column", Some("parallax")));
        assert!(rules.allow("column", Some("column")));
        assert!(!rules.allow("alert", None));
        assert!(rules.allow("text", None));
    }

    #[test]
    fn test_placement_rules_from_json() {
        let rules: PlacementRules =
            serde_json::from_str(r#"{ "deny": { "root": ["html"] } }"#).unwrap();

        assert!(!rules.allow("html", None));
        assert!(!rules.is_empty());
        assert!(AllowAll.allow("html", None));
    }
}
