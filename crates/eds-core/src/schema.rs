//! Element type schema: the table of attribute defaults per type.
//!
//! The table is an external, versioned resource. It is deserialized from a
//! document of the shape:
//!
//! ```yaml
//! version: "1.0.0"
//! types:
//!   Contactdoos:
//!     defaults:
//!       aantal: "1"
//! ```
//!
//! Types missing from the table are not an error: they have no defaults and
//! carry only their explicit attributes.

use indexmap::IndexMap;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::attribute::{AttrValue, Attributes};

/// Defaults of a single element type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeSchema {
    /// Attribute defaults, in the order they appear in packed elements.
    #[serde(default)]
    pub defaults: Attributes,
}

/// The element type schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Version string of the table, reported in tree metadata.
    #[serde(default = "default_version")]
    version: String,

    /// Known element types keyed by type name.
    #[serde(default)]
    types: IndexMap<String, TypeSchema>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl Schema {
    /// Creates a schema from a version string and a type table.
    pub fn new(version: impl Into<String>, types: IndexMap<String, TypeSchema>) -> Self {
        Self {
            version: version.into(),
            types,
        }
    }

    /// Returns the schema version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the defaults of `type_name`, or an empty mapping for unknown
    /// types.
    pub fn defaults_for(&self, type_name: &str) -> Attributes {
        match self.types.get(type_name) {
            Some(schema) => schema.defaults.clone(),
            None => {
                trace!(type_name; "No schema entry, using empty defaults");
                Attributes::new()
            }
        }
    }

    /// Returns the default of a single attribute, if the type defines one.
    pub fn default_of(&self, type_name: &str, attribute: &str) -> Option<&AttrValue> {
        self.types
            .get(type_name)
            .and_then(|schema| schema.defaults.get(attribute))
    }

    /// Returns `true` when `type_name` appears in the table.
    pub fn is_known(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Iterates over the known type names in table order.
    pub fn known_type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Schema {
        serde_json::from_value(json!({
            "version": "2.1.0",
            "types": {
                "Kring": {"defaults": {"naam": "", "amperage": "20"}},
                "Contactdoos": {"defaults": {"aantal": "1", "is_geaard": true}},
                "Bord": {}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults_for_known_type() {
        let schema = sample();
        let defaults = schema.defaults_for("Contactdoos");

        assert_eq!(defaults.len(), 2);
        assert_eq!(defaults["aantal"], AttrValue::text("1"));
        assert_eq!(schema.version(), "2.1.0");
    }

    #[test]
    fn test_defaults_for_unknown_type_is_empty() {
        let schema = sample();

        assert!(schema.defaults_for("Warmtepomp").is_empty());
        assert!(!schema.is_known("Warmtepomp"));
        assert!(schema.default_of("Warmtepomp", "aantal").is_none());
    }

    #[test]
    fn test_type_without_defaults_is_known() {
        let schema = sample();

        assert!(schema.is_known("Bord"));
        assert!(schema.defaults_for("Bord").is_empty());
    }

    #[test]
    fn test_known_type_names_in_order() {
        let names: Vec<_> = sample().known_type_names().map(str::to_string).collect();
        assert_eq!(names, vec!["Kring", "Contactdoos", "Bord"]);
    }

    #[test]
    fn test_missing_version_defaults() {
        let schema: Schema = serde_json::from_value(json!({"types": {}})).unwrap();
        assert_eq!(schema.version(), "1.0.0");
    }
}
