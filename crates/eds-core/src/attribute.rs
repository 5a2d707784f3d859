//! Attribute values attached to diagram elements.
//!
//! Packed files are produced by a browser application that freely mixes
//! numbers, numeric text and booleans for the same attribute. [`AttrValue`]
//! keeps the original variant so that a round trip reproduces the file, and
//! exposes [`AttrValue::canonical_text`] for the loose comparisons used when
//! deciding whether a value equals its schema default.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Ordered attribute mapping of an element.
///
/// Insertion order is preserved in both directions; it is part of the packed
/// output and of the rendered tree form.
pub type Attributes = IndexMap<String, AttrValue>;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// A boolean flag.
    Bool(bool),
    /// A JSON/YAML number, integer or float.
    Number(Number),
    /// Free text, including numbers stored as text.
    Text(String),
    /// An explicit null.
    Null,
}

impl AttrValue {
    /// Creates a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns the value rendered as text.
    ///
    /// Numbers render in their decimal form, booleans as `true`/`false` and
    /// null as the empty string. Two values are considered the same attribute
    /// setting when their canonical texts are equal.
    pub fn canonical_text(&self) -> String {
        match self {
            AttrValue::Bool(value) => value.to_string(),
            AttrValue::Number(number) => number.to_string(),
            AttrValue::Text(text) => text.clone(),
            AttrValue::Null => String::new(),
        }
    }

    /// Compares two values by canonical text.
    ///
    /// A boolean also equals its capitalized spelling (`True`, `False`), the
    /// form older converters wrote into schema defaults.
    pub fn text_eq(&self, other: &AttrValue) -> bool {
        match (self, other) {
            (AttrValue::Bool(flag), AttrValue::Text(text))
            | (AttrValue::Text(text), AttrValue::Bool(flag)) => spells_bool(text, *flag),
            _ => self.canonical_text() == other.canonical_text(),
        }
    }

    /// Returns `true` for null and for empty text.
    pub fn is_empty(&self) -> bool {
        match self {
            AttrValue::Null => true,
            AttrValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// Borrows the text of a [`AttrValue::Text`] value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Converts a neutral structured value into an attribute value.
    ///
    /// Returns `None` for sequences and mappings, which have no attribute
    /// representation.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(AttrValue::Null),
            Value::Bool(flag) => Some(AttrValue::Bool(*flag)),
            Value::Number(number) => Some(AttrValue::Number(number.clone())),
            Value::String(text) => Some(AttrValue::Text(text.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

fn spells_bool(text: &str, flag: bool) -> bool {
    match text {
        "true" | "True" => flag,
        "false" | "False" => !flag,
        _ => false,
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_text())
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<u64> for AttrValue {
    fn from(value: u64) -> Self {
        AttrValue::Number(Number::from(value))
    }
}
