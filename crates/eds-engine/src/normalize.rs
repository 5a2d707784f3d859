//! Tree node normalization.
//!
//! Tree documents accept three spellings for a node:
//!
//! ```yaml
//! elements:
//!   - Contactdoos                       # bare type token
//!   - Kring:                            # type-keyed mapping
//!       amperage: "16"
//!       children: [Lichtpunt]
//!   - type: Contactdoos                 # explicit object
//!     nr: 4
//!     props: {aantal: "2"}
//! ```
//!
//! All three collapse into a [`TreeNode`] here, once, before any other stage
//! runs. Sibling attribute keys override the `attributes`/`props` sub-key.
//! An `nr` written either at node level or among the attributes becomes the
//! node's explicit ordinal. Keys starting with `_comment` are annotations and
//! are dropped.
//!
//! A type-keyed mapping with more than one key is accepted when exactly one
//! key names a schema type: the other keys become attributes of that node and
//! a warning is reported. Any other multi-key mapping is rejected.

use log::trace;
use serde_json::{Map, Value};

use eds_core::{
    AttrValue, Attributes,
    schema::Schema,
    tree::{LABEL_KEY, Metadata, RawTreeDocument, TreeDocument, TreeNode},
};

use crate::error::{
    Converted, Diagnostic, DiagnosticCollector, ErrorCode, Result, TransformError,
};

const ATTRIBUTE_KEYS: [&str; 2] = ["attributes", "props"];
const CHILDREN_KEY: &str = "children";
const TYPE_KEY: &str = "type";
const NR_KEY: &str = "nr";

/// Normalizes every node of a raw tree document.
///
/// Metadata is advisory: it is kept when it has the expected shape and
/// dropped otherwise.
///
/// # Errors
///
/// Returns a [`TransformError`] for the first node that cannot be
/// normalized, together with the warnings collected before it.
pub fn normalize_document(
    raw: RawTreeDocument,
    schema: &Schema,
) -> std::result::Result<Converted<TreeDocument>, TransformError> {
    let mut collector = DiagnosticCollector::new();
    let metadata = raw
        .metadata
        .and_then(|value| serde_json::from_value::<Metadata>(value).ok());

    let mut elements = Vec::with_capacity(raw.elements.len());
    for (index, node) in raw.elements.iter().enumerate() {
        match normalize(node, schema, &format!("elements[{index}]"), &mut collector) {
            Ok(node) => elements.push(node),
            Err(diagnostic) => return Err(collector.fail(diagnostic)),
        }
    }

    collector.finish(TreeDocument {
        metadata,
        properties: raw.properties.unwrap_or_default(),
        sitplan: raw.sitplan,
        elements,
    })
}

/// Normalizes a single node found at `path`.
pub fn normalize_node(
    node: &Value,
    schema: &Schema,
    path: &str,
) -> std::result::Result<Converted<TreeNode>, TransformError> {
    let mut collector = DiagnosticCollector::new();
    match normalize(node, schema, path, &mut collector) {
        Ok(node) => collector.finish(node),
        Err(diagnostic) => Err(collector.fail(diagnostic)),
    }
}

fn normalize(
    node: &Value,
    schema: &Schema,
    path: &str,
    collector: &mut DiagnosticCollector,
) -> Result<TreeNode> {
    match node {
        Value::String(type_name) => {
            trace!(path, type_name = type_name.as_str(); "Bare node");
            Ok(TreeNode::new(type_name.as_str()))
        }
        Value::Object(map) => match map.get(TYPE_KEY) {
            Some(type_value) => explicit_node(map, type_value, schema, path, collector),
            None => keyed_node(map, schema, path, collector),
        },
        other => Err(Diagnostic::error(format!(
            "node at `{path}` must be a type name or a mapping, found {}",
            kind_of(other)
        ))
        .with_code(ErrorCode::E102)
        .with_subject(path)),
    }
}

/// `{type: X, attributes: {...}, children: [...], nr: ..., <attr>: ...}`
fn explicit_node(
    map: &Map<String, Value>,
    type_value: &Value,
    schema: &Schema,
    path: &str,
    collector: &mut DiagnosticCollector,
) -> Result<TreeNode> {
    let type_name = match type_value {
        Value::String(type_name) => type_name.clone(),
        other => {
            return Err(Diagnostic::error(format!(
                "`type` of node at `{path}` must be text, found {}",
                kind_of(other)
            ))
            .with_code(ErrorCode::E102)
            .with_subject(path));
        }
    };
    trace!(path, type_name = type_name.as_str(); "Explicit node");

    build_node(type_name, map, schema, path, &[TYPE_KEY], collector)
}

/// `{X: {attributes: {...}, children: [...], <attr>: ...}}` or `{X: null}`
fn keyed_node(
    map: &Map<String, Value>,
    schema: &Schema,
    path: &str,
    collector: &mut DiagnosticCollector,
) -> Result<TreeNode> {
    let keys: Vec<&String> = map.keys().filter(|key| !is_annotation(key)).collect();

    let type_name = match keys.as_slice() {
        [type_name] => (*type_name).clone(),
        [] => {
            return Err(Diagnostic::error(format!("node at `{path}` is an empty mapping"))
                .with_code(ErrorCode::E101)
                .with_subject(path));
        }
        _ => {
            let known: Vec<&String> = keys
                .iter()
                .copied()
                .filter(|key| schema.is_known(key))
                .collect();
            let [type_name] = known.as_slice() else {
                let listed = keys
                    .iter()
                    .map(|key| format!("`{key}`"))
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(Diagnostic::error(format!(
                    "cannot tell the element type of node at `{path}` from keys {listed}"
                ))
                .with_code(ErrorCode::E101)
                .with_subject(path)
                .with_help("write the node as `{type: <Type>, ...}` to name its type"));
            };
            collector.emit(
                Diagnostic::warning(format!(
                    "node at `{path}` has keys next to its type `{type_name}`; \
                     they are read as its attributes"
                ))
                .with_code(ErrorCode::E101)
                .with_subject(path)
                .with_help(format!(
                    "indent the other keys under `{type_name}` to make them its attributes"
                )),
            );
            (*type_name).clone()
        }
    };
    if !schema.is_known(&type_name) {
        trace!(path, type_name = type_name.as_str(); "Type not in schema");
    }

    let mut body: Map<String, Value> = map
        .iter()
        .filter(|(key, _)| **key != type_name)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    match &map[&type_name] {
        Value::Null => {}
        Value::Object(inner) => {
            body.extend(inner.iter().map(|(key, value)| (key.clone(), value.clone())));
        }
        other => {
            return Err(Diagnostic::error(format!(
                "body of `{type_name}` at `{path}` must be a mapping, found {}",
                kind_of(other)
            ))
            .with_code(ErrorCode::E102)
            .with_subject(path));
        }
    }

    build_node(type_name, &body, schema, path, &[], collector)
}

/// Collects attributes, ordinal and children from a node body.
///
/// `skip` lists keys already consumed by the caller.
fn build_node(
    type_name: String,
    body: &Map<String, Value>,
    schema: &Schema,
    path: &str,
    skip: &[&str],
    collector: &mut DiagnosticCollector,
) -> Result<TreeNode> {
    let mut node = TreeNode::new(type_name);

    for key in ATTRIBUTE_KEYS {
        match body.get(key) {
            None | Some(Value::Null) => {}
            Some(Value::Object(attributes)) => {
                for (name, value) in attributes {
                    insert_attribute(&mut node.attributes, name, value, path)?;
                }
            }
            Some(other) => {
                return Err(Diagnostic::error(format!(
                    "`{key}` of node at `{path}` must be a mapping, found {}",
                    kind_of(other)
                ))
                .with_code(ErrorCode::E102)
                .with_subject(path));
            }
        }
    }

    for (name, value) in body {
        if skip.contains(&name.as_str())
            || ATTRIBUTE_KEYS.contains(&name.as_str())
            || name == CHILDREN_KEY
            || is_annotation(name)
        {
            continue;
        }
        insert_attribute(&mut node.attributes, name, value, path)?;
    }

    if let Some(nr) = node.attributes.shift_remove(NR_KEY) {
        node.nr = Some(nr.canonical_text());
    }
    if node.attributes.shift_remove(TYPE_KEY).is_some() {
        trace!(path; "Ignoring `type` attribute inside node body");
    }

    match body.get(CHILDREN_KEY) {
        None | Some(Value::Null) => {}
        Some(Value::Array(children)) => {
            node.children = children
                .iter()
                .enumerate()
                .map(|(index, child)| {
                    normalize(child, schema, &format!("{path}.children[{index}]"), collector)
                })
                .collect::<Result<Vec<_>>>()?;
        }
        Some(other) => {
            return Err(Diagnostic::error(format!(
                "`children` of node at `{path}` must be a list, found {}",
                kind_of(other)
            ))
            .with_code(ErrorCode::E102)
            .with_subject(path));
        }
    }

    Ok(node)
}

fn insert_attribute(
    attributes: &mut Attributes,
    name: &str,
    value: &Value,
    path: &str,
) -> Result<()> {
    if is_annotation(name) {
        return Ok(());
    }
    let value = AttrValue::from_value(value).ok_or_else(|| {
        Diagnostic::error(format!(
            "attribute `{name}` of node at `{path}` must be text, a number, a boolean or null"
        ))
        .with_code(ErrorCode::E103)
        .with_subject(format!("{path}.{name}"))
    })?;
    attributes.insert(name.to_string(), value);
    Ok(())
}

fn is_annotation(key: &str) -> bool {
    key.starts_with(LABEL_KEY)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
