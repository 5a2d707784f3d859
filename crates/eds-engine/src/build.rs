//! Build engine: the packed element list back to tree nodes.
//!
//! Children are grouped under their parent by array position and walked
//! depth first from the roots (`parent == 0`), which replays the exact visit
//! order of the flatten walk. Circuit labels and per-circuit child indices
//! are recomputed on the way, with the same never-restored current circuit,
//! so display labels and reference labels come out the same as they went in.
//! A direct child of a circuit is displayed under the label that is current
//! when the child is reached.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, trace};

use eds_core::{
    AttrValue, Attributes,
    circuit::{CIRCUIT_TYPE, CircuitLabels, LabelMap, reference_label},
    packed::Element,
    schema::Schema,
    tree::TreeNode,
};

use crate::error::{
    Converted, Diagnostic, DiagnosticCollector, ErrorCode, Result, TransformError,
};

/// Attributes that are always derived and never written to the tree.
const HOUSEKEEPING_KEYS: [&str; 2] = ["type", "nr"];
/// Attributes dropped when they hold the `auto` marker.
const AUTO_KEYS: [&str; 2] = ["autonr", "autoKringNaam"];
const AUTO_VALUE: &str = "auto";
/// Circuit attribute holding the generated circuit name.
const CIRCUIT_NAME_KEY: &str = "naam";

/// Result of rebuilding the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Built {
    /// Root nodes in document order.
    pub roots: Vec<TreeNode>,
    /// Reference labels of numbered elements.
    pub labels: LabelMap,
}

/// Rebuilds the tree from a packed element list, collecting its own
/// warnings.
pub fn build_tree(
    elements: &[Element],
    schema: &Schema,
) -> std::result::Result<Converted<Built>, TransformError> {
    let mut collector = DiagnosticCollector::new();
    match build(elements, schema, &mut collector) {
        Ok(built) => collector.finish(built),
        Err(diagnostic) => Err(collector.fail(diagnostic)),
    }
}

/// Rebuilds the tree from a packed element list.
///
/// Unreachable elements and elements reached twice are reported to
/// `collector` and skipped.
///
/// # Errors
///
/// Returns an `E301` diagnostic when an element has no textual `type`.
pub(crate) fn build(
    elements: &[Element],
    schema: &Schema,
    collector: &mut DiagnosticCollector,
) -> Result<Built> {
    let mut types = Vec::with_capacity(elements.len());
    for element in elements {
        let type_name = element.type_name().ok_or_else(|| {
            Diagnostic::error(format!("element {} has no `type` attribute", element.id))
                .with_code(ErrorCode::E301)
                .with_subject(element.id.to_string())
        })?;
        types.push(type_name);
    }

    let mut children: IndexMap<u64, Vec<usize>> = IndexMap::new();
    for (index, element) in elements.iter().enumerate() {
        children.entry(element.parent).or_default().push(index);
    }

    let mut builder = Builder {
        elements,
        types: &types,
        schema,
        children: &children,
        visited: HashSet::with_capacity(elements.len()),
        circuits: CircuitLabels::new(),
        current_circuit: None,
        labels: LabelMap::new(),
    };

    let mut roots = Vec::new();
    for &index in children.get(&0).map(Vec::as_slice).unwrap_or_default() {
        if let Some(node) = builder.visit(index, None, collector) {
            roots.push(node);
        }
    }

    for (index, element) in elements.iter().enumerate() {
        if !builder.visited.contains(&index) {
            collector.emit(
                Diagnostic::warning(format!(
                    "element {} is unreachable: parent {} does not lead to a root",
                    element.id, element.parent
                ))
                .with_code(ErrorCode::E300)
                .with_subject(element.id.to_string())
                .with_help("the element was dropped"),
            );
        }
    }

    debug!(
        roots = roots.len(),
        visited = builder.visited.len(),
        labels = builder.labels.len();
        "Tree rebuilt"
    );

    Ok(Built {
        roots,
        labels: builder.labels,
    })
}

struct Builder<'a> {
    elements: &'a [Element],
    types: &'a [&'a str],
    schema: &'a Schema,
    children: &'a IndexMap<u64, Vec<usize>>,
    visited: HashSet<usize>,
    circuits: CircuitLabels,
    /// Label of the most recently visited circuit.
    current_circuit: Option<String>,
    labels: LabelMap,
}

impl Builder<'_> {
    /// Visits the element at `index`.
    ///
    /// `child_index` is the 1-based position below the parent when the
    /// parent is a circuit.
    fn visit(
        &mut self,
        index: usize,
        child_index: Option<u64>,
        collector: &mut DiagnosticCollector,
    ) -> Option<TreeNode> {
        let elements = self.elements;
        let element = &elements[index];
        if !self.visited.insert(index) {
            collector.emit(
                Diagnostic::warning(format!(
                    "element {} is reached more than once",
                    element.id
                ))
                .with_code(ErrorCode::E302)
                .with_subject(element.id.to_string())
                .with_help("duplicate identifiers in the element list; later visits are skipped"),
            );
            return None;
        }

        let type_name = self.types[index];
        let own_label = (type_name == CIRCUIT_TYPE).then(|| self.circuits.next_label());
        if own_label.is_some() {
            self.current_circuit.clone_from(&own_label);
        }
        let display = match (&own_label, child_index) {
            (Some(label), _) => Some(format!("#{label}")),
            (None, Some(position)) => self
                .current_circuit
                .as_deref()
                .map(|label| format!("#{label}.{position}")),
            (None, None) => None,
        };

        let nr = element.nr();
        if let Some(label) = self.current_circuit.as_deref().filter(|_| !nr.is_empty()) {
            self.labels.insert(reference_label(label, &nr), element.id);
        }

        let mut node = TreeNode::new(type_name);
        node.attributes = strip_defaults(type_name, &element.attributes, self.schema);
        trace!(
            id = element.id,
            type_name,
            kept = node.attributes.len();
            "Rebuilt element"
        );

        let children = self.children;
        let child_indices = children
            .get(&element.id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let mut position = 1;
        for &child in child_indices {
            let slot = own_label.is_some().then_some(position);
            if let Some(child_node) = self.visit(child, slot, collector) {
                node.children.push(child_node);
                if slot.is_some() {
                    position += 1;
                }
            }
        }

        if !node.is_bare() {
            node.label = display;
        }

        Some(node)
    }
}

/// Removes attributes equal to the type's schema default.
///
/// Values compare by canonical text. A null or missing default never strips.
/// `type` and `nr`, the circuit `naam` and `auto` markers are always dropped.
pub fn strip_defaults(type_name: &str, attributes: &Attributes, schema: &Schema) -> Attributes {
    attributes
        .iter()
        .filter(|(key, value)| {
            if HOUSEKEEPING_KEYS.contains(&key.as_str()) {
                return false;
            }
            if type_name == CIRCUIT_TYPE && key.as_str() == CIRCUIT_NAME_KEY {
                return false;
            }
            if AUTO_KEYS.contains(&key.as_str()) && value.canonical_text() == AUTO_VALUE {
                return false;
            }
            match schema.default_of(type_name, key) {
                None | Some(AttrValue::Null) => true,
                Some(default) => !value.text_eq(default),
            }
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
