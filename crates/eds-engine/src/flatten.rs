//! Flatten engine: tree nodes to the packed element list.
//!
//! The walk is depth first, children before siblings. Identifiers are handed
//! out in visit order starting at 1, so the element list is a preorder
//! traversal whose positions and parent links agree.
//!
//! Direct children of a circuit without an explicit `nr` are numbered 1, 2,
//! ... in order. Every circuit visited takes the next circuit label and makes
//! it the current one. The current label is walk state: it is not restored
//! when a circuit's subtree ends, so siblings that follow a nested circuit
//! register under the nested circuit's label. Each element with a non-empty
//! `nr` visited while a label is current is registered as
//! `"<label>.<nr>"` in the label map used to resolve sitplan references.

use log::{debug, trace};

use eds_core::{
    AttrValue, Attributes,
    circuit::{CIRCUIT_TYPE, CircuitLabels, LabelMap, reference_label},
    packed::Element,
    schema::Schema,
    tree::TreeNode,
};

const NR_KEY: &str = "nr";
const TYPE_KEY: &str = "type";

/// Result of flattening a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Flattened {
    /// Elements in preorder.
    pub elements: Vec<Element>,
    /// Next free identifier.
    pub next_id: u64,
    /// Reference labels of numbered elements.
    pub labels: LabelMap,
}

/// Flattens `roots` into a packed element list.
///
/// Flattening is total: unknown types simply have no defaults.
pub fn flatten(roots: &[TreeNode], schema: &Schema) -> Flattened {
    let mut walker = Walker {
        schema,
        elements: Vec::new(),
        next_id: 1,
        circuits: CircuitLabels::new(),
        current_circuit: None,
        labels: LabelMap::new(),
    };

    for root in roots {
        walker.visit(root, 0, 0, None);
    }

    debug!(
        elements = walker.elements.len(),
        circuits = walker.circuits.issued(),
        labels = walker.labels.len();
        "Tree flattened"
    );

    Flattened {
        elements: walker.elements,
        next_id: walker.next_id,
        labels: walker.labels,
    }
}

struct Walker<'a> {
    schema: &'a Schema,
    elements: Vec<Element>,
    next_id: u64,
    circuits: CircuitLabels,
    /// Label of the most recently visited circuit.
    current_circuit: Option<String>,
    labels: LabelMap,
}

impl Walker<'_> {
    fn visit(&mut self, node: &TreeNode, parent: u64, depth: u32, auto_nr: Option<u64>) {
        let id = self.next_id;
        self.next_id += 1;

        let nr = self.resolve_nr(node, auto_nr);
        let attributes = self.merge_attributes(node, &nr);

        let is_circuit = node.type_name == CIRCUIT_TYPE;
        if is_circuit {
            self.current_circuit = Some(self.circuits.next_label());
        }

        if let Some(label) = self.current_circuit.as_deref().filter(|_| !nr.is_empty()) {
            let reference = reference_label(label, &nr);
            trace!(id, reference = reference.as_str(); "Registered reference label");
            self.labels.insert(reference, id);
        }

        trace!(id, parent, depth, type_name = node.type_name.as_str(); "Flattened element");
        self.elements.push(Element {
            id,
            parent,
            depth,
            collapsed: false,
            attributes,
            auxiliary: None,
        });

        let mut child_nr = 1;
        for child in &node.children {
            let auto_nr = if is_circuit && child.nr.is_none() {
                child_nr += 1;
                Some(child_nr - 1)
            } else {
                None
            };
            self.visit(child, id, depth + 1, auto_nr);
        }
    }

    /// explicit > auto-assigned > schema default > empty
    fn resolve_nr(&self, node: &TreeNode, auto_nr: Option<u64>) -> String {
        if let Some(nr) = &node.nr {
            return nr.clone();
        }
        if let Some(auto_nr) = auto_nr {
            return auto_nr.to_string();
        }
        self.schema
            .default_of(&node.type_name, NR_KEY)
            .map(AttrValue::canonical_text)
            .unwrap_or_default()
    }

    /// `nr` first, then the defaults overlaid with explicit attributes, then
    /// `type` at its schema position or last.
    fn merge_attributes(&self, node: &TreeNode, nr: &str) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert(NR_KEY.to_string(), AttrValue::text(nr));

        for (key, value) in self.schema.defaults_for(&node.type_name) {
            if key != NR_KEY {
                attributes.insert(key, value);
            }
        }
        for (key, value) in &node.attributes {
            if key != NR_KEY && key != TYPE_KEY {
                attributes.insert(key.clone(), value.clone());
            }
        }
        attributes.insert(TYPE_KEY.to_string(), AttrValue::text(&node.type_name));

        attributes
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use serde_json::json;

    use super::*;

    fn schema() -> Schema {
        serde_json::from_value(json!({
            "types": {
                "Kring": {"defaults": {"naam": "", "amperage": "20"}},
                "Contactdoos": {"defaults": {"aantal": "1", "is_geaard": true}},
                "Bord": {"defaults": {"type": "Bord", "geaard": true}},
                "Meter": {"defaults": {"nr": "M"}}
            }
        }))
        .unwrap()
    }

    fn nrs(flat: &Flattened) -> Vec<String> {
        flat.elements.iter().map(Element::nr).collect()
    }

    #[test]
    fn test_circuit_scenario() {
        let tree = vec![
            TreeNode::new("Kring")
                .with_child(TreeNode::new("Contactdoos").with_attribute("aantal", "2"))
                .with_child(TreeNode::new("Contactdoos")),
        ];
        let flat = flatten(&tree, &schema());

        let ids: Vec<_> = flat.elements.iter().map(|el| el.id).collect();
        let parents: Vec<_> = flat.elements.iter().map(|el| el.parent).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(parents, vec![0, 1, 1]);
        assert_eq!(nrs(&flat), vec!["", "1", "2"]);
        assert_eq!(flat.labels.id_for("A.1"), Some(2));
        assert_eq!(flat.labels.id_for("A.2"), Some(3));
        assert_eq!(flat.labels.len(), 2);
        assert_eq!(flat.next_id, 4);
        assert_eq!(flat.elements[1].attributes["aantal"], AttrValue::text("2"));
        assert_eq!(flat.elements[2].attributes["aantal"], AttrValue::text("1"));
    }

    #[test]
    fn test_attribute_order() {
        let tree = vec![TreeNode::new("Contactdoos").with_attribute("kleur", "wit")];
        let flat = flatten(&tree, &schema());

        let keys: Vec<_> = flat.elements[0].attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["nr", "aantal", "is_geaard", "kleur", "type"]);
    }

    #[test]
    fn test_type_keeps_schema_position() {
        let flat = flatten(&[TreeNode::new("Bord")], &schema());

        let keys: Vec<_> = flat.elements[0].attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["nr", "type", "geaard"]);
    }

    #[test]
    fn test_explicit_nr_does_not_consume_auto_number() {
        let tree = vec![
            TreeNode::new("Kring")
                .with_child(TreeNode::new("Contactdoos"))
                .with_child(TreeNode::new("Contactdoos").with_nr("9"))
                .with_child(TreeNode::new("Contactdoos")),
        ];
        let flat = flatten(&tree, &schema());

        assert_eq!(nrs(&flat), vec!["", "1", "9", "2"]);
        assert_eq!(flat.labels.id_for("A.9"), Some(3));
        assert_eq!(flat.labels.id_for("A.2"), Some(4));
    }

    #[test]
    fn test_schema_default_nr() {
        let flat = flatten(&[TreeNode::new("Meter")], &schema());
        assert_eq!(nrs(&flat), vec!["M"]);
        assert!(flat.labels.is_empty(), "no circuit, no reference label");
    }

    #[test]
    fn test_labels_follow_most_recent_circuit() {
        let tree = vec![
            TreeNode::new("Bord")
                .with_child(
                    TreeNode::new("Kring")
                        .with_child(TreeNode::new("Contactdoos"))
                        .with_child(TreeNode::new("Kring").with_child(TreeNode::new("Lichtpunt")))
                        .with_child(TreeNode::new("Contactdoos")),
                )
                .with_child(TreeNode::new("Kring").with_child(TreeNode::new("Contactdoos"))),
        ];
        let flat = flatten(&tree, &schema());

        let depths: Vec<_> = flat.elements.iter().map(|el| el.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 2, 3, 2, 1, 2]);
        assert_eq!(nrs(&flat)[3..6].to_vec(), vec!["2", "1", "3"]);

        // The nested circuit registers under its own label and stays current
        // for the rest of the outer circuit's children.
        assert_eq!(flat.labels.id_for("A.1"), Some(3));
        assert_eq!(flat.labels.id_for("B.2"), Some(4));
        assert_eq!(flat.labels.id_for("B.1"), Some(5));
        assert_eq!(flat.labels.id_for("B.3"), Some(6));
        assert_eq!(flat.labels.id_for("C.1"), Some(8));
        assert_eq!(flat.labels.id_for("A.2"), None);
        assert_eq!(flat.labels.id_for("A.3"), None);
        assert_eq!(flat.labels.len(), 5);
    }

    #[test]
    fn test_current_circuit_carries_into_later_roots() {
        let tree = vec![
            TreeNode::new("Kring").with_child(TreeNode::new("Contactdoos")),
            TreeNode::new("Meter"),
        ];
        let flat = flatten(&tree, &schema());

        assert_eq!(flat.labels.id_for("A.1"), Some(2));
        assert_eq!(flat.labels.id_for("A.M"), Some(3));
    }

    #[test]
    fn test_unknown_type_has_no_defaults() {
        let tree = vec![TreeNode::new("Warmtepomp").with_attribute("vermogen", 3000u64)];
        let flat = flatten(&tree, &schema());

        let mut expected = IndexMap::new();
        expected.insert("nr".to_string(), AttrValue::text(""));
        expected.insert("vermogen".to_string(), AttrValue::from(3000u64));
        expected.insert("type".to_string(), AttrValue::text("Warmtepomp"));
        assert_eq!(flat.elements[0].attributes, expected);
    }

    #[test]
    fn test_flatten_is_deterministic() {
        let tree = vec![
            TreeNode::new("Kring")
                .with_attribute("amperage", "16")
                .with_child(TreeNode::new("Contactdoos")),
        ];
        assert_eq!(flatten(&tree, &schema()), flatten(&tree, &schema()));
    }
}
