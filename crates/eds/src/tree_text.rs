//! YAML text of tree documents.
//!
//! Parsing accepts a mapping with `metadata`, `properties`, `sitplan` and
//! `elements` sections, or a bare list of root nodes. Rendering writes the
//! sections in that order and can move the `_comment` display labels onto
//! the line of their element as inline comments:
//!
//! ```yaml
//! elements:
//! - Kring: #A
//!     amperage: '16'
//! ```

use std::sync::LazyLock;

use log::{debug, trace};
use regex::Regex;
use serde_json::Value;

use eds_core::{
    schema::Schema,
    tree::{LABEL_KEY, RawTreeDocument, TreeDocument},
};
use eds_engine::{
    error::{Converted, Diagnostic, ErrorCode},
    normalize_document,
};

use crate::error::EdsError;

/// A `_comment` line holding a display label: `#` and capitals, optionally
/// followed by `.` and digits, bare or quoted.
static LABEL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"^\s*{LABEL_KEY}:\s*["']?(#[A-Z]+(?:\.\d+)?)["']?\s*$"#
    ))
    .expect("valid regex")
});

/// Parses YAML text into a normalized tree document.
///
/// Warnings raised while normalizing nodes travel with the document.
pub fn parse_tree(text: &str, schema: &Schema) -> Result<Converted<TreeDocument>, EdsError> {
    if text.trim().is_empty() {
        return Ok(Converted::clean(TreeDocument::default()));
    }
    let value: Value = serde_yaml::from_str(text).map_err(|err| {
        Diagnostic::error(format!("malformed tree document: {err}"))
            .with_code(ErrorCode::E100)
    })?;

    let raw = match value {
        Value::Null => RawTreeDocument::default(),
        Value::Array(elements) => RawTreeDocument {
            elements,
            ..Default::default()
        },
        Value::Object(_) => serde_json::from_value(value).map_err(|err| {
            Diagnostic::error(format!("malformed tree document: {err}"))
                .with_code(ErrorCode::E100)
        })?,
        _ => {
            return Err(Diagnostic::error(
                "a tree document must be a mapping or a list of elements",
            )
            .with_code(ErrorCode::E100)
            .with_help("put the element nodes under an `elements:` key")
            .into());
        }
    };
    debug!(roots = raw.elements.len(); "Tree text parsed");

    Ok(normalize_document(raw, schema)?)
}

/// Renders a tree document as YAML text.
pub fn render_tree(document: &TreeDocument, inline_comments: bool) -> Result<String, EdsError> {
    let text = serde_yaml::to_string(document).map_err(|err| {
        Diagnostic::error(format!("cannot render tree document: {err}"))
            .with_code(ErrorCode::E100)
    })?;

    if inline_comments {
        Ok(inline_labels(&text))
    } else {
        Ok(text)
    }
}

/// Moves `_comment: '#A.1'` lines onto the end of the line before them.
pub fn inline_labels(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut output = String::with_capacity(text.len());
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        match lines.get(index + 1).and_then(|next| label_of(next)) {
            Some(label) => {
                trace!(label; "Inlining display label");
                output.push_str(line);
                output.push_str(if line.trim_end().ends_with(':') { " " } else { "  " });
                output.push_str(label);
                index += 2;
            }
            None => {
                output.push_str(line);
                index += 1;
            }
        }
        output.push('\n');
    }

    output
}

/// Returns the label of a `_comment` line, if it holds a display label.
fn label_of(line: &str) -> Option<&str> {
    LABEL_LINE
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|label| label.as_str())
}

#[cfg(test)]
mod tests {
    use eds_core::{
        AttrValue,
        tree::{TreeNode, TreeProperties},
    };

    use super::*;
    use crate::schema;

    #[test]
    fn test_parse_sections() {
        let text = r#"
metadata:
  schema_version: "1.0.0"
  tool_version: "0.1.0"
  generated_at: "2024-01-01T00:00:00Z"
properties:
  owner: |-
    Jan Peeters
    Kerkstraat 1
elements:
  - Kring: #A
      amperage: "16"
      children:
        - Contactdoos  #A.1
        - Contactdoos:
            aantal: 2
"#;
        let document = parse_tree(text, &schema::bundled().unwrap())
            .unwrap()
            .into_value();

        assert_eq!(document.metadata.unwrap().tool_version, "0.1.0");
        assert_eq!(
            document.properties.owner.as_deref(),
            Some("Jan Peeters\nKerkstraat 1")
        );
        let circuit = &document.elements[0];
        assert_eq!(circuit.attributes["amperage"], AttrValue::text("16"));
        assert_eq!(circuit.children.len(), 2);
        assert!(circuit.children[1].attributes["aantal"].text_eq(&AttrValue::text("2")));
    }

    #[test]
    fn test_parse_bare_list_and_empty() {
        let schema = schema::bundled().unwrap();

        let document = parse_tree("- Bord\n- Kring\n", &schema).unwrap();
        assert_eq!(document.value().elements.len(), 2);

        let empty = parse_tree("", &schema).unwrap();
        assert!(empty.value().elements.is_empty());
        assert!(empty.warnings().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        let schema = schema::bundled().unwrap();

        let err = parse_tree("elements: [", &schema).unwrap_err();
        assert!(err.to_string().contains("E100"), "{err}");

        let err = parse_tree("just text", &schema).unwrap_err();
        assert!(err.to_string().contains("E100"), "{err}");

        let err = parse_tree("elements:\n  - {Kring: null, Bord: null}\n", &schema).unwrap_err();
        assert!(err.to_string().contains("E101"), "{err}");
    }

    #[test]
    fn test_render_inlines_labels() {
        let mut child = TreeNode::new("Contactdoos").with_attribute("aantal", "2");
        child.label = Some("#A.1".to_string());
        let mut circuit = TreeNode::new("Kring").with_child(child);
        circuit.label = Some("#A".to_string());
        let document = TreeDocument {
            properties: TreeProperties {
                owner: Some("Jan".to_string()),
                ..Default::default()
            },
            elements: vec![circuit],
            ..Default::default()
        };

        let text = render_tree(&document, true).unwrap();
        assert!(text.contains("- Kring: #A\n"), "{text}");
        assert!(text.contains("- Contactdoos: #A.1\n"), "{text}");
        assert!(!text.contains(LABEL_KEY), "{text}");

        let reparsed = parse_tree(&text, &schema::bundled().unwrap())
            .unwrap()
            .into_value();
        let mut expected = document.elements.clone();
        expected.iter_mut().for_each(TreeNode::strip_labels);
        assert_eq!(reparsed.elements, expected);
    }

    #[test]
    fn test_render_keeps_comment_keys_when_disabled() {
        let mut circuit = TreeNode::new("Kring").with_attribute("amperage", "16");
        circuit.label = Some("#B".to_string());
        let document = TreeDocument {
            elements: vec![circuit],
            ..Default::default()
        };

        let text = render_tree(&document, false).unwrap();
        assert!(text.contains(LABEL_KEY), "{text}");
    }

    #[test]
    fn test_label_of() {
        assert_eq!(label_of("    _comment: '#A'"), Some("#A"));
        assert_eq!(label_of("  _comment: \"#AB.12\""), Some("#AB.12"));
        assert_eq!(label_of("_comment: '#A.'"), None);
        assert_eq!(label_of("_comment: note"), None);
        assert_eq!(label_of("  naam: '#A'"), None);
    }

    #[test]
    fn test_label_of_rejects_lookalikes() {
        assert_eq!(label_of("_comment: #A"), Some("#A"));
        assert_eq!(label_of("_comment: '#A.1'  "), Some("#A.1"));
        assert_eq!(label_of("_comment: '#a.1'"), None);
        assert_eq!(label_of("_comment: '#A.1b'"), None);
        assert_eq!(label_of("_comment_extra: '#A'"), None);
        assert_eq!(label_of("- _comment: '#A'"), None);
    }

    #[test]
    fn test_inline_labels_leaves_other_comments() {
        let text = "- Kring:\n    _comment: '#B'\n    amperage: '16'\n- Bord:\n    _comment: hoofdbord\n";
        assert_eq!(
            inline_labels(text),
            "- Kring: #B\n    amperage: '16'\n- Bord:\n    _comment: hoofdbord\n"
        );
    }
}
