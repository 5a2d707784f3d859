//! The tree form: a nested, human-editable document.
//!
//! Elements nest under their logical parents and carry only the attributes
//! that differ from their type's schema defaults. On input, a node may be
//! spelled in three ways (a bare type token, a type-keyed mapping, or an
//! explicit `{type: ...}` object); those spellings live in
//! [`RawTreeDocument::elements`] until the normalizer resolves them into
//! [`TreeNode`]s. Everything past normalization works on [`TreeNode`] only.
//!
//! On output, a [`TreeNode`] serializes as a bare type token when it has no
//! attributes and no children, and as `{<type>: {...}}` otherwise.

use serde::{
    Deserialize, Serialize, Serializer,
    ser::{SerializeMap, SerializeSeq},
};
use serde_json::Value;

use crate::attribute::{AttrValue, Attributes};

/// Key under which the display label annotation is written.
pub const LABEL_KEY: &str = "_comment";

/// A canonical tree node.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// Element type name.
    pub type_name: String,
    /// Explicit ordinal, when one was written in the tree.
    pub nr: Option<String>,
    /// Attributes that differ from the type defaults.
    pub attributes: Attributes,
    /// Child nodes in document order.
    pub children: Vec<TreeNode>,
    /// Derived display label such as `#A` or `#A.2`; never semantic.
    pub label: Option<String>,
}

impl TreeNode {
    /// Creates a node with no attributes and no children.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            nr: None,
            attributes: Attributes::new(),
            children: Vec::new(),
            label: None,
        }
    }

    /// Adds an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Appends a child node.
    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    /// Sets the explicit ordinal.
    pub fn with_nr(mut self, nr: impl Into<String>) -> Self {
        self.nr = Some(nr.into());
        self
    }

    /// Returns `true` when the node renders as a bare type token.
    pub fn is_bare(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty() && self.nr.is_none()
    }

    /// Removes display labels from this node and all descendants.
    pub fn strip_labels(&mut self) {
        self.label = None;
        for child in &mut self.children {
            child.strip_labels();
        }
    }

    /// Number of nodes in this subtree, the node itself included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(TreeNode::subtree_len).sum::<usize>()
    }
}

impl Serialize for TreeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_bare() {
            return serializer.serialize_str(&self.type_name);
        }

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.type_name, &NodeBody(self))?;
        map.end()
    }
}

/// The mapping under a type key: label, `nr`, attributes, children.
struct NodeBody<'a>(&'a TreeNode);

impl Serialize for NodeBody<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self.0;
        let mut map = serializer.serialize_map(None)?;
        if let Some(label) = &node.label {
            map.serialize_entry(LABEL_KEY, label)?;
        }
        if let Some(nr) = &node.nr {
            map.serialize_entry("nr", nr)?;
        }
        for (key, value) in &node.attributes {
            map.serialize_entry(key, value)?;
        }
        if !node.children.is_empty() {
            map.serialize_entry("children", &Children(&node.children))?;
        }
        map.end()
    }
}

struct Children<'a>(&'a [TreeNode]);

impl Serialize for Children<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for child in self.0 {
            seq.serialize_element(child)?;
        }
        seq.end()
    }
}

/// Advisory information written at the top of generated documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub schema_version: String,
    pub tool_version: String,
    pub generated_at: String,
}

/// Document-level free-text fields, with real newlines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl TreeProperties {
    /// Returns `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        self.owner.is_none()
            && self.installer.is_none()
            && self.control.is_none()
            && self.info.is_none()
    }
}

/// Layer defaults of the situation plan in tree form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fontsize: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
}

/// The situation plan section of the tree form.
///
/// Layers are kept as neutral structured values: export reads them
/// leniently (reporting malformed numbers instead of failing), import builds
/// them from typed [`Layer`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeSitplan {
    #[serde(default)]
    pub defaults: LayerDefaults,
    #[serde(rename = "numPages", default, skip_serializing_if = "Option::is_none")]
    pub num_pages: Option<u32>,
    #[serde(rename = "activePage", default, skip_serializing_if = "Option::is_none")]
    pub active_page: Option<u32>,
    #[serde(default)]
    pub layers: Vec<Value>,
    /// Older spelling of `layers`, read but never written.
    #[serde(default, skip_serializing)]
    pub elements: Vec<Value>,
}

impl TreeSitplan {
    /// Returns the layer list, falling back to the older `elements` key.
    pub fn layer_values(&self) -> &[Value] {
        if self.layers.is_empty() {
            &self.elements
        } else {
            &self.layers
        }
    }
}

/// Target of an element-anchored layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LayerTarget {
    /// Reference label such as `A.3`.
    #[serde(rename = "ref")]
    Ref(String),
    /// Raw element identifier.
    #[serde(rename = "id")]
    Id(u64),
}

/// A layer placed on an element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementLayer {
    pub pos: [f64; 2],
    #[serde(flatten)]
    pub target: LayerTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adreslocation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labelfontsize: Option<f64>,
}

/// Where the raster payload of an image layer lives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ImageSource {
    /// Asset file next to the tree document.
    #[serde(rename = "image")]
    File(String),
    /// Payload left embedded; only its length is reported.
    #[serde(rename = "svg_length")]
    Embedded(usize),
}

/// A free-standing image layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageLayer {
    pub pos: [f64; 2],
    pub size: [f64; 2],
    /// `None` when an asset store was given but no payload could be extracted.
    #[serde(flatten)]
    pub source: Option<ImageSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// A situation plan layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Layer {
    Element(ElementLayer),
    Image(ImageLayer),
}

/// A tree document as read from text, before node normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTreeDocument {
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub properties: Option<TreeProperties>,
    #[serde(default)]
    pub sitplan: Option<TreeSitplan>,
    #[serde(default)]
    pub elements: Vec<Value>,
}

/// A normalized tree document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TreeDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "TreeProperties::is_empty")]
    pub properties: TreeProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sitplan: Option<TreeSitplan>,
    pub elements: Vec<TreeNode>,
}
