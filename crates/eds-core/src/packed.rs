//! The packed document: the JSON object stored inside an `.eds` envelope.
//!
//! Element order in [`PackedDocument::data`] is structural. A reader groups
//! children under their parent by array position, so the sequence must be a
//! preorder walk consistent with the parent links. Keep it a `Vec` and never
//! sort it.
//!
//! Field names follow the browser application that owns the format; unknown
//! top-level fields are kept in [`PackedDocument::extra`] so a decoded file
//! re-encodes without loss.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::attribute::Attributes;

/// Default value of the `info` document property.
pub const DEFAULT_INFO: &str = "2 x 230V ~50 Hz";

/// One element of the flat element list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Identifier, unique and assigned in preorder starting at 1.
    pub id: u64,

    /// Identifier of the parent element, `0` for roots.
    pub parent: u64,

    /// Nesting depth in the walk that produced the list.
    #[serde(rename = "indent", default)]
    pub depth: u32,

    /// Whether the element is folded in the editor.
    #[serde(default)]
    pub collapsed: bool,

    /// Attributes, including the `type` and `nr` housekeeping entries.
    #[serde(rename = "props", default)]
    pub attributes: Attributes,

    /// Unused auxiliary slot, carried through untouched.
    #[serde(rename = "sourcelist", default)]
    pub auxiliary: Option<Value>,
}

impl Element {
    /// Returns the element type name stored in the `type` attribute.
    pub fn type_name(&self) -> Option<&str> {
        self.attributes.get("type").and_then(|value| value.as_str())
    }

    /// Returns the canonical text of the `nr` attribute, empty when absent.
    pub fn nr(&self) -> String {
        self.attributes
            .get("nr")
            .map(|value| value.canonical_text())
            .unwrap_or_default()
    }
}

/// Document-level free-text properties.
///
/// Newlines inside the text fields are stored as a literal `<br>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentProperties {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub installer: String,
    #[serde(default)]
    pub control: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub current_view: Option<Value>,
    #[serde(default)]
    pub legacy_schakelaars: bool,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Default for DocumentProperties {
    fn default() -> Self {
        Self {
            filename: String::new(),
            owner: String::new(),
            installer: String::new(),
            control: String::new(),
            info: DEFAULT_INFO.to_string(),
            current_view: None,
            legacy_schakelaars: false,
            extra: IndexMap::new(),
        }
    }
}

/// Layer defaults of the situation plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitplanDefaults {
    pub fontsize: f64,
    pub scale: f64,
    pub rotate: f64,
}

impl Default for SitplanDefaults {
    fn default() -> Self {
        Self {
            fontsize: 11.0,
            scale: 0.7,
            rotate: 0.0,
        }
    }
}

/// One placed entry of the situation plan.
///
/// An entry either points at an element (`electro_item_id`) or carries an
/// SVG payload with an embedded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitplanEntry {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub posx: f64,
    #[serde(default)]
    pub posy: f64,
    #[serde(default)]
    pub sizex: f64,
    #[serde(default)]
    pub sizey: f64,
    #[serde(default)]
    pub labelposx: f64,
    #[serde(default)]
    pub labelposy: f64,
    #[serde(default)]
    pub labelfontsize: f64,
    #[serde(default)]
    pub adrestype: Option<String>,
    #[serde(default)]
    pub adres: Option<Value>,
    #[serde(default)]
    pub adreslocation: Option<String>,
    #[serde(default)]
    pub rotate: f64,
    #[serde(default)]
    pub scale: f64,
    #[serde(default)]
    pub movable: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub svg: String,
    #[serde(rename = "electroItemId", default)]
    pub electro_item_id: Option<u64>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

fn first_page() -> u32 {
    1
}

/// The situation plan as stored in the packed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sitplan {
    #[serde(default = "first_page")]
    pub num_pages: u32,
    #[serde(default = "first_page")]
    pub active_page: u32,
    #[serde(default)]
    pub defaults: SitplanDefaults,
    #[serde(default)]
    pub elements: Vec<SitplanEntry>,
}

impl Default for Sitplan {
    fn default() -> Self {
        Self {
            num_pages: 1,
            active_page: 1,
            defaults: SitplanDefaults::default(),
            elements: Vec::new(),
        }
    }
}

/// The complete packed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackedDocument {
    #[serde(rename = "currentView", default)]
    pub current_view: Value,
    #[serde(rename = "idToOrdinalMap", default)]
    pub id_to_ordinal_map: Value,
    #[serde(default)]
    pub length: usize,
    /// Elements in preorder.
    #[serde(default)]
    pub data: Vec<Element>,
    #[serde(default)]
    pub active: Vec<bool>,
    #[serde(rename = "id", default)]
    pub ids: Vec<u64>,
    #[serde(default)]
    pub print_table: Value,
    #[serde(default)]
    pub properties: DocumentProperties,
    /// Next free element identifier.
    #[serde(default)]
    pub curid: u64,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub sitplan: Value,
    #[serde(default)]
    pub sitplanjson: Option<Sitplan>,
    #[serde(default)]
    pub sitplanview: Value,
    /// Top-level fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl PackedDocument {
    /// Assembles a fresh document around a flat element list.
    ///
    /// The bookkeeping arrays (`active`, `id`, `length`) are derived from
    /// `data`, and the print layout is the editor's default A4 page.
    pub fn new(
        data: Vec<Element>,
        curid: u64,
        properties: DocumentProperties,
        sitplan: Sitplan,
    ) -> Self {
        Self {
            current_view: Value::String(String::new()),
            id_to_ordinal_map: Value::Object(Default::default()),
            length: data.len(),
            active: vec![true; data.len()],
            ids: data.iter().map(|element| element.id).collect(),
            data,
            print_table: default_print_table(),
            properties,
            curid,
            mode: "edit".to_string(),
            sitplan: Value::Null,
            sitplanjson: Some(sitplan),
            sitplanview: Value::Null,
            extra: IndexMap::new(),
        }
    }
}

/// The print layout block written by export.
pub fn default_print_table() -> Value {
    json!({
        "height": 562,
        "maxwidth": 484,
        "displaypage": 0,
        "enableAutopage": true,
        "printPageMode": "all",
        "printPageRange": "",
        "pages": [{"height": 562, "start": 0, "stop": 484, "info": DEFAULT_INFO}],
        "pagemarkers": {"markers": []},
        "modevertical": "alles",
        "starty": 0,
        "stopy": 562,
        "papersize": "A4"
    })
}
