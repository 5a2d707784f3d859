//! Document-level properties.
//!
//! Packed files store the free-text fields with `<br>` in place of newlines;
//! the tree form uses real newlines.

use eds_core::{
    packed::{DEFAULT_INFO, DocumentProperties},
    tree::TreeProperties,
};

const LINE_BREAK: &str = "<br>";

/// Converts tree properties to packed properties.
///
/// Fields are trimmed. A missing `info` takes its default.
pub fn export_properties(properties: &TreeProperties) -> DocumentProperties {
    let pack = |field: &Option<String>| {
        field
            .as_deref()
            .map(|text| text.trim().replace('\n', LINE_BREAK))
            .unwrap_or_default()
    };

    DocumentProperties {
        owner: pack(&properties.owner),
        installer: pack(&properties.installer),
        control: pack(&properties.control),
        info: properties
            .info
            .as_deref()
            .unwrap_or(DEFAULT_INFO)
            .trim()
            .replace('\n', LINE_BREAK),
        ..DocumentProperties::default()
    }
}

/// Converts packed properties to tree properties.
///
/// Empty fields are left out, and so is an `info` equal to its default.
pub fn import_properties(properties: &DocumentProperties) -> TreeProperties {
    let unpack = |text: &str| (!text.is_empty()).then(|| text.replace(LINE_BREAK, "\n"));

    TreeProperties {
        owner: unpack(&properties.owner),
        installer: unpack(&properties.installer),
        control: unpack(&properties.control),
        info: (properties.info != DEFAULT_INFO)
            .then(|| unpack(&properties.info))
            .flatten(),
    }
}
