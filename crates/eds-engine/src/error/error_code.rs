//! Error codes for the EDS diagnostic system.
//!
//! Error codes are organized by stage:
//! - `E0xx` - Envelope errors
//! - `E1xx` - Tree form errors
//! - `E2xx` - Sitplan (overlay) diagnostics
//! - `E3xx` - Packed structure diagnostics

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Envelope Errors (E0xx)
    // =========================================================================
    /// Unknown envelope tag.
    ///
    /// The file does not start with `EDS0040000` or `TXT0040000`.
    E001,

    /// Envelope is not valid UTF-8 text.
    E002,

    /// Invalid base64 payload.
    E003,

    /// Corrupt compressed stream.
    ///
    /// The base64 payload decoded, but inflating it failed.
    E004,

    /// Malformed JSON payload.
    E005,

    /// The packed document could not be serialized or compressed.
    E006,

    // =========================================================================
    // Tree Form Errors (E1xx)
    // =========================================================================
    /// Malformed tree document text.
    E100,

    /// Element type cannot be determined.
    ///
    /// A mapping node has no key naming a known element type and more than
    /// one key, so it is not a type-keyed shorthand.
    E101,

    /// Invalid node shape.
    ///
    /// A node is neither a type token nor a mapping, or its body, children
    /// or attributes have the wrong shape.
    E102,

    /// Unsupported attribute value.
    ///
    /// Attribute values must be text, numbers, booleans or null.
    E103,

    // =========================================================================
    // Sitplan Diagnostics (E2xx)
    // =========================================================================
    /// Unresolved sitplan reference.
    ///
    /// A layer refers to a label that no element carries. The layer is
    /// dropped.
    E200,

    /// Missing image asset.
    ///
    /// The image file of a layer was not found. The layer is kept without
    /// its payload.
    E201,

    /// Layer without a target.
    ///
    /// An element layer has neither `ref` nor `id`, or an invalid `id`.
    E202,

    /// Malformed numeric field.
    ///
    /// A position, size or scale is not a number. The default is used.
    E203,

    /// Asset could not be read or written.
    E204,

    // =========================================================================
    // Packed Structure Diagnostics (E3xx)
    // =========================================================================
    /// Unreachable element.
    ///
    /// The element's parent never appears in the element list.
    E300,

    /// Element without a type.
    E301,

    /// Element visited twice.
    ///
    /// Duplicate identifiers put an element under more than one parent.
    E302,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Envelope errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            ErrorCode::E006 => "E006",
            // Tree form errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            // Sitplan diagnostics
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            // Packed structure diagnostics
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unknown envelope tag",
            ErrorCode::E002 => "envelope is not UTF-8",
            ErrorCode::E003 => "invalid base64 payload",
            ErrorCode::E004 => "corrupt compressed stream",
            ErrorCode::E005 => "malformed JSON payload",
            ErrorCode::E006 => "cannot encode packed document",
            ErrorCode::E100 => "malformed tree document",
            ErrorCode::E101 => "undeterminable element type",
            ErrorCode::E102 => "invalid node shape",
            ErrorCode::E103 => "unsupported attribute value",
            ErrorCode::E200 => "unresolved sitplan reference",
            ErrorCode::E201 => "missing image asset",
            ErrorCode::E202 => "layer without target",
            ErrorCode::E203 => "malformed numeric field",
            ErrorCode::E204 => "asset I/O failure",
            ErrorCode::E300 => "unreachable element",
            ErrorCode::E301 => "element without type",
            ErrorCode::E302 => "element visited twice",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E200.to_string(), "E200");
        assert_eq!(ErrorCode::E300.to_string(), "E300");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E001.description(), "unknown envelope tag");
        assert_eq!(ErrorCode::E200.description(), "unresolved sitplan reference");
        assert_eq!(ErrorCode::E301.description(), "element without type");
    }
}
