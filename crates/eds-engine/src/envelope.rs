//! Envelope codec for `.eds` files.
//!
//! An envelope is a fixed-width tag followed by the packed document:
//!
//! - `EDS0040000` + base64 of a zlib stream holding compact JSON,
//! - `TXT0040000` + the JSON text itself.
//!
//! Decoding accepts both tags. Encoding always writes the compressed form.

use std::io::{Read, Write};

use base64::{Engine, engine::general_purpose::STANDARD};
use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};
use log::{debug, info, trace};

use eds_core::packed::PackedDocument;

use crate::error::{Diagnostic, ErrorCode, Result};

/// Tag of the compressed envelope.
pub const COMPRESSED_TAG: &str = "EDS0040000";

/// Tag of the plain-text envelope.
pub const PLAIN_TAG: &str = "TXT0040000";

/// Decodes an envelope into a packed document.
///
/// Leading and trailing whitespace around the envelope is ignored.
///
/// # Errors
///
/// Returns a diagnostic with a distinct code for an unknown tag (`E001`),
/// non UTF-8 input (`E002`), invalid base64 (`E003`), a corrupt zlib stream
/// (`E004`) and a malformed JSON payload (`E005`).
pub fn decode(raw: &[u8]) -> Result<PackedDocument> {
    let text = std::str::from_utf8(raw).map_err(|err| {
        Diagnostic::error(format!("envelope is not valid UTF-8: {err}"))
            .with_code(ErrorCode::E002)
    })?;
    let text = text.trim();

    let json = if let Some(payload) = text.strip_prefix(COMPRESSED_TAG) {
        debug!(bytes = payload.len(); "Decoding compressed envelope");
        inflate(payload)?
    } else if let Some(payload) = text.strip_prefix(PLAIN_TAG) {
        debug!(bytes = payload.len(); "Decoding plain envelope");
        payload.as_bytes().to_vec()
    } else {
        let tag: String = text.chars().take(COMPRESSED_TAG.len()).collect();
        return Err(Diagnostic::error(format!("unknown envelope tag `{tag}`"))
            .with_code(ErrorCode::E001)
            .with_subject(tag)
            .with_help(format!(
                "an .eds file starts with `{COMPRESSED_TAG}` or `{PLAIN_TAG}`"
            )));
    };

    let document: PackedDocument = serde_json::from_slice(&json).map_err(|err| {
        Diagnostic::error(format!("malformed packed document: {err}")).with_code(ErrorCode::E005)
    })?;

    info!(elements = document.data.len(); "Envelope decoded");
    Ok(document)
}

/// Encodes a packed document into a compressed envelope.
///
/// # Errors
///
/// Returns an `E006` diagnostic when the document cannot be serialized or
/// compressed.
pub fn encode(document: &PackedDocument) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(document).map_err(|err| {
        Diagnostic::error(format!("cannot serialize packed document: {err}"))
            .with_code(ErrorCode::E006)
    })?;
    trace!(bytes = json.len(); "Serialized packed document");

    let compress_error = |err: std::io::Error| {
        Diagnostic::error(format!("cannot compress packed document: {err}"))
            .with_code(ErrorCode::E006)
    };
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json).map_err(compress_error)?;
    let compressed = encoder.finish().map_err(compress_error)?;

    let mut envelope = String::with_capacity(COMPRESSED_TAG.len() + compressed.len() * 4 / 3 + 4);
    envelope.push_str(COMPRESSED_TAG);
    STANDARD.encode_string(&compressed, &mut envelope);

    info!(elements = document.data.len(), bytes = envelope.len(); "Envelope encoded");
    Ok(envelope.into_bytes())
}

/// Base64-decodes and inflates a compressed payload.
fn inflate(payload: &str) -> Result<Vec<u8>> {
    // Writers in the wild drop the trailing `=` padding.
    let mut padded = payload.to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }

    let compressed = STANDARD.decode(padded.as_bytes()).map_err(|err| {
        Diagnostic::error(format!("invalid base64 payload: {err}")).with_code(ErrorCode::E003)
    })?;

    let mut json = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut json)
        .map_err(|err| {
            Diagnostic::error(format!("corrupt compressed stream: {err}"))
                .with_code(ErrorCode::E004)
        })?;
    Ok(json)
}
