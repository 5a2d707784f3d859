//! Transform engine for EDS single-line diagram documents.
//!
//! The engine converts between the packed document stored in `.eds`
//! envelopes and the nested tree document:
//!
//! ```text
//! export:  tree ─ normalize ─ flatten ─ sitplan ─ properties ─ encode ─▶ .eds
//! import:  .eds ─ decode ─ build ─ sitplan ─ properties ─────────────▶ tree
//! ```
//!
//! Every stage is a pure function of its input, the schema and, for sitplan
//! images, an [`AssetStore`]. Conversions never share state: label
//! generators and identifier counters are created per run. Recoverable
//! problems are returned as warnings next to the result in [`Converted`];
//! fatal problems abort with a [`TransformError`].

pub mod envelope;
pub mod error;

mod build;
mod flatten;
mod normalize;
mod overlay;
mod properties;

use log::info;

use eds_core::{packed::PackedDocument, schema::Schema, tree::TreeDocument};

use crate::error::{Converted, DiagnosticCollector, TransformError};

pub use build::{Built, build_tree, strip_defaults};
pub use envelope::{decode, encode};
pub use flatten::{Flattened, flatten};
pub use normalize::{normalize_document, normalize_node};
pub use overlay::{AssetStore, MemoryAssets};
pub use properties::{export_properties, import_properties};

/// Converts a normalized tree document into a packed document.
///
/// Images of sitplan image layers are read from `assets`; without a store
/// their payload stays empty.
///
/// # Errors
///
/// Export has no fatal conditions of its own once the tree is normalized;
/// the `Result` carries the collector's verdict so callers handle both
/// directions alike.
pub fn export_document(
    document: &TreeDocument,
    schema: &Schema,
    assets: Option<&dyn AssetStore>,
) -> Result<Converted<PackedDocument>, TransformError> {
    info!(roots = document.elements.len(); "Exporting tree document");
    let mut collector = DiagnosticCollector::new();

    let flat = flatten(&document.elements, schema);
    let sitplan = overlay::export_sitplan(
        document.sitplan.as_ref(),
        &flat.labels,
        assets,
        &mut collector,
    );
    let properties = export_properties(&document.properties);

    let packed = PackedDocument::new(flat.elements, flat.next_id, properties, sitplan);
    info!(elements = packed.length, curid = packed.curid; "Tree document exported");
    collector.finish(packed)
}

/// Converts a packed document into a tree document.
///
/// Embedded sitplan images are written to `assets` as `image_<n>.<ext>`;
/// without a store only their length is reported. The returned document has
/// no metadata; stamping it is left to the caller.
///
/// # Errors
///
/// Returns a [`TransformError`] when an element has no type.
pub fn import_document(
    packed: &PackedDocument,
    schema: &Schema,
    assets: Option<&mut dyn AssetStore>,
) -> Result<Converted<TreeDocument>, TransformError> {
    info!(elements = packed.data.len(); "Importing packed document");
    let mut collector = DiagnosticCollector::new();

    let built = match build::build(&packed.data, schema, &mut collector) {
        Ok(built) => built,
        Err(diagnostic) => return Err(collector.fail(diagnostic)),
    };
    let sitplan = overlay::import_sitplan(
        packed.sitplanjson.as_ref(),
        &built.labels,
        assets,
        &mut collector,
    );
    let properties = import_properties(&packed.properties);

    let document = TreeDocument {
        metadata: None,
        properties,
        sitplan,
        elements: built.roots,
    };
    info!(roots = document.elements.len(); "Packed document imported");
    collector.finish(document)
}
