//! EDS - convert single-line electrical diagrams between packed `.eds` files
//! and editable YAML.
//!
//! The packed form is what the diagram editor stores: a flat, parent-indexed
//! element list with every attribute spelled out. The tree form nests
//! elements under their parents and writes only attributes that differ from
//! the schema defaults.

pub mod config;

mod assets;
mod error;
mod schema;
mod tree_text;

pub use eds_core::{packed::PackedDocument, tree::TreeDocument};
pub use eds_engine::{
    AssetStore,
    error::{Converted, Diagnostic, ErrorCode, Severity, TransformError},
};

pub use assets::DirAssets;
pub use error::EdsError;
pub use schema::BUNDLED_SCHEMA;
pub use tree_text::inline_labels;

use std::{fs, path::Path};

use chrono::{SecondsFormat, Utc};
use log::{debug, info};

use eds_core::{schema::Schema, tree::Metadata};

use config::AppConfig;

/// Version written to `metadata.tool_version`.
const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Converter between packed and tree documents.
///
/// Holds the configuration and the loaded schema; every conversion starts
/// from scratch, so one converter can serve any number of documents.
///
/// # Examples
///
/// ```rust,no_run
/// use eds::{Converter, config::AppConfig};
///
/// let converter = Converter::new(AppConfig::default())
///     .expect("Failed to load schema");
///
/// let tree = converter.parse_tree("elements: [Kring]")
///     .expect("Failed to parse")
///     .into_value();
/// let packed = converter.export_to_packed(&tree, None)
///     .expect("Failed to export");
///
/// let back = converter.import_from_packed(packed.value(), None)
///     .expect("Failed to import");
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    config: AppConfig,
    schema: Schema,
}

impl Converter {
    /// Create a converter, loading the configured or bundled schema.
    ///
    /// # Errors
    ///
    /// Returns `EdsError::Schema` when the schema cannot be read or parsed.
    pub fn new(config: AppConfig) -> Result<Self, EdsError> {
        let schema = match config.schema().path() {
            Some(path) => schema::load(path)?,
            None => schema::bundled()?,
        };
        Ok(Self::with_schema(config, schema))
    }

    /// Create a converter with an already loaded schema.
    pub fn with_schema(config: AppConfig, schema: Schema) -> Self {
        Self { config, schema }
    }

    /// Returns the schema in use.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse YAML text into a tree document.
    ///
    /// Nodes whose type had to be picked out of several keys are reported as
    /// warnings.
    ///
    /// # Errors
    ///
    /// Returns `EdsError::Transform` for malformed YAML or unusable nodes.
    pub fn parse_tree(&self, text: &str) -> Result<Converted<TreeDocument>, EdsError> {
        tree_text::parse_tree(text, &self.schema)
    }

    /// Render a tree document as YAML text.
    pub fn render_tree(&self, document: &TreeDocument) -> Result<String, EdsError> {
        tree_text::render_tree(document, self.config.import().inline_comments())
    }

    /// Convert envelope bytes into a tree document stamped with metadata.
    ///
    /// Embedded sitplan images are written to `assets` when one is given.
    ///
    /// # Errors
    ///
    /// Returns `EdsError::Transform` for an unreadable envelope or an
    /// untyped element.
    pub fn import_from_packed(
        &self,
        bytes: &[u8],
        assets: Option<&mut dyn AssetStore>,
    ) -> Result<Converted<TreeDocument>, EdsError> {
        debug!(bytes = bytes.len(); "Decoding envelope");
        let packed = eds_engine::decode(bytes)?;
        let converted = eds_engine::import_document(&packed, &self.schema, assets)?;

        Ok(converted.map(|mut document| {
            document.metadata = Some(self.metadata());
            document
        }))
    }

    /// Convert a tree document into envelope bytes.
    ///
    /// Images of sitplan image layers are read from `assets` when one is
    /// given.
    pub fn export_to_packed(
        &self,
        document: &TreeDocument,
        assets: Option<&dyn AssetStore>,
    ) -> Result<Converted<Vec<u8>>, EdsError> {
        let converted = eds_engine::export_document(document, &self.schema, assets)?;
        let bytes = eds_engine::encode(converted.value())?;
        debug!(bytes = bytes.len(), warnings = converted.warnings().len(); "Packed document encoded");

        Ok(converted.map(|_| bytes))
    }

    /// Convert an `.eds` file into a YAML file.
    ///
    /// Images are extracted next to `output` unless disabled in the
    /// configuration. Returns the warnings of the conversion.
    pub fn import_file(&self, input: &Path, output: &Path) -> Result<Vec<Diagnostic>, EdsError> {
        info!(input:? = input, output:? = output; "Converting packed file");
        let bytes = fs::read(input)?;

        let converted = if self.config.import().extract_images() {
            let mut assets = DirAssets::beside(output);
            self.import_from_packed(&bytes, Some(&mut assets))?
        } else {
            self.import_from_packed(&bytes, None)?
        };
        let (document, warnings) = converted.into_parts();

        fs::write(output, self.render_tree(&document)?)?;
        Ok(warnings)
    }

    /// Convert a YAML file into an `.eds` file.
    ///
    /// Images are read relative to the directory of `input`. Returns the
    /// warnings of the conversion.
    pub fn export_file(&self, input: &Path, output: &Path) -> Result<Vec<Diagnostic>, EdsError> {
        info!(input:? = input, output:? = output; "Converting tree file");
        let text = fs::read_to_string(input)?;
        let (document, mut warnings) = self.parse_tree(&text)?.into_parts();

        let assets = DirAssets::beside(input);
        let (bytes, export_warnings) = self.export_to_packed(&document, Some(&assets))?.into_parts();
        warnings.extend(export_warnings);

        fs::write(output, bytes)?;
        Ok(warnings)
    }

    fn metadata(&self) -> Metadata {
        Metadata {
            schema_version: self.schema.version().to_string(),
            tool_version: TOOL_VERSION.to_string(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}
