//! Configuration types for EDS conversions.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! configuration file; every field has a default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`SchemaConfig`] - Where the element type schema comes from.
//! - [`ImportConfig`] - How packed files are written out as YAML.
//!
//! # Example
//!
//! ```
//! # use eds::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.schema().path().is_none());
//! assert!(config.import().extract_images());
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Schema configuration section.
    #[serde(default)]
    schema: SchemaConfig,

    /// Import configuration section.
    #[serde(default)]
    import: ImportConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(schema: SchemaConfig, import: ImportConfig) -> Self {
        Self { schema, import }
    }

    /// Returns the schema configuration.
    pub fn schema(&self) -> &SchemaConfig {
        &self.schema
    }

    /// Returns the import configuration.
    pub fn import(&self) -> &ImportConfig {
        &self.import
    }
}

/// Schema source configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaConfig {
    /// External schema file replacing the bundled one.
    #[serde(default)]
    path: Option<PathBuf>,
}

impl SchemaConfig {
    /// Creates a schema configuration pointing at an external file.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Returns the external schema path, if configured.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Options for converting packed files to YAML.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// Write embedded sitplan images next to the YAML file.
    #[serde(default = "enabled")]
    extract_images: bool,

    /// Render display labels as inline `#A.1` comments instead of
    /// `_comment` keys.
    #[serde(default = "enabled")]
    inline_comments: bool,
}

fn enabled() -> bool {
    true
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            extract_images: true,
            inline_comments: true,
        }
    }
}

impl ImportConfig {
    /// Creates an import configuration.
    pub fn new(extract_images: bool, inline_comments: bool) -> Self {
        Self {
            extract_images,
            inline_comments,
        }
    }

    pub fn extract_images(&self) -> bool {
        self.extract_images
    }

    pub fn inline_comments(&self) -> bool {
        self.inline_comments
    }
}
