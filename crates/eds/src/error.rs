//! Error types for EDS conversions.
//!
//! This module provides the main error type [`EdsError`] which wraps the
//! error conditions that can occur while converting documents.

use std::io;

use thiserror::Error;

use eds_engine::error::{Diagnostic, TransformError};

/// The main error type for EDS operations.
///
/// # Diagnostic Variants
///
/// The `Transform` variant carries structured diagnostics with error codes
/// and help text, suitable for rich error reporting.
#[derive(Debug, Error)]
pub enum EdsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Transform(#[from] TransformError),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<Diagnostic> for EdsError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::Transform(diagnostic.into())
    }
}
