//! Error and diagnostic system for the EDS transform engine.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Severity levels separating fatal errors from recoverable warnings
//! - Diagnostic collector for accumulating warnings during a conversion
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning with an optional error code, the subject it is
//! about, and help text. Fatal diagnostics are wrapped in [`TransformError`];
//! warnings travel next to a successful result in [`Converted`].
//!
//! # Example
//!
//! ```
//! # use eds_engine::error::{Diagnostic, ErrorCode};
//!
//! let diag = Diagnostic::warning("sitplan reference `Z.9` does not match any element")
//!     .with_code(ErrorCode::E200)
//!     .with_subject("Z.9")
//!     .with_help("the layer was dropped");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod transform_error;

pub(crate) use collector::DiagnosticCollector;
pub(crate) use transform_error::Result;

pub use collector::Converted;
pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use transform_error::TransformError;
