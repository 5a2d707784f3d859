//! The TransformError type for wrapping fatal diagnostics.
//!
//! [`TransformError`] wraps one or more [`Diagnostic`]s that aborted a
//! conversion (envelope decoding, tree normalization, packed reconstruction).

use std::fmt;

use crate::error::Diagnostic;

/// A type alias for `Result<T, Diagnostic>`.
pub type Result<T> = std::result::Result<T, Diagnostic>;

/// Error type for a failed conversion.
///
/// Wraps one or more diagnostics, warnings collected before the failure
/// included.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformError {
    diagnostics: Vec<Diagnostic>,
}

impl TransformError {
    /// Create a new transform error from diagnostics.
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Get all diagnostics in this error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get the diagnostics with error severity.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity().is_error())
    }
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut errors = self.errors();
        if let Some(first) = errors.next() {
            write!(f, "{}", first)?;
            let more = errors.count();
            if more > 0 {
                write!(f, " (+{} more)", more)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for TransformError {}

impl From<Diagnostic> for TransformError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<Vec<Diagnostic>> for TransformError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_transform_error_from_diagnostic() {
        let diag = Diagnostic::error("test error").with_code(ErrorCode::E001);
        let err: TransformError = diag.into();

        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.diagnostics()[0].message(), "test error");
    }

    #[test]
    fn test_transform_error_display_single() {
        let err: TransformError = Diagnostic::error("unknown envelope tag").into();

        assert_eq!(err.to_string(), "error: unknown envelope tag");
    }

    #[test]
    fn test_transform_error_display_skips_warnings() {
        let diags = vec![
            Diagnostic::warning("dropped layer"),
            Diagnostic::error("first error"),
            Diagnostic::error("second error"),
        ];
        let err: TransformError = diags.into();

        assert_eq!(err.diagnostics().len(), 3);
        assert_eq!(err.errors().count(), 2);
        assert_eq!(err.to_string(), "error: first error (+1 more)");
    }
}
