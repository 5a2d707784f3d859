//! Collector for accumulating diagnostics during a conversion.
//!
//! The [`DiagnosticCollector`] lets each stage report recoverable problems
//! (unresolved sitplan references, missing assets, malformed numbers) and
//! keep going. Every emitted diagnostic is also logged.

use log::{error, warn};

use crate::error::{Diagnostic, TransformError};

/// The result of a successful conversion together with its warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted<T> {
    value: T,
    warnings: Vec<Diagnostic>,
}

impl<T> Converted<T> {
    /// Wrap a value that produced no warnings.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Get the converted value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Get the warnings emitted while converting.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Split into the value and its warnings.
    pub fn into_parts(self) -> (T, Vec<Diagnostic>) {
        (self.value, self.warnings)
    }

    /// Consume and return the value, discarding warnings.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Transform the value, keeping the warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Converted<U> {
        Converted {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

/// A collector for accumulating diagnostics during a conversion.
///
/// # Example
///
/// ```text
/// let mut collector = DiagnosticCollector::new();
///
/// collector.emit(
///     Diagnostic::warning("sitplan reference `Z.9` does not match any element")
///         .with_code(ErrorCode::E200)
/// );
///
/// // Finish and attach the warnings to the result
/// let converted = collector.finish(layers)?;
/// ```
#[derive(Debug, Default)]
pub(crate) struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    ///
    /// The diagnostic is logged and added to the collection; if it's an
    /// error, the collector is marked as having errors.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            error!(code:? = diagnostic.code(); "{}", diagnostic.message());
            self.has_errors = true;
        } else {
            warn!(code:? = diagnostic.code(); "{}", diagnostic.message());
        }
        self.diagnostics.push(diagnostic);
    }

    /// Returns `true` if an error has been emitted.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Abort with everything collected so far plus `diagnostic`.
    pub fn fail(mut self, diagnostic: Diagnostic) -> TransformError {
        self.emit(diagnostic);
        TransformError::new(self.diagnostics)
    }

    /// Finish collection and return a result.
    ///
    /// - If there are errors, returns `Err(TransformError)` with all diagnostics.
    /// - If there are no errors, returns the value with the warnings.
    pub fn finish<T>(self, value: T) -> Result<Converted<T>, TransformError> {
        if self.has_errors {
            Err(TransformError::new(self.diagnostics))
        } else {
            Ok(Converted {
                value,
                warnings: self.diagnostics,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_collector_new_finish_ok() {
        let collector = DiagnosticCollector::new();
        let converted = collector.finish(5).unwrap();

        assert_eq!(*converted.value(), 5);
        assert!(converted.warnings().is_empty());
    }

    #[test]
    fn test_collector_emit_error_finish_err() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::error("test error"));

        assert!(collector.has_errors());
        assert!(collector.finish(()).is_err());
    }

    #[test]
    fn test_collector_keeps_warnings_on_success() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::warning("warning 1").with_code(ErrorCode::E200));
        collector.emit(Diagnostic::warning("warning 2"));

        let converted = collector.finish("ok").unwrap();
        assert_eq!(converted.warnings().len(), 2);
        assert_eq!(converted.warnings()[0].code(), Some(ErrorCode::E200));
    }

    #[test]
    fn test_collector_fail_includes_earlier_warnings() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("early warning"));

        let err = collector.fail(Diagnostic::error("fatal"));
        assert_eq!(err.diagnostics().len(), 2);
        assert_eq!(err.to_string(), "error: fatal");
    }

    #[test]
    fn test_clean_has_no_warnings() {
        let converted = Converted::clean("value");

        assert_eq!(*converted.value(), "value");
        assert!(converted.warnings().is_empty());
    }

    #[test]
    fn test_converted_map_keeps_warnings() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("w"));
        let converted = collector.finish(2).unwrap().map(|v| v * 10);

        let (value, warnings) = converted.into_parts();
        assert_eq!(value, 20);
        assert_eq!(warnings.len(), 1);
    }
}
