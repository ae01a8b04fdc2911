//! Diagnostics collector threaded through lexing, parsing and resolution.
//!
//! Each stage appends to the shared list and continues with best-effort
//! recovery; the caller receives both a (possibly partial) result and the
//! accumulated diagnostics, ordered by source position.

use crate::{Diagnostic, Severity};

/// Accumulates diagnostics for one document across all compiler stages.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Record a diagnostic.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.records.push(diagnostic);
    }

    /// Whether any diagnostic has been recorded.
    ///
    /// A document with any accumulated diagnostic never produces an IR.
    pub fn has_errors(&self) -> bool {
        !self.records.is_empty()
    }

    /// Whether a fatal diagnostic has been recorded.
    pub fn has_fatal(&self) -> bool {
        self.records.iter().any(|d| d.severity == Severity::Fatal)
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over the recorded diagnostics in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter()
    }

    /// Consume the collector, returning diagnostics ordered by source
    /// position (diagnostics without a primary span sort first).
    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.records
            .sort_by_key(|d| d.primary_span().map_or(0, |s| s.start));
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use tidl_ir::Span;

    #[test]
    fn test_collector_accumulates() {
        let mut diags = Diagnostics::new();
        assert!(!diags.has_errors());
        assert!(diags.is_empty());

        diags.emit(Diagnostic::error(ErrorCode::E1001).with_message("first"));
        diags.emit(Diagnostic::error(ErrorCode::E1001).with_message("second"));

        assert!(diags.has_errors());
        assert!(!diags.has_fatal());
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn test_collector_detects_fatal() {
        let mut diags = Diagnostics::new();
        diags.emit(Diagnostic::fatal(ErrorCode::E2002).with_message("cycle"));
        assert!(diags.has_fatal());
    }

    #[test]
    fn test_into_sorted_orders_by_span() {
        let mut diags = Diagnostics::new();
        diags.emit(
            Diagnostic::error(ErrorCode::E1001)
                .with_message("later")
                .with_label(Span::new(50, 55), "here"),
        );
        diags.emit(
            Diagnostic::error(ErrorCode::E1001)
                .with_message("earlier")
                .with_label(Span::new(5, 10), "here"),
        );

        let sorted = diags.into_sorted();
        assert_eq!(sorted[0].message, "earlier");
        assert_eq!(sorted[1].message, "later");
    }
}
