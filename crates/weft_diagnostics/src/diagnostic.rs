//! The diagnostic record and its source labels.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use weft_source::Span;

/// Whether a label marks the fault itself or supporting context.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LabelStyle {
    /// Drawn with `^`.
    Primary,
    /// Drawn with `-`.
    Secondary,
}

/// A message attached to a span.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Label {
    /// Annotated span.
    pub span: Span,
    /// Annotation text.
    pub message: String,
    /// Style.
    pub style: LabelStyle,
}

impl Label {
    /// Label on the offending reference.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Primary,
        }
    }

    /// Label on related context.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Secondary,
        }
    }
}

/// A user-facing report of one problem.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity.
    pub severity: Severity,
    /// Stable code.
    pub code: DiagnosticCode,
    /// One-line summary.
    pub message: String,
    /// Where the problem is, or [`Span::DUMMY`] when it has no single location.
    pub primary_span: Span,
    /// Annotated spans.
    pub labels: Vec<Label>,
    /// Supporting detail printed as `= note:` lines.
    pub notes: Vec<String>,
    /// Suggestions printed as `= help:` lines.
    pub help: Vec<String>,
}

impl Diagnostic {
    fn with_severity(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            primary_span: span,
            labels: Vec::new(),
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// An error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::with_severity(Severity::Error, code, message, span)
    }

    /// A warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::with_severity(Severity::Warning, code, message, span)
    }

    /// Adds a label.
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Adds a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help line.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn builder_accumulates() {
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Error, 302),
            "signal `s.y` has multiple writers",
            Span::DUMMY,
        )
        .with_label(Label::primary(Span::DUMMY, "written here"))
        .with_label(Label::secondary(Span::DUMMY, "and here"))
        .with_note("writers: Top.up1, Top.up2");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.labels.len(), 2);
        assert_eq!(diag.labels[1].style, LabelStyle::Secondary);
        assert_eq!(diag.notes, vec!["writers: Top.up1, Top.up2".to_string()]);
        assert!(diag.help.is_empty());
    }

    #[test]
    fn serializes_to_json() {
        let diag = Diagnostic::warning(
            DiagnosticCode::new(Category::Warning, 1),
            "unused",
            Span::DUMMY,
        );
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["message"], "unused");
        assert_eq!(json["severity"], "Warning");
    }
}
