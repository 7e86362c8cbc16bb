//! Human-readable rendering.

use crate::diagnostic::{Diagnostic, LabelStyle};
use weft_source::SourceDb;

/// Formats a diagnostic for some output target.
pub trait DiagnosticRenderer {
    /// Renders one diagnostic.
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String;
}

/// rustc-style output:
///
/// ```text
/// error[E301]: cannot resolve field `bb` of `s`
///   --> Top.up1:1:5
///    |
///  1 | s.b = s.bb
///    |       ^^^^ no such field
///    |
///    = note: in block `Top.up1`
/// ```
pub struct TerminalRenderer {
    /// Emit ANSI colors.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = String::new();
        let head = format!("{}[{}]", diag.severity, diag.code);
        let head = if self.color {
            diag.severity.paint(&head)
        } else {
            head
        };
        out.push_str(&format!("{head}: {}\n", diag.message));

        if let Some(resolved) = source_db.resolve_span(diag.primary_span) {
            let file = source_db.get_file(diag.primary_span.file);
            let line_no = resolved.start_line.to_string();
            let gutter = " ".repeat(line_no.len());
            out.push_str(&format!("{gutter}--> {resolved}\n"));
            out.push_str(&format!("{gutter} |\n"));
            out.push_str(&format!(
                "{line_no} | {}\n",
                file.line_text(resolved.start_line)
            ));
            let width = if resolved.end_line == resolved.start_line {
                (resolved.end_col + 1).saturating_sub(resolved.start_col).max(1)
            } else {
                1
            };
            let label = diag
                .labels
                .iter()
                .find(|l| l.style == LabelStyle::Primary)
                .map(|l| format!(" {}", l.message))
                .unwrap_or_default();
            out.push_str(&format!(
                "{gutter} | {}{}{label}\n",
                " ".repeat(resolved.start_col as usize - 1),
                "^".repeat(width as usize)
            ));
            for secondary in diag
                .labels
                .iter()
                .filter(|l| l.style == LabelStyle::Secondary)
            {
                if let Some(at) = source_db.resolve_span(secondary.span) {
                    out.push_str(&format!("{gutter} - {at}: {}\n", secondary.message));
                }
            }
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        out
    }
}
