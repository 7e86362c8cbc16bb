//! A signal and anything enclosing it share one writer.

use super::{CheckContext, LegalityRule};
use crate::errors::{ElabError, WriterConflict, E302};
use weft_diagnostics::DiagnosticCode;

/// Rejects a struct field, vector element or slice written by a different
/// block than an enclosing signal.
pub struct NestedWriter;

impl LegalityRule for NestedWriter {
    fn code(&self) -> DiagnosticCode {
        E302
    }

    fn name(&self) -> &str {
        "nested-writer"
    }

    fn description(&self) -> &str {
        "a signal and its enclosing struct or vector must have the same writer"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Result<(), ElabError> {
        let design = ctx.design;
        for &signal in ctx.writers.keys() {
            let Some(writer) = ctx.writer(signal) else {
                continue;
            };
            let mut cur = design.signals[signal].nested;
            while let Some(ancestor) = cur {
                if let Some(other) = ctx.writer(ancestor) {
                    if other != writer {
                        return Err(ElabError::MultiWriter(WriterConflict::Nested {
                            signal: design.signal_path(signal),
                            writer: design.block_path(writer),
                            ancestor: design.signal_path(ancestor),
                            ancestor_writer: design.block_path(other),
                        }));
                    }
                }
                cur = design.signals[ancestor].nested;
            }
        }
        Ok(())
    }
}
