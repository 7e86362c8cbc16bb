//! Overlapping slices of one vector share one writer.

use super::{CheckContext, LegalityRule};
use crate::errors::{ElabError, WriterConflict, E302};
use weft_diagnostics::DiagnosticCode;

/// Rejects overlapping sibling slices written by different blocks.
pub struct SliceOverlap;

impl LegalityRule for SliceOverlap {
    fn code(&self) -> DiagnosticCode {
        E302
    }

    fn name(&self) -> &str {
        "slice-overlap"
    }

    fn description(&self) -> &str {
        "overlapping slices of a vector must have the same writer"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Result<(), ElabError> {
        let design = ctx.design;
        for &signal in ctx.writers.keys() {
            let sig = &design.signals[signal];
            let (Some(range), Some(base), Some(writer)) = (sig.slice, sig.nested, ctx.writer(signal))
            else {
                continue;
            };
            for (&other_range, &sibling) in &design.signals[base].slices {
                if sibling == signal || !range.overlaps(other_range) {
                    continue;
                }
                match ctx.writer(sibling) {
                    Some(other) if other != writer => {
                        return Err(ElabError::MultiWriter(WriterConflict::SliceOverlap {
                            signal: design.signal_path(signal),
                            writer: design.block_path(writer),
                            sibling: design.signal_path(sibling),
                            sibling_writer: design.block_path(other),
                        }));
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}
