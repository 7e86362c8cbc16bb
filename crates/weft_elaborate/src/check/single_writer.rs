//! Every signal has at most one writing block.

use super::{CheckContext, LegalityRule};
use crate::errors::{ElabError, WriterConflict, E302};
use weft_diagnostics::DiagnosticCode;

/// Rejects a signal written by more than one update block.
pub struct SingleWriter;

impl LegalityRule for SingleWriter {
    fn code(&self) -> DiagnosticCode {
        E302
    }

    fn name(&self) -> &str {
        "single-writer"
    }

    fn description(&self) -> &str {
        "a signal may be written by one update block only"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Result<(), ElabError> {
        for (&signal, blocks) in &ctx.writers {
            if blocks.len() > 1 {
                return Err(ElabError::MultiWriter(WriterConflict::Direct {
                    signal: ctx.design.signal_path(signal),
                    writers: blocks.iter().map(|&b| ctx.design.block_path(b)).collect(),
                }));
            }
        }
        Ok(())
    }
}
