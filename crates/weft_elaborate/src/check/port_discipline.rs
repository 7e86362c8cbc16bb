//! Port-direction discipline.
//!
//! | Kind        | Read                     | Write                            |
//! |-------------|--------------------------|----------------------------------|
//! | input port  | anywhere                 | only from the host's parent      |
//! | output port | anywhere                 | only from the host itself        |
//! | wire        | only from the host       | only from the host               |
//! | constant    | anywhere                 | anywhere                         |

use super::{CheckContext, LegalityRule};
use crate::errors::{AccessRule, ElabError, E303};
use weft_diagnostics::DiagnosticCode;
use weft_ir::{BlockId, SignalId, SignalKind};

/// Rejects ports and wires accessed from the wrong component.
pub struct PortDiscipline;

impl PortDiscipline {
    fn violation(ctx: &CheckContext<'_>, rule: AccessRule, signal: SignalId, block: BlockId) -> ElabError {
        let design = ctx.design;
        ElabError::SignalAccess {
            rule,
            signal: design.signal_path(signal),
            host: design.component_path(design.signals[signal].host),
            block: design.block_path(block),
        }
    }
}

impl LegalityRule for PortDiscipline {
    fn code(&self) -> DiagnosticCode {
        E303
    }

    fn name(&self) -> &str {
        "port-discipline"
    }

    fn description(&self) -> &str {
        "ports are driven from the correct side and wires stay inside their component"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Result<(), ElabError> {
        let design = ctx.design;

        for (block, sets) in ctx.aggregate.blocks() {
            let blk_host = design.blocks[block].host;
            for &signal in &sets.reads {
                let sig = &design.signals[signal];
                if sig.kind == SignalKind::Wire && sig.host != blk_host {
                    return Err(Self::violation(ctx, AccessRule::WireRead, signal, block));
                }
            }
        }

        for (block, sets) in ctx.aggregate.blocks() {
            let blk_host = design.blocks[block].host;
            for &signal in &sets.writes {
                let sig = &design.signals[signal];
                let rule = match sig.kind {
                    SignalKind::InPort
                        if design.components[sig.host].parent != Some(blk_host) =>
                    {
                        AccessRule::InPortWrite
                    }
                    SignalKind::OutPort if sig.host != blk_host => AccessRule::OutPortWrite,
                    SignalKind::Wire if sig.host != blk_host => AccessRule::WireWrite,
                    _ => continue,
                };
                return Err(Self::violation(ctx, rule, signal, block));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::elaborator::{ElabOptions, Elaborator};
    use crate::errors::{AccessRule, ElabError};
    use weft_ir::{BlockKind, Design, Member, SignalKind, SignalSpec};

    fn three_levels(driver_source: &str) -> Result<(), ElabError> {
        let mut design = Design::new();
        let top = design.add_component("Top");
        let mid = design.add_component("Mid");
        let leaf = design.add_component("Leaf");
        design
            .add_signal(leaf, "i", SignalKind::InPort, &SignalSpec::scalar())
            .unwrap();
        design.attach(mid, "leaf", Member::Component(leaf)).unwrap();
        design.attach(top, "mid", Member::Component(mid)).unwrap();
        design
            .add_block(top, "drive", BlockKind::Combinational, driver_source)
            .unwrap();

        let mut elab = Elaborator::new(ElabOptions::default());
        elab.elaborate(&mut design, top)?;
        elab.check(&design)
    }

    #[test]
    fn grandparent_may_not_drive_an_input() {
        match three_levels("s.mid.leaf.i = 1") {
            Err(ElabError::SignalAccess { rule, signal, host, block }) => {
                assert_eq!(rule, AccessRule::InPortWrite);
                assert_eq!(signal, "s.mid.leaf.i");
                assert_eq!(host, "s.mid.leaf");
                assert_eq!(block, "s.drive");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn inputs_are_readable_from_anywhere() {
        assert!(three_levels("print(s.mid.leaf.i)").is_ok());
    }
}
