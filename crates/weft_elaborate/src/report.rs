//! Human-readable dump of what every function and block reads, writes and calls.
//!
//! ```text
//! functions
//!   s.f
//!     write s.b
//!     read  s.a
//!     call  s.g
//! update blocks
//!   s.up (comb)
//!     write s.b
//!     read  s.a
//!     call  s.f
//!       write s.b
//!       read  s.a
//!       call  s.g
//! ```
//!
//! A block lists its accesses with every reachable function folded in, then
//! one call tree per direct call showing each function's own accesses.

use crate::elaborator::Elaborator;
use crate::errors::ElabError;
use crate::local::{AccessSets, LocalMeta, Owner};
use indexmap::IndexSet;
use std::fmt::{self, Write};
use weft_common::InternalError;
use weft_ir::{BlockKind, ComponentId, Design, FuncId};

/// Renders the read/write/call report of an elaborated design.
pub fn render_report(design: &Design, elab: &Elaborator) -> Result<String, ElabError> {
    let agg = elab.aggregate()?;
    let mut out = String::new();
    write_report(&mut out, design, elab, agg.components())
        .map_err(|_| InternalError::new("failed to format report"))?;
    Ok(out)
}

fn write_report(
    out: &mut String,
    design: &Design,
    elab: &Elaborator,
    comps: &IndexSet<ComponentId>,
) -> fmt::Result {
    let metas: Vec<&LocalMeta> = comps.iter().filter_map(|&c| elab.local_meta(c)).collect();

    writeln!(out, "functions")?;
    for meta in &metas {
        for (&func, sets) in &meta.funcs {
            writeln!(out, "  {}", design.func_path(func))?;
            write_sets(out, design, sets, 4)?;
            for &callee in &sets.calls {
                writeln!(out, "    call  {}", design.func_path(callee))?;
            }
        }
    }

    writeln!(out, "update blocks")?;
    for meta in &metas {
        for (&block, sets) in &meta.blocks {
            let blk = &design.blocks[block];
            let tag = match blk.kind {
                BlockKind::Combinational => "comb",
                BlockKind::EdgeTriggered => "edge",
            };
            writeln!(out, "  {} ({tag})", design.block_path(block))?;
            write_sets(out, design, sets, 4)?;

            let funcs = &design.components[blk.host].funcs;
            let direct: IndexSet<FuncId> = meta
                .bodies
                .get(&Owner::Block(block))
                .map(|entry| {
                    entry
                        .extracted
                        .calls
                        .iter()
                        .filter_map(|call| funcs.get(&call.name).copied())
                        .collect()
                })
                .unwrap_or_default();
            let mut open = Vec::new();
            for func in direct {
                write_call_tree(out, design, meta, func, 4, &mut open)?;
            }
        }
    }
    Ok(())
}

fn write_sets(out: &mut String, design: &Design, sets: &AccessSets, indent: usize) -> fmt::Result {
    let pad = " ".repeat(indent);
    for &s in &sets.writes {
        writeln!(out, "{pad}write {}", design.signal_path(s))?;
    }
    for &s in &sets.reads {
        writeln!(out, "{pad}read  {}", design.signal_path(s))?;
    }
    Ok(())
}

fn write_call_tree(
    out: &mut String,
    design: &Design,
    meta: &LocalMeta,
    func: FuncId,
    indent: usize,
    open: &mut Vec<FuncId>,
) -> fmt::Result {
    writeln!(out, "{}call  {}", " ".repeat(indent), design.func_path(func))?;
    if open.contains(&func) {
        return Ok(());
    }
    let Some(sets) = meta.funcs.get(&func) else {
        return Ok(());
    };
    open.push(func);
    write_sets(out, design, sets, indent + 2)?;
    for &callee in &sets.calls {
        write_call_tree(out, design, meta, callee, indent + 2, open)?;
    }
    open.pop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elaborator::ElabOptions;
    use weft_ir::{SignalKind, SignalSpec};

    #[test]
    fn nested_call_tree() {
        let mut design = Design::new();
        let top = design.add_component("Top");
        for name in ["a", "b", "c"] {
            design
                .add_signal(top, name, SignalKind::Wire, &SignalSpec::scalar())
                .unwrap();
        }
        design.add_func(top, "f", "s.b = s.a\ng()").unwrap();
        design.add_func(top, "g", "s.c = 1").unwrap();
        design
            .add_block(top, "up", BlockKind::EdgeTriggered, "f()")
            .unwrap();

        let mut elab = Elaborator::new(ElabOptions::default());
        elab.elaborate(&mut design, top).unwrap();
        let text = render_report(&design, &elab).unwrap();
        let expected = "\
functions
  s.f
    write s.b
    read  s.a
    call  s.g
  s.g
    write s.c
update blocks
  s.up (edge)
    write s.b
    write s.c
    read  s.a
    call  s.f
      write s.b
      read  s.a
      call  s.g
        write s.c
";
        assert_eq!(text, expected);
    }

    #[test]
    fn report_needs_elaboration() {
        let design = Design::new();
        let elab = Elaborator::default();
        assert!(matches!(
            render_report(&design, &elab),
            Err(ElabError::NotElaborated { .. })
        ));
    }
}
