//! Local elaboration: everything that can be worked out from one component
//! instance alone.
//!
//! Functions are resolved first, since blocks fold in the read and write
//! sets of every function they reach.

use crate::cache::{ChainCache, ExtractedBody};
use crate::callgraph::CallGraph;
use crate::errors::{CallPath, ElabError};
use crate::resolve::{Holes, RefSite, Resolver};
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;
use weft_ir::{BlockId, BlockKind, ComponentId, Constraint, Design, FuncId, SignalId};
use weft_parser::ChainRef;
use weft_source::Span;

/// A block or function instance that contains references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    /// An update block.
    Block(BlockId),
    /// A helper function.
    Func(FuncId),
}

/// Resolved reads, writes and calls of one block or function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessSets {
    /// Signals read.
    pub reads: IndexSet<SignalId>,
    /// Signals written.
    pub writes: IndexSet<SignalId>,
    /// Functions called.
    pub calls: IndexSet<FuncId>,
}

impl AccessSets {
    /// Returns `true` if any read or write touches a signal in `signals`.
    pub fn touches(&self, signals: &IndexSet<SignalId>) -> bool {
        self.reads.iter().chain(&self.writes).any(|s| signals.contains(s))
    }
}

/// Per-component result of local elaboration.
#[derive(Debug, Default)]
pub struct LocalMeta {
    /// Blocks with function accesses folded in and calls flattened.
    pub blocks: IndexMap<BlockId, AccessSets>,
    /// Functions with their own accesses and direct calls only.
    pub funcs: IndexMap<FuncId, AccessSets>,
    /// Parsed body of every block and function.
    pub bodies: IndexMap<Owner, Arc<ExtractedBody>>,
    /// Edge-triggered blocks.
    pub edge_blocks: IndexSet<BlockId>,
    /// Explicit constraints declared by the component.
    pub constraints: Vec<Constraint>,
    /// Signals each reference resolved to, keyed by owner and reference span.
    pub references: IndexMap<(Owner, Span), IndexSet<SignalId>>,
    /// Some reference stepped into a removed field and selected nothing.
    pub dangling: bool,
}

/// Runs extraction, resolution and call-graph expansion for `comp`.
///
/// References into `holes` resolve to nothing and mark the result dangling.
pub fn elaborate_local(
    design: &mut Design,
    cache: &mut ChainCache,
    comp: ComponentId,
    strict_bounds: bool,
    holes: &Holes,
) -> Result<LocalMeta, ElabError> {
    tracing::debug!(component = %design.component_path(comp), "local elaboration");
    let class = design.components[comp].class;
    let funcs: Vec<FuncId> = design.components[comp].funcs.values().copied().collect();
    let blocks: Vec<BlockId> = design.components[comp].blocks.values().copied().collect();

    let mut meta = LocalMeta {
        constraints: design.components[comp].constraints.clone(),
        ..LocalMeta::default()
    };

    let mut graph = CallGraph::new();
    for &func in &funcs {
        let (name, source) = {
            let f = &design.funcs[func];
            (f.name, f.source.clone())
        };
        let body = cache.get_or_extract(design, class, name, &source)?;
        let owner = Owner::Func(func);
        let sets = resolve_body(design, comp, &body, owner, strict_bounds, holes, &mut meta)?;
        graph.add_func(func);
        for &callee in &sets.calls {
            graph.add_call(func, callee);
        }
        meta.funcs.insert(func, sets);
        meta.bodies.insert(owner, body);
    }

    for &block in &blocks {
        let (name, kind, source) = {
            let b = &design.blocks[block];
            (b.name, b.kind, b.source.clone())
        };
        let body = cache.get_or_extract(design, class, name, &source)?;
        let owner = Owner::Block(block);
        let mut sets = resolve_body(design, comp, &body, owner, strict_bounds, holes, &mut meta)?;

        let reached = graph.expand(&sets.calls).map_err(|cycle| ElabError::CallCycle {
            path: CallPath {
                block: design.block_path(block),
                funcs: cycle.into_iter().map(|f| design.func_path(f)).collect(),
            },
        })?;
        for func in &reached {
            if let Some(callee) = meta.funcs.get(func) {
                sets.reads.extend(callee.reads.iter().copied());
                sets.writes.extend(callee.writes.iter().copied());
            }
        }
        sets.calls = reached;

        if kind == BlockKind::EdgeTriggered {
            meta.edge_blocks.insert(block);
        }
        meta.blocks.insert(block, sets);
        meta.bodies.insert(owner, body);
    }
    Ok(meta)
}

fn resolve_body(
    design: &mut Design,
    comp: ComponentId,
    body: &ExtractedBody,
    owner: Owner,
    strict_bounds: bool,
    holes: &Holes,
    meta: &mut LocalMeta,
) -> Result<AccessSets, ElabError> {
    let owner_path = match owner {
        Owner::Block(b) => design.block_path(b),
        Owner::Func(f) => design.func_path(f),
    };
    let mut sets = AccessSets::default();

    // Calls through names the component does not define are external.
    for call in &body.extracted.calls {
        if let Some(&func) = design.components[comp].funcs.get(&call.name) {
            sets.calls.insert(func);
        }
    }

    let mut resolver = Resolver::new(design, strict_bounds).with_holes(holes);
    let mut resolve_all = |refs: &[ChainRef], out: &mut IndexSet<SignalId>| {
        for r in refs {
            let site = RefSite {
                owner: &owner_path,
                span: r.span,
            };
            let found = resolver.resolve(comp, &r.chain, site)?;
            out.extend(found.iter().copied());
            meta.references
                .entry((owner, r.span))
                .or_default()
                .extend(found);
        }
        Ok::<(), ElabError>(())
    };
    resolve_all(&body.extracted.reads, &mut sets.reads)?;
    resolve_all(&body.extracted.writes, &mut sets.writes)?;
    meta.dangling |= resolver.hit_hole();
    Ok(sets)
}
