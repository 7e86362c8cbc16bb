//! Whole-design metadata merged from every collected component.
//!
//! [`Aggregate::collect`] folds one component's [`LocalMeta`] in and
//! [`Aggregate::uncollect`] takes exactly that contribution back out.
//! Constraints are reference-counted, so two components declaring the same
//! constraint do not lose it when only one of them is removed.

use crate::local::{AccessSets, LocalMeta};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hash;
use weft_common::{InternalError, WeftResult};
use weft_ir::{Access, BlockId, ComponentId, Constraint, Design, FuncId, SignalId, ValueOrder};

/// A set whose members remember how many times they were added.
#[derive(Debug, Clone)]
struct Tally<K: Hash + Eq> {
    counts: IndexMap<K, usize>,
}

impl<K: Hash + Eq> Default for Tally<K> {
    fn default() -> Self {
        Self {
            counts: IndexMap::new(),
        }
    }
}

impl<K: Hash + Eq + Copy> Tally<K> {
    fn add(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    fn remove(&mut self, key: K) {
        if let Some(n) = self.counts.get_mut(&key) {
            *n -= 1;
            if *n == 0 {
                self.counts.shift_remove(&key);
            }
        }
    }

    fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.counts.keys().copied()
    }

    fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

type ValueTally = IndexMap<SignalId, Tally<(ValueOrder, BlockId)>>;

/// Aggregated metadata of an elaborated tree.
#[derive(Debug, Default)]
pub struct Aggregate {
    components: IndexSet<ComponentId>,
    signals: IndexSet<SignalId>,
    edge_blocks: IndexSet<BlockId>,
    block_order: Tally<(BlockId, BlockId)>,
    read_constraints: ValueTally,
    write_constraints: ValueTally,
    blocks: IndexMap<BlockId, AccessSets>,
    funcs: IndexMap<FuncId, AccessSets>,
}

impl Aggregate {
    /// Creates an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges the local metadata of `comp`.
    pub fn collect(&mut self, comp: ComponentId, meta: &LocalMeta) -> WeftResult<()> {
        if !self.components.insert(comp) {
            return Err(InternalError::new(format!(
                "component {} collected twice",
                comp.as_raw()
            )));
        }
        self.edge_blocks.extend(meta.edge_blocks.iter().copied());
        for constraint in &meta.constraints {
            self.add_constraint(constraint);
        }
        for (&block, sets) in &meta.blocks {
            if self.blocks.insert(block, sets.clone()).is_some() {
                return Err(InternalError::new(format!(
                    "block {} collected twice",
                    block.as_raw()
                )));
            }
        }
        for (&func, sets) in &meta.funcs {
            self.funcs.insert(func, sets.clone());
        }
        Ok(())
    }

    /// Reverses a prior [`collect`](Self::collect) of `comp` with the same metadata.
    pub fn uncollect(&mut self, comp: ComponentId, meta: &LocalMeta) -> WeftResult<()> {
        if !self.components.shift_remove(&comp) {
            return Err(InternalError::new(format!(
                "component {} was never collected",
                comp.as_raw()
            )));
        }
        for block in &meta.edge_blocks {
            self.edge_blocks.shift_remove(block);
        }
        for constraint in &meta.constraints {
            self.remove_constraint(constraint);
        }
        for block in meta.blocks.keys() {
            self.blocks.shift_remove(block);
        }
        for func in meta.funcs.keys() {
            self.funcs.shift_remove(func);
        }
        Ok(())
    }

    fn add_constraint(&mut self, constraint: &Constraint) {
        match *constraint {
            Constraint::BlockOrder { before, after } => self.block_order.add((before, after)),
            Constraint::Value {
                access,
                signal,
                block,
                order,
            } => self
                .value_tally_mut(access)
                .entry(signal)
                .or_default()
                .add((order, block)),
        }
    }

    fn remove_constraint(&mut self, constraint: &Constraint) {
        match *constraint {
            Constraint::BlockOrder { before, after } => self.block_order.remove((before, after)),
            Constraint::Value {
                access,
                signal,
                block,
                order,
            } => {
                let tally = self.value_tally_mut(access);
                if let Some(set) = tally.get_mut(&signal) {
                    set.remove((order, block));
                    if set.is_empty() {
                        tally.shift_remove(&signal);
                    }
                }
            }
        }
    }

    fn value_tally_mut(&mut self, access: Access) -> &mut ValueTally {
        match access {
            Access::Read => &mut self.read_constraints,
            Access::Write => &mut self.write_constraints,
        }
    }

    /// Adds declared signals to the global set.
    pub fn add_signals(&mut self, signals: impl IntoIterator<Item = SignalId>) {
        self.signals.extend(signals);
    }

    /// Drops signals from the global set.
    pub fn remove_signals(&mut self, signals: &IndexSet<SignalId>) {
        self.signals.retain(|s| !signals.contains(s));
    }

    /// Collected components.
    pub fn components(&self) -> &IndexSet<ComponentId> {
        &self.components
    }

    /// Declared signals of every collected component.
    pub fn signals(&self) -> &IndexSet<SignalId> {
        &self.signals
    }

    /// Edge-triggered blocks.
    pub fn edge_blocks(&self) -> &IndexSet<BlockId> {
        &self.edge_blocks
    }

    /// Block-before-block constraints.
    pub fn block_order(&self) -> impl Iterator<Item = (BlockId, BlockId)> + '_ {
        self.block_order.keys()
    }

    /// Read or write constraints as `(signal, order, block)`.
    pub fn value_constraints(
        &self,
        access: Access,
    ) -> impl Iterator<Item = (SignalId, ValueOrder, BlockId)> + '_ {
        let tally = match access {
            Access::Read => &self.read_constraints,
            Access::Write => &self.write_constraints,
        };
        tally
            .iter()
            .flat_map(|(&signal, set)| set.keys().map(move |(order, block)| (signal, order, block)))
    }

    /// Every collected block with its folded accesses.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &AccessSets)> {
        self.blocks.iter().map(|(&b, sets)| (b, sets))
    }

    /// Accesses of one block.
    pub fn block(&self, block: BlockId) -> Option<&AccessSets> {
        self.blocks.get(&block)
    }

    /// Direct accesses of one function.
    pub fn func(&self, func: FuncId) -> Option<&AccessSets> {
        self.funcs.get(&func)
    }

    /// Signals read by `block`, including through functions.
    pub fn block_reads(&self, block: BlockId) -> Option<&IndexSet<SignalId>> {
        self.block(block).map(|s| &s.reads)
    }

    /// Signals written by `block`, including through functions.
    pub fn block_writes(&self, block: BlockId) -> Option<&IndexSet<SignalId>> {
        self.block(block).map(|s| &s.writes)
    }

    /// Functions reachable from `block`.
    pub fn block_calls(&self, block: BlockId) -> Option<&IndexSet<FuncId>> {
        self.block(block).map(|s| &s.calls)
    }

    /// A name-keyed, order-independent snapshot.
    pub fn summary(&self, design: &Design) -> Summary {
        let paths = |set: &IndexSet<SignalId>| -> BTreeSet<String> {
            set.iter().map(|&s| design.signal_path(s)).collect()
        };
        let values = |access| {
            let mut out: BTreeMap<String, BTreeSet<(String, String)>> = BTreeMap::new();
            for (signal, order, block) in self.value_constraints(access) {
                let order = match order {
                    ValueOrder::BeforeBlock => "before",
                    ValueOrder::AfterBlock => "after",
                };
                out.entry(design.signal_path(signal))
                    .or_default()
                    .insert((order.to_string(), design.block_path(block)));
            }
            out
        };
        let mut summary = Summary {
            components: self
                .components
                .iter()
                .map(|&c| design.component_path(c))
                .collect(),
            signals: paths(&self.signals),
            edge_blocks: self
                .edge_blocks
                .iter()
                .map(|&b| design.block_path(b))
                .collect(),
            block_order: self
                .block_order()
                .map(|(a, b)| (design.block_path(a), design.block_path(b)))
                .collect(),
            read_constraints: values(Access::Read),
            write_constraints: values(Access::Write),
            ..Summary::default()
        };
        for (&block, sets) in &self.blocks {
            let name = design.block_path(block);
            summary.block_reads.insert(name.clone(), paths(&sets.reads));
            summary.block_writes.insert(name.clone(), paths(&sets.writes));
            summary.block_calls.insert(
                name,
                sets.calls.iter().map(|&f| design.func_path(f)).collect(),
            );
        }
        summary
    }
}

/// Aggregated metadata keyed by path, comparable across elaborations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Component paths.
    pub components: BTreeSet<String>,
    /// Declared signal paths.
    pub signals: BTreeSet<String>,
    /// Edge-triggered block paths.
    pub edge_blocks: BTreeSet<String>,
    /// `(before, after)` block pairs.
    pub block_order: BTreeSet<(String, String)>,
    /// Signal to `(before|after, block)` read constraints.
    pub read_constraints: BTreeMap<String, BTreeSet<(String, String)>>,
    /// Signal to `(before|after, block)` write constraints.
    pub write_constraints: BTreeMap<String, BTreeSet<(String, String)>>,
    /// Block to signals read.
    pub block_reads: BTreeMap<String, BTreeSet<String>>,
    /// Block to signals written.
    pub block_writes: BTreeMap<String, BTreeSet<String>>,
    /// Block to functions reached.
    pub block_calls: BTreeMap<String, BTreeSet<String>>,
}
