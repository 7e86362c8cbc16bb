//! Helper-function call graph of one component.
//!
//! Calls are resolved by bare name against the component's own functions.
//! Expansion from a block is a depth-first walk that keeps the currently open
//! callers on a stack; re-entering an open function yields the whole path.

use indexmap::IndexSet;
use petgraph::graphmap::DiGraphMap;
use std::collections::HashSet;
use weft_ir::FuncId;

/// Directed graph of direct calls between functions.
#[derive(Debug, Default)]
pub struct CallGraph {
    graph: DiGraphMap<FuncId, ()>,
}

impl CallGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a function with no calls yet.
    pub fn add_func(&mut self, func: FuncId) {
        self.graph.add_node(func);
    }

    /// Records that `caller` calls `callee` directly.
    pub fn add_call(&mut self, caller: FuncId, callee: FuncId) {
        self.graph.add_edge(caller, callee, ());
    }

    /// Direct callees of `func`, in the order the calls were recorded.
    pub fn callees(&self, func: FuncId) -> impl Iterator<Item = FuncId> + '_ {
        self.graph.neighbors(func)
    }

    /// Every function reachable from `direct`, in first-visit order.
    ///
    /// On a cycle, returns the open call path from the first direct call down
    /// to and including the repeated function.
    pub fn expand(&self, direct: &IndexSet<FuncId>) -> Result<IndexSet<FuncId>, Vec<FuncId>> {
        let mut reached = IndexSet::new();
        for &func in direct {
            let mut path = Vec::new();
            let mut open = HashSet::new();
            self.visit(func, &mut path, &mut open, &mut reached)?;
        }
        Ok(reached)
    }

    fn visit(
        &self,
        func: FuncId,
        path: &mut Vec<FuncId>,
        open: &mut HashSet<FuncId>,
        reached: &mut IndexSet<FuncId>,
    ) -> Result<(), Vec<FuncId>> {
        if open.contains(&func) {
            let mut cycle = path.clone();
            cycle.push(func);
            return Err(cycle);
        }
        // Reached but not open means fully explored already.
        if !reached.insert(func) {
            return Ok(());
        }
        open.insert(func);
        path.push(func);
        for callee in self.callees(func) {
            self.visit(callee, path, open, reached)?;
        }
        path.pop();
        open.remove(&func);
        Ok(())
    }
}
