//! Component instances.

use crate::constraint::Constraint;
use crate::ids::{BlockId, ComponentId, FuncId, SignalId};
use crate::member::Member;
use indexmap::IndexMap;
use weft_common::Ident;

/// A node of the component tree.
#[derive(Debug, Clone)]
pub struct Component {
    /// Declaring class.
    pub class: Ident,
    /// Path relative to the parent, such as `child` or `subs[1]`. Empty for a detached root.
    pub local: String,
    /// Parent; `None` for roots and detached subtrees.
    pub parent: Option<ComponentId>,
    /// Named fields: signals, children, blocks and functions.
    pub fields: IndexMap<Ident, Member>,
    /// Owned children in attachment order.
    pub children: Vec<ComponentId>,
    /// Declared state objects, struct fields included, slice views excluded.
    pub signals: Vec<SignalId>,
    /// Update blocks by name.
    pub blocks: IndexMap<Ident, BlockId>,
    /// Helper functions by name.
    pub funcs: IndexMap<Ident, FuncId>,
    /// Explicit ordering constraints declared here.
    pub constraints: Vec<Constraint>,
}

impl Component {
    pub(crate) fn new(class: Ident) -> Self {
        Self {
            class,
            local: String::new(),
            parent: None,
            fields: IndexMap::new(),
            children: Vec::new(),
            signals: Vec::new(),
            blocks: IndexMap::new(),
            funcs: IndexMap::new(),
            constraints: Vec::new(),
        }
    }
}
