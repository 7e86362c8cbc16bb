//! The owning container of a whole object graph.

use crate::arena::Arena;
use crate::behavior::{BlockKind, Function, UpdateBlock};
use crate::component::Component;
use crate::constraint::{Access, Constraint, Endpoint, ValueOrder};
use crate::error::DeclError;
use crate::ids::{BlockId, ComponentId, FuncId, SignalId};
use crate::member::{Container, Member};
use crate::signal::{ShapeSpec, Signal, SignalKind, SignalShape, SignalSpec, SliceRange};
use indexmap::IndexMap;
use std::collections::HashMap;
use weft_common::{Ident, Interner};
use weft_source::SourceDb;

/// Every object of one design, plus the interner and source bodies they use.
#[derive(Default)]
pub struct Design {
    /// Interner for every name in the design.
    pub interner: Interner,
    /// Component instances.
    pub components: Arena<ComponentId, Component>,
    /// State objects, including slice views.
    pub signals: Arena<SignalId, Signal>,
    /// Update block instances.
    pub blocks: Arena<BlockId, UpdateBlock>,
    /// Helper function instances.
    pub funcs: Arena<FuncId, Function>,
    /// Registered block and function bodies.
    pub sources: SourceDb,
    constants: HashMap<Ident, i64>,
}

impl Design {
    /// Creates an empty design.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a name.
    pub fn intern(&self, name: &str) -> Ident {
        self.interner.get_or_intern(name)
    }

    /// Text of an interned name.
    pub fn name(&self, ident: Ident) -> &str {
        self.interner.resolve(ident)
    }

    /// Defines a whole-elaboration constant usable as a static index.
    pub fn set_constant(&mut self, name: &str, value: i64) {
        let ident = self.intern(name);
        self.constants.insert(ident, value);
    }

    /// Value of a constant.
    pub fn constant(&self, name: Ident) -> Option<i64> {
        self.constants.get(&name).copied()
    }

    /// Creates a detached component of class `class`.
    pub fn add_component(&mut self, class: &str) -> ComponentId {
        let class = self.intern(class);
        self.components.alloc(Component::new(class))
    }

    fn claim_field(&self, host: ComponentId, name: Ident) -> Result<(), DeclError> {
        let Some(existing) = self.components[host].fields.get(&name) else {
            return Ok(());
        };
        let existing = match existing {
            Member::Signal(_) => "signal",
            Member::Component(_) => "component",
            Member::Block(_) => "update block",
            Member::Func(_) => "function",
            Member::List(_) => "list",
        };
        Err(DeclError::DuplicateName {
            component: self.component_path(host),
            name: self.name(name).to_string(),
            existing,
        })
    }

    /// Declares a signal, struct or list of them on `host` and returns the field value.
    pub fn add_signal(
        &mut self,
        host: ComponentId,
        name: &str,
        kind: SignalKind,
        spec: &SignalSpec,
    ) -> Result<Member, DeclError> {
        let ident = self.intern(name);
        self.claim_field(host, ident)?;
        let member = self.build_signal(host, kind, name.to_string(), None, spec, &spec.dims);
        self.components[host].fields.insert(ident, member.clone());
        Ok(member)
    }

    fn build_signal(
        &mut self,
        host: ComponentId,
        kind: SignalKind,
        local: String,
        nested: Option<SignalId>,
        spec: &SignalSpec,
        dims: &[u32],
    ) -> Member {
        if let Some((&n, rest)) = dims.split_first() {
            let items = (0..n)
                .map(|i| self.build_signal(host, kind, format!("{local}[{i}]"), nested, spec, rest))
                .collect();
            return Member::List(items);
        }
        let shape = match spec.shape {
            ShapeSpec::Vector(len) => SignalShape::Vector { len },
            _ => SignalShape::Scalar,
        };
        let id = self.signals.alloc(Signal {
            kind,
            host,
            local: local.clone(),
            nested,
            shape,
            slice: None,
            slices: IndexMap::new(),
        });
        self.components[host].signals.push(id);
        if let ShapeSpec::Struct(fields) = &spec.shape {
            let mut built = IndexMap::new();
            for (field, fspec) in fields {
                let member =
                    self.build_signal(host, kind, format!("{local}.{field}"), Some(id), fspec, &fspec.dims);
                built.insert(self.intern(field), member);
            }
            self.signals[id].shape = SignalShape::Struct { fields: built };
        }
        Member::Signal(id)
    }

    /// Declares an update block on `host`.
    pub fn add_block(
        &mut self,
        host: ComponentId,
        name: &str,
        kind: BlockKind,
        source: impl Into<String>,
    ) -> Result<BlockId, DeclError> {
        let ident = self.intern(name);
        self.claim_field(host, ident)?;
        let id = self.blocks.alloc(UpdateBlock {
            name: ident,
            host,
            kind,
            source: source.into(),
        });
        let comp = &mut self.components[host];
        comp.blocks.insert(ident, id);
        comp.fields.insert(ident, Member::Block(id));
        Ok(id)
    }

    /// Declares a helper function on `host`.
    pub fn add_func(
        &mut self,
        host: ComponentId,
        name: &str,
        source: impl Into<String>,
    ) -> Result<FuncId, DeclError> {
        let ident = self.intern(name);
        self.claim_field(host, ident)?;
        let id = self.funcs.alloc(Function {
            name: ident,
            host,
            source: source.into(),
        });
        let comp = &mut self.components[host];
        comp.funcs.insert(ident, id);
        comp.fields.insert(ident, Member::Func(id));
        Ok(id)
    }

    /// Records "`first` before `second`" on `host`.
    ///
    /// Two value endpoints, or a constraint `host` already holds, are rejected.
    pub fn add_constraint(
        &mut self,
        host: ComponentId,
        first: Endpoint,
        second: Endpoint,
    ) -> Result<Constraint, DeclError> {
        let invalid = |reason: String| DeclError::InvalidConstraint {
            component: self.component_path(host),
            reason,
        };
        let constraint = Constraint::between(first, second).ok_or_else(|| {
            invalid("at least one side must be an update block U(..)".to_string())
        })?;
        if self.components[host].constraints.contains(&constraint) {
            return Err(invalid(format!(
                "{} is declared twice",
                self.constraint_text(&constraint)
            )));
        }
        self.components[host].constraints.push(constraint);
        Ok(constraint)
    }

    /// Attaches a detached component, or a list of them, as field `name` of `parent`.
    pub fn attach(
        &mut self,
        parent: ComponentId,
        name: &str,
        member: Member,
    ) -> Result<(), DeclError> {
        let ident = self.intern(name);
        self.claim_field(parent, ident)?;
        let mut placed = Vec::new();
        Self::place(name.to_string(), &member, &mut placed);
        for &(child, _) in &placed {
            let reason = if self.components[child].parent.is_some() {
                Some("it already has a parent")
            } else if child == parent || self.is_ancestor(child, parent) {
                Some("it would become its own ancestor")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(DeclError::InvalidAttach {
                    component: self.component_path(child),
                    reason: reason.to_string(),
                });
            }
        }
        for (child, local) in placed {
            let comp = &mut self.components[child];
            comp.parent = Some(parent);
            comp.local = local;
            self.components[parent].children.push(child);
        }
        self.components[parent].fields.insert(ident, member);
        Ok(())
    }

    fn place(local: String, member: &Member, out: &mut Vec<(ComponentId, String)>) {
        match member {
            Member::Component(c) => out.push((*c, local)),
            Member::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    Self::place(format!("{local}[{i}]"), item, out);
                }
            }
            _ => {}
        }
    }

    /// Detaches field `name` of `parent` and returns it. Components in it lose
    /// their parent; nothing else changes.
    pub fn detach(&mut self, parent: ComponentId, name: &str) -> Result<Member, DeclError> {
        let ident = self.interner.get(name);
        let member = ident
            .and_then(|i| self.components[parent].fields.get(&i))
            .filter(|m| !m.components().is_empty())
            .cloned()
            .ok_or_else(|| DeclError::NoSuchField {
                component: self.component_path(parent),
                name: name.to_string(),
            })?;
        let removed = member.components();
        for &child in &removed {
            self.components[child].parent = None;
        }
        let comp = &mut self.components[parent];
        comp.children.retain(|c| !removed.contains(c));
        if let Some(i) = ident {
            comp.fields.shift_remove(&i);
        }
        Ok(member)
    }

    /// Returns the slice view `[lo, hi)` of a vector, creating and registering
    /// it on first use. Slicing a slice view yields a view of the same base.
    pub fn slice_view(&mut self, base: SignalId, lo: i64, hi: i64) -> Result<SignalId, DeclError> {
        let (root, offset) = match self.signals[base].slice {
            Some(range) => match self.signals[base].nested {
                Some(parent) => (parent, range.lo as i64),
                None => (base, 0),
            },
            None => (base, 0),
        };
        let width = self.signals[base]
            .width()
            .ok_or_else(|| DeclError::NotSliceable {
                signal: self.signal_path(base),
            })?;
        if lo < 0 || hi <= lo || hi > width as i64 {
            return Err(DeclError::InvalidSlice {
                signal: self.signal_path(base),
                lo,
                hi,
            });
        }
        let range = SliceRange::new((lo + offset) as u32, (hi + offset) as u32);
        if let Some(&existing) = self.signals[root].slices.get(&range) {
            return Ok(existing);
        }
        let parent = &self.signals[root];
        let view = Signal {
            kind: parent.kind,
            host: parent.host,
            local: format!("{}{range}", parent.local),
            nested: Some(root),
            shape: SignalShape::Vector {
                len: range.width(),
            },
            slice: Some(range),
            slices: IndexMap::new(),
        };
        let id = self.signals.alloc(view);
        self.signals[root].slices.insert(range, id);
        Ok(id)
    }

    /// Container view of a member, if it can be stepped through.
    pub fn container<'a>(&'a self, member: &'a Member) -> Option<&'a dyn Container> {
        match member {
            Member::Component(c) => Some(&self.components[*c]),
            Member::Signal(s) => Some(&self.signals[*s]),
            Member::List(items) => Some(items),
            Member::Block(_) | Member::Func(_) => None,
        }
    }

    /// Returns `true` if `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: ComponentId, node: ComponentId) -> bool {
        let mut cur = self.components[node].parent;
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.components[c].parent;
        }
        false
    }

    /// Topmost ancestor of `node`.
    pub fn root_of(&self, node: ComponentId) -> ComponentId {
        let mut cur = node;
        while let Some(p) = self.components[cur].parent {
            cur = p;
        }
        cur
    }

    /// `root` and all of its descendants, parents before children.
    pub fn subtree(&self, root: ComponentId) -> Vec<ComponentId> {
        let mut out = vec![root];
        let mut i = 0;
        while i < out.len() {
            out.extend(self.components[out[i]].children.iter().copied());
            i += 1;
        }
        out
    }

    /// Dotted path of a component, rooted at `s`.
    pub fn component_path(&self, id: ComponentId) -> String {
        let mut parts = Vec::new();
        let mut cur = Some(id);
        while let Some(c) = cur {
            let comp = &self.components[c];
            if comp.parent.is_some() {
                parts.push(comp.local.as_str());
            }
            cur = comp.parent;
        }
        parts.push("s");
        parts.reverse();
        parts.join(".")
    }

    /// Dotted path of a signal.
    pub fn signal_path(&self, id: SignalId) -> String {
        let sig = &self.signals[id];
        format!("{}.{}", self.component_path(sig.host), sig.local)
    }

    /// Dotted path of a block.
    pub fn block_path(&self, id: BlockId) -> String {
        let blk = &self.blocks[id];
        format!("{}.{}", self.component_path(blk.host), self.name(blk.name))
    }

    /// Dotted path of a function.
    pub fn func_path(&self, id: FuncId) -> String {
        let func = &self.funcs[id];
        format!("{}.{}", self.component_path(func.host), self.name(func.name))
    }

    /// Renders a constraint as `U(..) < RD(..)`.
    pub fn constraint_text(&self, constraint: &Constraint) -> String {
        match *constraint {
            Constraint::BlockOrder { before, after } => {
                format!("U({}) < U({})", self.block_path(before), self.block_path(after))
            }
            Constraint::Value {
                access,
                signal,
                block,
                order,
            } => {
                let tag = match access {
                    Access::Read => "RD",
                    Access::Write => "WR",
                };
                let value = format!("{tag}({})", self.signal_path(signal));
                let block = format!("U({})", self.block_path(block));
                match order {
                    ValueOrder::BeforeBlock => format!("{value} < {block}"),
                    ValueOrder::AfterBlock => format!("{block} < {value}"),
                }
            }
        }
    }
}

impl std::fmt::Debug for Design {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Design")
            .field("components", &self.components.len())
            .field("signals", &self.signals.len())
            .field("blocks", &self.blocks.len())
            .field("funcs", &self.funcs.len())
            .finish()
    }
}
