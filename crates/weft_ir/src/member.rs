//! Field values and the container capability used to walk name chains.

use crate::component::Component;
use crate::ids::{BlockId, ComponentId, FuncId, SignalId};
use crate::signal::{Signal, SignalShape};
use weft_common::Ident;

/// The value of a named field on a component or struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    /// A state object.
    Signal(SignalId),
    /// A child component.
    Component(ComponentId),
    /// An update block, callable from the scheduler only.
    Block(BlockId),
    /// A helper function.
    Func(FuncId),
    /// A list of members, possibly nested.
    List(Vec<Member>),
}

impl Member {
    /// Every component in this member, depth first.
    pub fn components(&self) -> Vec<ComponentId> {
        let mut out = Vec::new();
        self.walk(&mut |m| {
            if let Member::Component(c) = m {
                out.push(*c);
            }
        });
        out
    }

    /// Every signal handle in this member, depth first. Struct fields are not
    /// expanded; that needs the design.
    pub fn signals(&self) -> Vec<SignalId> {
        let mut out = Vec::new();
        self.walk(&mut |m| {
            if let Member::Signal(s) = m {
                out.push(*s);
            }
        });
        out
    }

    fn walk(&self, f: &mut impl FnMut(&Member)) {
        match self {
            Member::List(items) => items.iter().for_each(|m| m.walk(f)),
            other => f(other),
        }
    }
}

/// Something a name chain can step through.
///
/// Components and structs have named fields, lists have elements and vectors
/// can be sliced. Leaves implement none of these.
pub trait Container {
    /// Value of field `name`.
    fn field(&self, _name: Ident) -> Option<&Member> {
        None
    }

    /// Elements of a list.
    fn elements(&self) -> Option<&[Member]> {
        None
    }

    /// Length of a sliceable vector.
    fn width(&self) -> Option<u32> {
        None
    }
}

impl Container for Component {
    fn field(&self, name: Ident) -> Option<&Member> {
        self.fields.get(&name)
    }
}

impl Container for Signal {
    fn field(&self, name: Ident) -> Option<&Member> {
        match &self.shape {
            SignalShape::Struct { fields } => fields.get(&name),
            _ => None,
        }
    }

    fn width(&self) -> Option<u32> {
        Signal::width(self)
    }
}

impl Container for Vec<Member> {
    fn elements(&self) -> Option<&[Member]> {
        Some(self)
    }
}
