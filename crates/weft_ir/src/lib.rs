//! The live object graph that elaboration runs over.
//!
//! A [`Design`] owns every [`Component`], [`Signal`], [`UpdateBlock`] and
//! [`Function`] in append-only arenas and hands out stable integer handles for
//! them. Components expose their fields as [`Member`] values; anything that can
//! appear in the middle of a name chain implements [`Container`].

#![warn(missing_docs)]

pub mod arena;
pub mod behavior;
pub mod component;
pub mod constraint;
pub mod design;
pub mod error;
pub mod ids;
pub mod member;
pub mod signal;

pub use arena::{Arena, Handle};
pub use behavior::{BlockKind, Function, UpdateBlock};
pub use component::Component;
pub use constraint::{Access, Constraint, Endpoint, ValueOrder};
pub use design::Design;
pub use error::DeclError;
pub use ids::{BlockId, ComponentId, FuncId, SignalId};
pub use member::{Container, Member};
pub use signal::{ShapeSpec, Signal, SignalKind, SignalShape, SignalSpec, SliceRange};
