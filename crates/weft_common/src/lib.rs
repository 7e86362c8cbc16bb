//! Foundational types shared by every crate of the weft elaboration engine.
//!
//! Provides interned names for fields, blocks, functions and component classes,
//! content hashing used to key the extraction cache, and the internal error type
//! for invariant breaks inside the engine itself.

#![warn(missing_docs)]

pub mod hash;
pub mod ident;
pub mod result;

pub use hash::ContentHash;
pub use ident::{Ident, Interner};
pub use result::{InternalError, WeftResult};
