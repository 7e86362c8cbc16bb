//! Source text of block and function bodies, and locations within it.
//!
//! Every update block and helper function body is registered in a [`SourceDb`]
//! under a synthetic name such as `Adder.up_sum`. Spans produced by the parser
//! point into those bodies so errors can name the exact reference at fault.

#![warn(missing_docs)]

pub mod source_db;
pub mod span;

pub use source_db::{ResolvedSpan, SourceDb, SourceFile};
pub use span::{FileId, Span};
