//! Parser for update-block and helper-function bodies, and name-chain extraction.
//!
//! Bodies are written in a small statement language: assignments, `if`/`elif`/
//! `else`, `for .. in`, `return` and expression statements over names, integer
//! and string literals, attribute access, indexing, slicing and calls. Anything
//! outside that grammar is rejected with a [`ParseError`].
//!
//! [`extract`] walks a parsed [`Body`] and returns every reference rooted at the
//! implicit self-reference `s`, split into reads, writes and bare-name calls.

#![warn(missing_docs)]

pub mod ast;
pub mod chain;
pub mod error;
mod expr;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{AssignOp, BinaryOp, Body, Expr, Stmt, UnaryOp};
pub use chain::{extract, CallRef, ChainRef, ChainSegment, Extracted, IndexDesc, NameChain};
pub use error::ParseError;
pub use parser::{parse_body, parse_chain};
