//! Structured diagnostics for elaboration failures and their terminal rendering.
//!
//! Every elaboration error is turned into a [`Diagnostic`] carrying a stable
//! [`DiagnosticCode`], the span of the offending reference when one exists,
//! and free-form notes such as the full call chain of a helper-call cycle.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::{Diagnostic, Label, LabelStyle};
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
