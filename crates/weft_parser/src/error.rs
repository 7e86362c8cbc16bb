//! Parse errors.

use weft_source::Span;

/// A body does not fit the accepted grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    /// What was wrong.
    pub message: String,
    /// Where.
    pub span: Span,
}

impl ParseError {
    /// Creates a parse error.
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}
