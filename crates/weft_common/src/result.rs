//! Internal error type.

/// Result of an operation that can only fail because of a bug in weft itself.
pub type WeftResult<T> = Result<T, InternalError>;

/// An engine invariant was broken.
///
/// User mistakes in the modeled design are reported through the elaboration
/// error taxonomy; this type is reserved for misuse of the engine's own
/// bookkeeping, such as collecting the same component twice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// What went wrong.
    pub message: String,
}

impl InternalError {
    /// Creates an internal error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let err = InternalError::new("component collected twice");
        assert_eq!(err.to_string(), "internal error: component collected twice");
    }
}
