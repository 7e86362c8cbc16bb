//! Configuration errors.

/// Errors raised while loading or validating a `weft.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML was malformed or did not match the schema.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field was empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A component class was referenced but never declared.
    #[error("unknown component class '{0}'")]
    UnknownClass(String),

    /// A value is present but inconsistent.
    #[error("validation error: {0}")]
    ValidationError(String),
}
