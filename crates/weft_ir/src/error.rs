//! Errors raised while declaring objects.

/// A declaration was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclError {
    /// A field name is already taken on the component, for example by a
    /// block and a function with the same name.
    #[error("`{name}` is declared twice in `{component}` (already a {existing})")]
    DuplicateName {
        /// Path of the component.
        component: String,
        /// The contested name.
        name: String,
        /// What already holds the name.
        existing: &'static str,
    },

    /// An explicit constraint cannot be recorded.
    #[error("invalid constraint in `{component}`: {reason}")]
    InvalidConstraint {
        /// Path of the declaring component.
        component: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Slice bounds do not fit the vector.
    #[error("slice [{lo}:{hi}] is out of bounds for `{signal}`")]
    InvalidSlice {
        /// Path of the sliced signal.
        signal: String,
        /// Requested lower bound.
        lo: i64,
        /// Requested upper bound.
        hi: i64,
    },

    /// The signal cannot be sliced at all.
    #[error("`{signal}` is not a vector and cannot be sliced")]
    NotSliceable {
        /// Path of the signal.
        signal: String,
    },

    /// A component was attached while it already had a parent, or under
    /// one of its own descendants.
    #[error("cannot attach `{component}`: {reason}")]
    InvalidAttach {
        /// Path or class of the component.
        component: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No field with that name exists.
    #[error("`{component}` has no field `{name}`")]
    NoSuchField {
        /// Path of the component.
        component: String,
        /// Requested field.
        name: String,
    },
}
