//! Interned names.
//!
//! Field, signal, block, function and class names are interned once per
//! design. Chain resolution then walks fields by comparing keys, and a name
//! nobody declared can be rejected without interning it.

use lasso::{Spur, ThreadedRodeo};
use std::fmt;

/// An interned name. Only meaningful together with the [`Interner`] that issued it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Ident(Spur);

/// The name table of one design.
///
/// Names from block bodies, the project file and the construction API share it,
/// so `s.in_` in a body and `in_` in `weft.toml` meet as the same [`Ident`].
#[derive(Default)]
pub struct Interner {
    names: ThreadedRodeo,
}

impl Interner {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `name`.
    pub fn get_or_intern(&self, name: &str) -> Ident {
        Ident(self.names.get_or_intern(name))
    }

    /// The key of `name` if it was ever interned.
    pub fn get(&self, name: &str) -> Option<Ident> {
        self.names.get(name).map(Ident)
    }

    /// Text of `ident`.
    ///
    /// # Panics
    ///
    /// Panics if `ident` came from another interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.names.resolve(&ident.0)
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` before anything is interned.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interner({} names)", self.len())
    }
}
