//! State objects.

use crate::ids::{ComponentId, SignalId};
use crate::member::Member;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use weft_common::Ident;

/// Declared direction of a state object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    /// Driven from the parent component.
    InPort,
    /// Driven by its own component.
    OutPort,
    /// Internal to its component.
    Wire,
    /// Never driven at run time; accesses are unrestricted.
    Const,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignalKind::InPort => "input port",
            SignalKind::OutPort => "output port",
            SignalKind::Wire => "wire",
            SignalKind::Const => "constant",
        })
    }
}

/// Half-open index range `[lo, hi)` of a slice view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SliceRange {
    /// First index, inclusive.
    pub lo: u32,
    /// Last index, exclusive.
    pub hi: u32,
}

impl SliceRange {
    /// Creates a range.
    pub fn new(lo: u32, hi: u32) -> Self {
        Self { lo, hi }
    }

    /// Returns `true` if the two ranges share at least one index.
    pub fn overlaps(self, other: SliceRange) -> bool {
        self.lo < other.hi && other.lo < self.hi
    }

    /// Number of indices covered.
    pub fn width(self) -> u32 {
        self.hi - self.lo
    }
}

impl fmt::Display for SliceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.width() == 1 {
            write!(f, "[{}]", self.lo)
        } else {
            write!(f, "[{}:{}]", self.lo, self.hi)
        }
    }
}

/// Shape of a live state object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalShape {
    /// Indivisible.
    Scalar,
    /// Sliceable vector of `len` elements.
    Vector {
        /// Element count.
        len: u32,
    },
    /// Named fields, each a signal or a list of signals.
    Struct {
        /// Fields in declaration order.
        fields: IndexMap<Ident, Member>,
    },
}

/// A unit of typed state.
#[derive(Debug, Clone)]
pub struct Signal {
    /// Direction.
    pub kind: SignalKind,
    /// Component that declared this object.
    pub host: ComponentId,
    /// Path relative to `host`, such as `x[2].y` or `v[0:4]`.
    pub local: String,
    /// Struct or vector this object was taken from.
    pub nested: Option<SignalId>,
    /// Shape.
    pub shape: SignalShape,
    /// Set when this object is a slice view of `nested`.
    pub slice: Option<SliceRange>,
    /// Slice views registered on this vector, keyed by range.
    pub slices: IndexMap<SliceRange, SignalId>,
}

impl Signal {
    /// Vector length, if this is a vector.
    pub fn width(&self) -> Option<u32> {
        match self.shape {
            SignalShape::Vector { len } => Some(len),
            _ => None,
        }
    }

    /// Returns `true` for slice views.
    pub fn is_slice(&self) -> bool {
        self.slice.is_some()
    }
}

/// Shape requested when declaring a signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeSpec {
    /// Indivisible.
    Scalar,
    /// Vector of the given length.
    Vector(u32),
    /// Struct with named fields.
    Struct(Vec<(String, SignalSpec)>),
}

/// Declaration request for a signal or struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalSpec {
    /// Element shape.
    pub shape: ShapeSpec,
    /// List dimensions, outermost first. Empty for a single object.
    pub dims: Vec<u32>,
}

impl SignalSpec {
    /// A single indivisible object.
    pub fn scalar() -> Self {
        Self {
            shape: ShapeSpec::Scalar,
            dims: Vec::new(),
        }
    }

    /// A single vector.
    pub fn vector(len: u32) -> Self {
        Self {
            shape: ShapeSpec::Vector(len),
            dims: Vec::new(),
        }
    }

    /// A single struct.
    pub fn structure<S: Into<String>>(fields: impl IntoIterator<Item = (S, SignalSpec)>) -> Self {
        Self {
            shape: ShapeSpec::Struct(fields.into_iter().map(|(n, s)| (n.into(), s)).collect()),
            dims: Vec::new(),
        }
    }

    /// Turns this into a list with the given dimensions.
    pub fn array(mut self, dims: impl IntoIterator<Item = u32>) -> Self {
        self.dims = dims.into_iter().collect();
        self
    }
}
