//! File identifiers and byte ranges.

use serde::{Deserialize, Serialize};

/// Identifier of one registered body in the [`SourceDb`](crate::SourceDb).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// Placeholder for locations that do not come from any body.
    pub const DUMMY: FileId = FileId(u32::MAX);

    /// Creates a `FileId` from its raw index.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// A half-open byte range `[start, end)` within one body.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Span {
    /// The body this span points into.
    pub file: FileId,
    /// Inclusive start offset.
    pub start: u32,
    /// Exclusive end offset.
    pub end: u32,
}

impl Span {
    /// A span with no location, used for objects created programmatically.
    pub const DUMMY: Span = Span {
        file: FileId::DUMMY,
        start: 0,
        end: 0,
    };

    /// Creates a span.
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Self { file, start, end }
    }

    /// Smallest span covering both `self` and `other`.
    ///
    /// Spans from different bodies cannot be merged; `self` is returned as is.
    pub fn to(self, other: Span) -> Span {
        if self.file != other.file {
            return self;
        }
        Span {
            file: self.file,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` for zero-length spans.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` for [`Span::DUMMY`] and anything else outside a body.
    pub fn is_dummy(&self) -> bool {
        self.file == FileId::DUMMY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_covers_both() {
        let f = FileId::from_raw(0);
        let joined = Span::new(f, 4, 6).to(Span::new(f, 0, 2));
        assert_eq!((joined.start, joined.end), (0, 6));
    }

    #[test]
    fn to_across_files_keeps_self() {
        let a = Span::new(FileId::from_raw(0), 1, 2);
        let b = Span::new(FileId::from_raw(1), 5, 9);
        assert_eq!(a.to(b), a);
    }

    #[test]
    fn dummy_detection() {
        assert!(Span::DUMMY.is_dummy());
        assert!(Span::DUMMY.is_empty());
        assert!(!Span::new(FileId::from_raw(3), 0, 1).is_dummy());
    }

    #[test]
    fn span_serde() {
        let s = Span::new(FileId::from_raw(2), 3, 8);
        let back: Span = serde_json::from_str(&serde_json::to_string(&s).unwrap()).unwrap();
        assert_eq!(back, s);
        assert_eq!(back.len(), 5);
    }
}
